//! Script evaluation capability.
//!
//! The bridge never talks to a web surface directly; it only submits script
//! text through an [`Evaluator`]. A webview, a WebSocket session or a test
//! channel can all stand behind it.

use tokio::sync::mpsc;

use webshell_core::error::{BridgeError, Result};

/// Run script text in the web surface.
///
/// `Ok` means the script was accepted for execution, not that it ran without
/// throwing.
pub trait Evaluator: Send + Sync {
    fn eval(&self, script: &str) -> Result<()>;
}

impl<F> Evaluator for F
where
    F: Fn(&str) -> Result<()> + Send + Sync,
{
    fn eval(&self, script: &str) -> Result<()> {
        self(script)
    }
}

/// Forwards scripts into a channel drained by whoever owns the web surface
/// (usually the UI thread's event loop).
#[derive(Clone)]
pub struct ChannelEvaluator {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelEvaluator {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }

    /// Evaluator plus the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Evaluator for ChannelEvaluator {
    fn eval(&self, script: &str) -> Result<()> {
        self.tx
            .send(script.to_string())
            .map_err(|_| BridgeError::Eval("web surface channel closed".into()))
    }
}
