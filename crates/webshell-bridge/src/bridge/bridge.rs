use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use webshell_core::error::{BridgeError, ErrorCode, Result};
use webshell_core::protocol::message::{Message, MessageType};

use super::listeners::{EventListeners, ListenerId};
use super::pending::PendingCalls;
use crate::eval::Evaluator;
use crate::registry::{DynamicBinding, Handler, Registry};
use crate::script;

/// Bridge settings that are not part of the routing state.
#[derive(Debug, Clone)]
pub struct BridgeOptions {
    /// Global object the companion script installs (`window.<namespace>`).
    pub namespace: String,
    /// Default wait for native -> web calls.
    pub call_timeout: Duration,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            namespace: "webshell".into(),
            call_timeout: Duration::from_millis(30_000),
        }
    }
}

/// Routes messages between the function registry and the web surface.
pub struct Bridge {
    evaluator: Arc<dyn Evaluator>,
    registry: Registry,
    options: BridgeOptions,
    listeners: EventListeners,
    pending: PendingCalls,
    seq: AtomicU64,
    initialized: Mutex<bool>,
}

impl Bridge {
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        Self::with_options(evaluator, BridgeOptions::default())
    }

    pub fn with_options(evaluator: Arc<dyn Evaluator>, options: BridgeOptions) -> Self {
        Self {
            evaluator,
            registry: Registry::new(),
            options,
            listeners: EventListeners::new(),
            pending: PendingCalls::new(),
            seq: AtomicU64::new(0),
            initialized: Mutex::new(false),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn namespace(&self) -> &str {
        &self.options.namespace
    }

    // --------------------
    // Bindings
    // --------------------
    pub fn bind<F, Args>(&self, name: &str, f: F) -> Result<()>
    where
        F: Handler<Args>,
        Args: 'static,
    {
        self.registry.register(name, f)
    }

    pub fn bind_dynamic(&self, name: &str, binding: DynamicBinding) -> Result<()> {
        self.registry.register_dynamic(name, binding)
    }

    pub fn unbind(&self, name: &str) -> bool {
        self.registry.unregister(name)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.registry.has(name)
    }

    pub fn list_bindings(&self) -> Vec<String> {
        self.registry.list()
    }

    // --------------------
    // Inbound
    // --------------------

    /// Single entry point for text delivered by the web surface.
    ///
    /// Returns the serialized reply for `call` messages (and for anything
    /// that must be rejected), or an empty string when no reply is due.
    pub fn handle_message(&self, raw: &str) -> String {
        let msg = match Message::from_json(raw) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(error = %e, "undecodable bridge message");
                let reply = Message::error("", ErrorCode::Unknown, "failed to parse message", e.to_string());
                return encode_reply(&reply);
            }
        };

        let reply = match msg.msg_type.clone() {
            MessageType::Call => {
                tracing::debug!(id = %msg.id, method = %msg.method, "call");
                self.registry.call_with_message(&msg)
            }
            MessageType::Result | MessageType::Error => {
                self.pending.resolve(msg);
                return String::new();
            }
            MessageType::Event => {
                self.dispatch_event(&msg);
                return String::new();
            }
            MessageType::Unknown(t) => {
                let e = BridgeError::UnknownMessageType(t);
                Message::error(msg.id.clone(), e.error_code(), e.to_string(), "")
            }
        };
        encode_reply(&reply)
    }

    /// `handle_message` for transports that cannot return a value to the
    /// page (post-message style IPC): the reply, if any, is evaluated back
    /// into the companion script's response entry point.
    pub fn handle_and_respond(&self, raw: &str) -> Result<()> {
        let reply = self.handle_message(raw);
        if reply.is_empty() {
            return Ok(());
        }
        self.evaluator.eval(&script::response(self.namespace(), &reply))
    }

    fn dispatch_event(&self, msg: &Message) {
        if msg.event.is_empty() {
            return;
        }
        let data = match msg.parse_data::<Value>() {
            Ok(d) => d.unwrap_or(Value::Null),
            Err(e) => {
                tracing::warn!(event = %msg.event, error = %e, "event payload dropped");
                return;
            }
        };
        let ran = self.listeners.dispatch(&msg.event, &data);
        tracing::debug!(event = %msg.event, listeners = ran, "event from web side");
    }

    // --------------------
    // Outbound
    // --------------------

    /// Broadcast an event to the web side. Fire-and-forget: only the
    /// submission can fail, and failures are reported to the caller alone.
    pub fn emit<T: Serialize + ?Sized>(&self, event: &str, data: &T) -> Result<()> {
        let msg = Message::event(event, data)?;
        let json = msg.to_json()?;
        self.evaluator.eval(&script::event(self.namespace(), &json))
    }

    /// Inject the companion script once. Later calls are no-ops.
    pub fn init(&self) -> Result<()> {
        let mut initialized = self.initialized.lock().unwrap_or_else(PoisonError::into_inner);
        if *initialized {
            return Ok(());
        }
        self.evaluator
            .eval(&self.companion_script())
            .map_err(|e| BridgeError::Eval(format!("failed to inject bridge code: {e}")))?;
        *initialized = true;
        tracing::debug!(namespace = %self.namespace(), "companion script injected");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        *self.initialized.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Companion script text, for hosts that install it as an init script.
    pub fn companion_script(&self) -> String {
        script::companion(self.namespace())
    }

    /// Call a function the page registered with `expose`, and wait for its
    /// reply. `timeout` overrides the configured default. On timeout (or if
    /// this future is dropped) the pending entry is removed.
    pub async fn call_web<T, A>(&self, method: &str, args: &A, timeout: Option<Duration>) -> Result<T>
    where
        T: DeserializeOwned,
        A: Serialize + ?Sized,
    {
        let id = self.next_call_id();
        let json = Message::call(id.clone(), method, args)?.to_json()?;

        let (guard, rx) = self.pending.register(id);
        self.evaluator.eval(&script::call(self.namespace(), &json))?;

        let wait = timeout.unwrap_or(self.options.call_timeout);
        let reply = match tokio::time::timeout(wait, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => return Err(BridgeError::Internal("pending call dropped".into())),
            Err(_) => {
                tracing::warn!(id = %guard.id(), %method, ?wait, "native call timed out");
                return Err(BridgeError::Timeout(method.to_string()));
            }
        };
        drop(guard);

        if reply.msg_type == MessageType::Error {
            return Err(match &reply.error {
                Some(err) => BridgeError::Remote {
                    code: err.code,
                    message: err.message.clone(),
                },
                None => BridgeError::Remote {
                    code: ErrorCode::Unknown.as_i32(),
                    message: "error reply without error payload".into(),
                },
            });
        }
        match reply.parse_result::<T>()? {
            Some(v) => Ok(v),
            None => serde_json::from_value(Value::Null).map_err(|e| BridgeError::Decode(e.to_string())),
        }
    }

    /// Number of native -> web calls still waiting for a reply.
    pub fn pending_calls(&self) -> usize {
        self.pending.len()
    }

    fn next_call_id(&self) -> String {
        let n = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        format!("native_{n}")
    }

    // --------------------
    // Native listeners
    // --------------------

    /// Listen for events the page sends with `emit`.
    pub fn on<F>(&self, event: &str, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.listeners.on(event, Arc::new(listener))
    }

    pub fn off(&self, event: &str, id: Option<ListenerId>) -> bool {
        self.listeners.off(event, id)
    }
}

fn encode_reply(msg: &Message) -> String {
    msg.to_json().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to encode bridge reply");
        String::new()
    })
}
