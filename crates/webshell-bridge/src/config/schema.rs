use std::time::Duration;

use serde::Deserialize;
use webshell_core::error::{BridgeError, Result};

use crate::bridge::BridgeOptions;
use crate::window::WindowConfig;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    pub version: u32,

    #[serde(default)]
    pub window: WindowConfig,

    #[serde(default)]
    pub content: ContentSection,

    #[serde(default)]
    pub bridge: BridgeSection,

    #[serde(default)]
    pub host: HostSection,
}

impl ShellConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(BridgeError::UnsupportedVersion);
        }
        if !(100..=10000).contains(&self.window.width) || !(100..=10000).contains(&self.window.height) {
            return Err(BridgeError::Config(
                "window.width and window.height must be between 100 and 10000".into(),
            ));
        }

        self.content.validate()?;
        self.bridge.validate()?;

        Ok(())
    }
}

/// Initial page. Without either field the built-in demo page is served.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentSection {
    #[serde(default)]
    pub html_file: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

impl ContentSection {
    pub fn validate(&self) -> Result<()> {
        if self.html_file.is_some() && self.html.is_some() {
            return Err(BridgeError::Config(
                "content.html_file and content.html are mutually exclusive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeSection {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

impl BridgeSection {
    pub fn validate(&self) -> Result<()> {
        if !is_js_identifier(&self.namespace) {
            return Err(BridgeError::Config(format!(
                "bridge.namespace must be a JavaScript identifier, got {:?}",
                self.namespace
            )));
        }
        if !(100..=600000).contains(&self.call_timeout_ms) {
            return Err(BridgeError::Config(
                "bridge.call_timeout_ms must be between 100 and 600000".into(),
            ));
        }
        Ok(())
    }

    pub fn options(&self) -> BridgeOptions {
        BridgeOptions {
            namespace: self.namespace.clone(),
            call_timeout: Duration::from_millis(self.call_timeout_ms),
        }
    }
}

fn is_js_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn default_namespace() -> String {
    "webshell".into()
}
fn default_call_timeout_ms() -> u64 {
    30000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1:8080".into()
}
