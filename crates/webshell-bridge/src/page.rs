//! Initial content served by the development host.

use crate::script;

/// Route the page's shim connects to.
pub const BRIDGE_PATH: &str = "/v1/bridge";

/// Inject the WebSocket shim and the companion script at the end of
/// `<head>`, or at the very top when the page has no head.
pub fn render(html: &str, companion: &str) -> String {
    let injected = format!(
        "<script>{}</script>\n<script>{}</script>\n",
        script::websocket_shim(BRIDGE_PATH),
        companion
    );
    match html.to_ascii_lowercase().find("</head>") {
        Some(at) => {
            let mut out = String::with_capacity(html.len() + injected.len());
            out.push_str(&html[..at]);
            out.push_str(&injected);
            out.push_str(&html[at..]);
            out
        }
        None => format!("{injected}{html}"),
    }
}
