//! Companion script injected into the web surface, plus the small script
//! snippets the native side evaluates to deliver responses, events and calls.

/// Placeholder replaced by the configured global namespace.
const NS: &str = "__NS__";

/// Global hook installed by the development host's WebSocket shim.
pub const POST_HOOK: &str = "__webshell_post";

const COMPANION_TEMPLATE: &str = r#"
(function() {
    'use strict';
    if (window.__NS__ && window.__NS__._initialized) {
        return;
    }

    const pendingCalls = new Map();
    const eventListeners = new Map();
    const exposed = new Map();
    let callIdCounter = 0;

    function generateId() {
        return 'js_' + Date.now().toString(36) + '_' + (++callIdCounter);
    }

    function transmit(message) {
        const text = JSON.stringify(message);
        if (window.ipc && typeof window.ipc.postMessage === 'function') {
            window.ipc.postMessage(text);
        } else if (typeof window.__webshell_post === 'function') {
            window.__webshell_post(text);
        } else if (window.external && typeof window.external.invoke === 'function') {
            window.external.invoke(text);
        } else {
            throw new Error('No bridge available');
        }
    }

    function reply(id, ok, value) {
        const message = ok
            ? { id: id, type: 'result', result: value === undefined ? null : value, timestamp: Date.now() }
            : { id: id, type: 'error', error: { code: -4, message: String(value && value.message || value) }, timestamp: Date.now() };
        try {
            transmit(message);
        } catch (e) {
            console.error('__NS__: failed to answer native call:', e);
        }
    }

    window.__NS__ = {
        _initialized: true,

        call: function(method, ...args) {
            return new Promise((resolve, reject) => {
                const id = generateId();
                pendingCalls.set(id, { resolve, reject });
                try {
                    transmit({ id: id, type: 'call', method: method, args: args, timestamp: Date.now() });
                } catch (e) {
                    pendingCalls.delete(id);
                    reject(e);
                }
            });
        },

        on: function(event, callback) {
            if (!eventListeners.has(event)) {
                eventListeners.set(event, []);
            }
            eventListeners.get(event).push(callback);
            return () => window.__NS__.off(event, callback);
        },

        off: function(event, callback) {
            const listeners = eventListeners.get(event);
            if (!listeners) return;
            if (callback) {
                const index = listeners.indexOf(callback);
                if (index > -1) listeners.splice(index, 1);
            } else {
                eventListeners.delete(event);
            }
        },

        emit: function(event, data) {
            transmit({ type: 'event', event: event, data: data === undefined ? null : data, timestamp: Date.now() });
        },

        expose: function(name, fn) {
            exposed.set(name, fn);
        },

        unexpose: function(name) {
            exposed.delete(name);
        },

        _handleResponse: function(msgJson) {
            try {
                const msg = typeof msgJson === 'string' ? JSON.parse(msgJson) : msgJson;
                if (!msg || !msg.id) return;
                const pending = pendingCalls.get(msg.id);
                if (!pending) return;
                pendingCalls.delete(msg.id);
                if (msg.type === 'error') {
                    const error = new Error(msg.error.message);
                    error.code = msg.error.code;
                    error.details = msg.error.details;
                    pending.reject(error);
                } else if (msg.type === 'result') {
                    pending.resolve(msg.result);
                }
            } catch (e) {
                console.error('__NS__: failed to handle response:', e);
            }
        },

        _handleEvent: function(msgJson) {
            try {
                const msg = typeof msgJson === 'string' ? JSON.parse(msgJson) : msgJson;
                if (!msg || msg.type !== 'event' || !msg.event) return;
                const listeners = eventListeners.get(msg.event);
                if (!listeners) return;
                listeners.slice().forEach(callback => {
                    try {
                        callback(msg.data);
                    } catch (e) {
                        console.error('__NS__: event listener error:', e);
                    }
                });
            } catch (e) {
                console.error('__NS__: failed to handle event:', e);
            }
        },

        _handleCall: function(msgJson) {
            let msg;
            try {
                msg = typeof msgJson === 'string' ? JSON.parse(msgJson) : msgJson;
            } catch (e) {
                console.error('__NS__: failed to parse call:', e);
                return;
            }
            if (!msg || msg.type !== 'call' || !msg.id) return;
            const fn = exposed.get(msg.method);
            if (!fn) {
                transmit({ id: msg.id, type: 'error', error: { code: -2, message: 'method not found: ' + msg.method }, timestamp: Date.now() });
                return;
            }
            Promise.resolve()
                .then(() => fn.apply(null, msg.args || []))
                .then(value => reply(msg.id, true, value), err => reply(msg.id, false, err));
        }
    };
})();
"#;

/// Companion script for the given global namespace.
pub fn companion(namespace: &str) -> String {
    COMPANION_TEMPLATE.replace(NS, namespace)
}

/// Make JSON text safe to splice into a script as an expression.
///
/// JSON is a JavaScript expression except for raw U+2028/U+2029, which older
/// engines treat as line terminators inside string literals.
pub fn js_literal(json: &str) -> String {
    json.replace('\u{2028}', "\\u2028").replace('\u{2029}', "\\u2029")
}

fn entry_point(namespace: &str, entry: &str, json: &str) -> String {
    format!(
        "window.{namespace} && window.{namespace}.{entry}({})",
        js_literal(json)
    )
}

/// Deliver a result/error message for a web-issued call.
pub fn response(namespace: &str, json: &str) -> String {
    entry_point(namespace, "_handleResponse", json)
}

/// Deliver a broadcast event.
pub fn event(namespace: &str, json: &str) -> String {
    entry_point(namespace, "_handleEvent", json)
}

/// Issue a native-originated call.
pub fn call(namespace: &str, json: &str) -> String {
    entry_point(namespace, "_handleCall", json)
}

/// Shim for the development host: connects to the bridge WebSocket, installs
/// [`POST_HOOK`], and evaluates every inbound text frame as a script.
pub fn websocket_shim(path: &str) -> String {
    format!(
        r#"
(function() {{
    'use strict';
    const queue = [];
    const url = (location.protocol === 'https:' ? 'wss://' : 'ws://') + location.host + '{path}';
    const socket = new WebSocket(url);
    socket.onopen = () => {{ queue.splice(0).forEach(text => socket.send(text)); }};
    socket.onmessage = (e) => {{
        try {{
            (new Function(e.data))();
        }} catch (err) {{
            console.error('bridge script failed:', err);
        }}
    }};
    socket.onclose = () => console.warn('bridge connection closed');
    window.{hook} = (text) => {{
        if (socket.readyState === WebSocket.OPEN) socket.send(text);
        else queue.push(text);
    }};
}})();
"#,
        hook = POST_HOOK
    )
}
