//! Native window boundary.
//!
//! The bridge never touches a window. Hosts that own one implement [`Window`]
//! and route OS callbacks through a [`WindowTable`] owned by the application
//! root: the OS trampoline receives a handle and looks the callbacks up here,
//! so no process-wide map is needed.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Deserialize;

/// Operations a host window exposes to the application shell.
pub trait Window: Send + Sync {
    fn show(&self);
    fn hide(&self);
    fn close(&self);
    fn set_title(&self, title: &str);
    fn set_size(&self, width: u32, height: u32);
    fn set_position(&self, x: i32, y: i32);
    fn handle(&self) -> WindowHandle;
}

/// Initial window geometry and chrome.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_true")]
    pub resizable: bool,
    #[serde(default = "default_true")]
    pub centered: bool,
    /// Enable developer tools where the surface supports them.
    #[serde(default)]
    pub debug: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            resizable: true,
            centered: true,
            debug: false,
        }
    }
}

fn default_title() -> String {
    "Webshell Application".into()
}
fn default_width() -> u32 {
    800
}
fn default_height() -> u32 {
    600
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MouseButton::Left => "Left",
            MouseButton::Right => "Right",
            MouseButton::Middle => "Middle",
        })
    }
}

/// Keyboard modifier bit set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyModifiers(u8);

impl KeyModifiers {
    pub const SHIFT: Self = Self(1);
    pub const CTRL: Self = Self(1 << 1);
    pub const ALT: Self = Self(1 << 2);
    /// Windows key / Command key.
    pub const SUPER: Self = Self(1 << 3);

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn has_shift(self) -> bool {
        self.contains(Self::SHIFT)
    }
    pub fn has_ctrl(self) -> bool {
        self.contains(Self::CTRL)
    }
    pub fn has_alt(self) -> bool {
        self.contains(Self::ALT)
    }
    pub fn has_super(self) -> bool {
        self.contains(Self::SUPER)
    }
}

impl std::ops::BitOr for KeyModifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Input and lifecycle events translated from the OS message loop.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    Close,
    Resize { width: u32, height: u32 },
    Move { x: i32, y: i32 },
    Focus,
    Blur,
    Key { code: u32, modifiers: KeyModifiers, pressed: bool },
    Mouse { button: MouseButton, x: i32, y: i32, pressed: bool },
}

/// Opaque index into a [`WindowTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(u64);

impl WindowHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

type CloseFn = Arc<dyn Fn() -> bool + Send + Sync>;
type EventFn = Arc<dyn Fn(&WindowEvent) + Send + Sync>;

/// Callbacks registered for one window.
#[derive(Default)]
pub struct WindowCallbacks {
    on_close: Option<CloseFn>,
    on_event: Vec<EventFn>,
}

impl WindowCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close hook; returning `false` vetoes the close.
    pub fn on_close(mut self, f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.on_close = Some(Arc::new(f));
        self
    }

    /// Observer for every non-close event (resize, move, focus, input).
    pub fn on_event(mut self, f: impl Fn(&WindowEvent) + Send + Sync + 'static) -> Self {
        self.on_event.push(Arc::new(f));
        self
    }
}

/// Handle arena routing OS callbacks to per-window callbacks.
pub struct WindowTable {
    entries: DashMap<WindowHandle, WindowCallbacks>,
    seq: AtomicU64,
}

impl Default for WindowTable {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowTable {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    pub fn insert(&self, callbacks: WindowCallbacks) -> WindowHandle {
        let handle = WindowHandle(self.seq.fetch_add(1, Ordering::Relaxed));
        self.entries.insert(handle, callbacks);
        handle
    }

    pub fn remove(&self, handle: WindowHandle) -> bool {
        self.entries.remove(&handle).is_some()
    }

    pub fn contains(&self, handle: WindowHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Route `event` to the window's callbacks.
    ///
    /// For `Close`, returns whether the window may close (true without a
    /// hook); an allowed close also removes the entry. For other events,
    /// returns whether the handle was known.
    ///
    /// Callbacks run after the table lock is released, so they may insert
    /// or remove windows (including their own).
    pub fn dispatch(&self, handle: WindowHandle, event: &WindowEvent) -> bool {
        if *event == WindowEvent::Close {
            let hook = match self.entries.get(&handle) {
                Some(entry) => entry.on_close.clone(),
                None => return true,
            };
            let allow = hook.map_or(true, |f| f());
            if allow {
                self.entries.remove(&handle);
            }
            return allow;
        }

        let observers: Vec<EventFn> = match self.entries.get(&handle) {
            Some(entry) => entry.on_event.clone(),
            None => {
                tracing::debug!(handle = handle.raw(), ?event, "event for unknown window");
                return false;
            }
        };
        for f in observers {
            f(event);
        }
        true
    }
}
