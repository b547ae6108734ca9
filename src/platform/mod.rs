//! Host platform collaborators
//!
//! The relay only talks to the desktop through three narrow seams:
//! - [`FocusProbe`]: which application owns input focus
//! - [`AccessibilityTree`]: navigating that application's UI elements
//! - [`Clipboard`]: reading and writing clipboard text
//!
//! Native backends live in per-OS submodules and are bundled by [`Desktop`].

mod clipboard;
#[cfg(target_os = "linux")]
mod x11;
#[cfg(windows)]
mod win32;

#[cfg(test)]
pub mod fakes;

use std::time::Duration;

use anyhow::Result;
use thiserror::Error;

pub use clipboard::SystemClipboard;

/// Application owning input focus, resolved fresh every poll cycle
#[derive(Debug, Clone)]
pub struct FocusedApplication<H> {
    /// Executable name, e.g. `paintdotnet.exe`
    pub application_name: String,
    /// Backend-specific reference to the application's accessibility root
    pub handle: H,
    pub window_title: String,
}

/// Element kinds the relay searches for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRole {
    StatusBar,
    Text,
}

/// Failure while navigating an accessibility tree
#[derive(Debug, Error)]
pub enum AccessError {
    /// Element or window vanished mid-query (closed window, stale reference)
    #[cfg_attr(not(windows), allow(dead_code))]
    #[error("element detached: {0}")]
    Detached(String),

    /// This platform has no accessibility bridge for the focused application
    #[error("accessibility tree unavailable on this platform")]
    Unsupported,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type AccessResult<T> = std::result::Result<T, AccessError>;

/// Lazy, restartable sequence of descendant elements
pub type Descendants<'a, E> = Box<dyn Iterator<Item = AccessResult<E>> + 'a>;

pub trait FocusProbe {
    type Handle;

    /// Every failure (no window, no title, unknown process, attach timeout)
    /// collapses to None.
    fn focused_application(&mut self) -> Option<FocusedApplication<Self::Handle>>;
}

pub trait AccessibilityTree {
    type Root;
    type Element;

    /// First descendant of `root` with the given role and automation identifier
    fn find_descendant(
        &self,
        root: &Self::Root,
        role: ElementRole,
        identifier: &str,
    ) -> AccessResult<Option<Self::Element>>;

    /// All descendants of `element` with the given role, in tree order
    fn descendants<'a>(
        &'a self,
        element: &'a Self::Element,
        role: ElementRole,
    ) -> AccessResult<Descendants<'a, Self::Element>>;

    fn element_text(&self, element: &Self::Element) -> AccessResult<String>;
}

pub trait Clipboard {
    /// Current clipboard text; non-text content reads as an empty string
    fn read_text(&mut self) -> Result<String>;

    fn write_text(&mut self, text: &str) -> Result<()>;
}

#[cfg(target_os = "linux")]
pub use self::x11::X11Desktop as Desktop;

#[cfg(windows)]
pub use self::win32::UiaDesktop as Desktop;

#[cfg(not(any(target_os = "linux", windows)))]
compile_error!("selection-relay supports Linux (X11) and Windows only");

/// Open the native focus/accessibility backend for this platform
pub fn open_desktop(attach_timeout: Duration) -> Result<Desktop> {
    Desktop::connect(attach_timeout)
}
