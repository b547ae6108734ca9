//! X11 focus probe
//!
//! Resolves the focused application through EWMH properties on the root
//! window. Programs running under Wine report the preloader as their
//! executable, so for those the Windows executable name is read from the
//! `WM_CLASS` instance, which Wine sets to e.g. `paintdotnet.exe`.
//!
//! X11 exposes no accessibility bridge into Wine programs: the tree side of
//! this backend always reports [`AccessError::Unsupported`].

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::constants::wine;
use crate::platform::{
    AccessError, AccessResult, AccessibilityTree, Descendants, ElementRole, FocusProbe,
    FocusedApplication,
};

/// Pre-cached X11 atoms to avoid repeated roundtrips
pub struct CachedAtoms {
    pub net_active_window: Atom,
    pub net_wm_pid: Atom,
    pub net_wm_name: Atom,
    pub utf8_string: Atom,
}

impl CachedAtoms {
    pub fn new(conn: &RustConnection) -> Result<Self> {
        let intern = |name: &'static str| -> Result<Atom> {
            Ok(conn
                .intern_atom(false, name.as_bytes())
                .context(format!("Failed to intern {name} atom"))?
                .reply()
                .context(format!("Failed to get reply for {name} atom"))?
                .atom)
        };
        Ok(Self {
            net_active_window: intern("_NET_ACTIVE_WINDOW")?,
            net_wm_pid: intern("_NET_WM_PID")?,
            net_wm_name: intern("_NET_WM_NAME")?,
            utf8_string: intern("UTF8_STRING")?,
        })
    }
}

/// Focused top-level window and its owning process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct X11Window {
    pub window: Window,
    pub pid: u32,
}

/// No element can be produced on X11
#[derive(Debug)]
pub enum X11Element {}

pub struct X11Desktop {
    conn: RustConnection,
    root: Window,
    atoms: CachedAtoms,
}

impl X11Desktop {
    pub fn connect(_attach_timeout: Duration) -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X11 display")?;
        let root = conn.setup().roots[screen_num].root;
        let atoms = CachedAtoms::new(&conn)?;
        info!(screen = screen_num, "successfully connected to x11");
        warn!("X11 has no accessibility bridge: producer selections cannot be read, encoding translation still runs");
        Ok(Self { conn, root, atoms })
    }

    fn active_window(&self) -> Result<Option<Window>> {
        let reply = self
            .conn
            .get_property(false, self.root, self.atoms.net_active_window, AtomEnum::WINDOW, 0, 1)
            .context("Failed to query _NET_ACTIVE_WINDOW property")?
            .reply()
            .context("Failed to get reply for _NET_ACTIVE_WINDOW query")?;
        Ok(reply
            .value32()
            .and_then(|mut values| values.next())
            .filter(|&window| window != x11rb::NONE))
    }

    fn window_title(&self, window: Window) -> Result<String> {
        let utf8 = self
            .conn
            .get_property(false, window, self.atoms.net_wm_name, self.atoms.utf8_string, 0, 1024)
            .context(format!("Failed to query _NET_WM_NAME for window {window}"))?
            .reply()
            .context(format!("Failed to get _NET_WM_NAME reply for window {window}"))?;
        if !utf8.value.is_empty() {
            return Ok(String::from_utf8_lossy(&utf8.value).into_owned());
        }

        let legacy = self
            .conn
            .get_property(false, window, AtomEnum::WM_NAME, AtomEnum::STRING, 0, 1024)
            .context(format!("Failed to query WM_NAME for window {window}"))?
            .reply()
            .context(format!("Failed to get WM_NAME reply for window {window}"))?;
        Ok(String::from_utf8_lossy(&legacy.value).into_owned())
    }

    fn window_pid(&self, window: Window) -> Result<Option<u32>> {
        let reply = self
            .conn
            .get_property(false, window, self.atoms.net_wm_pid, AtomEnum::CARDINAL, 0, 1)
            .context(format!("Failed to query _NET_WM_PID for window {window}"))?
            .reply()
            .context(format!("Failed to get _NET_WM_PID reply for window {window}"))?;
        Ok(reply.value32().and_then(|mut values| values.next()))
    }

    /// `WM_CLASS` is two NUL-terminated strings: instance, then class
    fn window_class_instance(&self, window: Window) -> Result<Option<String>> {
        let reply = self
            .conn
            .get_property(false, window, AtomEnum::WM_CLASS, AtomEnum::STRING, 0, 1024)
            .context(format!("Failed to query WM_CLASS for window {window}"))?
            .reply()
            .context(format!("Failed to get WM_CLASS reply for window {window}"))?;
        Ok(reply
            .value
            .split(|&byte| byte == 0)
            .next()
            .filter(|instance| !instance.is_empty())
            .map(|instance| String::from_utf8_lossy(instance).into_owned()))
    }

    fn executable_name(&self, window: Window, pid: u32) -> Result<Option<String>> {
        let exe = match std::fs::read_link(format!("/proc/{pid}/exe")) {
            Ok(path) => path,
            Err(e) => {
                debug!(pid, error = %e, "cannot read process executable");
                return Ok(None);
            }
        };
        let Some(name) = exe.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return Ok(None);
        };

        if is_wine_preloader(&exe) {
            // Wine names the window class after the Windows executable
            if let Some(instance) = self.window_class_instance(window)? {
                return Ok(Some(instance));
            }
        }
        Ok(Some(name))
    }

    fn resolve_focus(&self) -> Result<Option<FocusedApplication<X11Window>>> {
        let Some(window) = self.active_window()? else {
            return Ok(None);
        };
        let title = self.window_title(window)?;
        if title.is_empty() {
            return Ok(None);
        }
        let Some(pid) = self.window_pid(window)? else {
            debug!(window, "_NET_WM_PID not set");
            return Ok(None);
        };
        let Some(application_name) = self.executable_name(window, pid)? else {
            return Ok(None);
        };
        Ok(Some(FocusedApplication {
            application_name,
            handle: X11Window { window, pid },
            window_title: title,
        }))
    }
}

fn is_wine_preloader(exe: &Path) -> bool {
    let path = exe.to_string_lossy();
    path.contains(wine::WINE64_PRELOADER) || path.contains(wine::WINE_PRELOADER)
}

impl FocusProbe for X11Desktop {
    type Handle = X11Window;

    fn focused_application(&mut self) -> Option<FocusedApplication<X11Window>> {
        self.resolve_focus()
            .inspect_err(|e| debug!(error = ?e, "focus probe failed"))
            .ok()
            .flatten()
    }
}

impl AccessibilityTree for X11Desktop {
    type Root = X11Window;
    type Element = X11Element;

    fn find_descendant(
        &self,
        root: &X11Window,
        _role: ElementRole,
        _identifier: &str,
    ) -> AccessResult<Option<X11Element>> {
        debug!(window = root.window, pid = root.pid, "no accessibility bridge for window");
        Err(AccessError::Unsupported)
    }

    fn descendants<'a>(
        &'a self,
        element: &'a X11Element,
        _role: ElementRole,
    ) -> AccessResult<Descendants<'a, X11Element>> {
        match *element {}
    }

    fn element_text(&self, element: &X11Element) -> AccessResult<String> {
        match *element {}
    }
}
