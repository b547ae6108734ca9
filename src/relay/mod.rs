//! Clipboard relay between the image editor and its consumer
//!
//! Each poll cycle resolves the focused application, picks a [`Role`] and
//! applies it:
//! - Producer: publish a changed selection as the human encoding
//! - DesignatedConsumer: human -> structured, only if the clipboard still
//!   holds our last human publication
//! - AnyOther: structured -> human, only if the clipboard still holds our
//!   last structured publication
//!
//! Clipboard content placed there by anyone else is never overwritten.

mod role;
mod state;

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use anyhow::Result;
use tracing::{debug, error, info};

pub use role::{Identities, Role, classify_role};
use state::SyncState;

use crate::platform::{AccessibilityTree, Clipboard, FocusProbe};
use crate::selection::reader::SelectionReader;

pub struct SyncLoop<D, C> {
    desktop: D,
    clipboard: C,
    reader: SelectionReader,
    identities: Identities,
    state: SyncState,
    last_focus: Option<String>,
}

impl<D, C> SyncLoop<D, C>
where
    D: FocusProbe + AccessibilityTree<Root = <D as FocusProbe>::Handle>,
    C: Clipboard,
{
    pub fn new(desktop: D, clipboard: C, reader: SelectionReader, identities: Identities) -> Self {
        Self {
            desktop,
            clipboard,
            reader,
            identities,
            state: SyncState::new(),
            last_focus: None,
        }
    }

    /// Poll until `shutdown` is raised. The flag is checked between cycles.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        info!(producer = %self.identities.producer, consumer = %self.identities.consumer, "relay started");
        while !shutdown.load(Ordering::Relaxed) {
            let role = self.cycle();
            thread::sleep(role.poll_delay());
        }
    }

    /// Run one poll cycle and report the role it ran as.
    /// Failures are logged and leave the clipboard as it was.
    pub fn cycle(&mut self) -> Role {
        let focused = self.desktop.focused_application();
        let name = focused.as_ref().map(|app| app.application_name.as_str());
        if self.last_focus.as_deref() != name {
            debug!(application = ?name, title = ?focused.as_ref().map(|app| &app.window_title), "focus changed");
            self.last_focus = name.map(str::to_string);
        }

        let role = classify_role(name, &self.identities);
        let outcome = match (role, &focused) {
            (Role::Producer, Some(app)) => self.publish_selection(&app.handle),
            (Role::DesignatedConsumer, _) => self.translate_to_structured(),
            (Role::AnyOther, _) => self.translate_to_human(),
            (Role::NoFocus, _) | (Role::Producer, None) => Ok(()),
        };
        if let Err(e) = outcome {
            error!(role = ?role, error = ?e, "relay cycle failed");
        }
        role
    }

    fn publish_selection(&mut self, handle: &<D as FocusProbe>::Handle) -> Result<()> {
        let Some(selection) = self.reader.read(&self.desktop, handle) else {
            return Ok(());
        };
        if !self.state.is_new(&selection) {
            return Ok(());
        }
        let human = selection.to_string();
        self.clipboard.write_text(&human)?;
        info!(selection = %human, "Copied to clipboard");
        self.state.remember(selection)
    }

    fn translate_to_structured(&mut self) -> Result<()> {
        let (Some(human), Some(structured)) = (self.state.last_human(), self.state.last_structured()) else {
            return Ok(());
        };
        let current = self.clipboard.read_text()?;
        if current != structured && current == human {
            self.clipboard.write_text(structured)?;
            info!(document = %structured, "Copied to clipboard");
        }
        Ok(())
    }

    fn translate_to_human(&mut self) -> Result<()> {
        let (Some(human), Some(structured)) = (self.state.last_human(), self.state.last_structured()) else {
            return Ok(());
        };
        let current = self.clipboard.read_text()?;
        if current != human && current == structured {
            self.clipboard.write_text(human)?;
            info!(selection = %human, "Copied to clipboard");
        }
        Ok(())
    }
}
