//! In-memory collaborators for exercising the relay without a desktop

use std::cell::Cell;
use std::collections::VecDeque;

use anyhow::{Result, anyhow};

use super::{
    AccessError, AccessResult, AccessibilityTree, Clipboard, Descendants, ElementRole, FocusProbe,
    FocusedApplication,
};

/// Plays back a script of focus results, then reports no focus
#[derive(Default)]
pub struct ScriptedFocus {
    pub script: VecDeque<Option<String>>,
}

impl ScriptedFocus {
    pub fn new<I, S>(apps: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            script: apps.into_iter().map(|app| app.map(Into::into)).collect(),
        }
    }
}

impl FocusProbe for ScriptedFocus {
    type Handle = ();

    fn focused_application(&mut self) -> Option<FocusedApplication<()>> {
        let name = self.script.pop_front().flatten()?;
        Some(FocusedApplication {
            window_title: format!("{name} window"),
            application_name: name,
            handle: (),
        })
    }
}

/// How the fake status bar lookup behaves
pub enum StatusBar {
    /// Appears after this many failed lookups
    AppearsAfter(usize),
    Never,
    Detached,
    Unsupported,
    Broken,
}

/// Status bar with a fixed list of text elements
pub struct FakeTree {
    pub status_bar: StatusBar,
    pub texts: Vec<AccessResult<String>>,
    pub lookups: Cell<usize>,
    pub texts_read: Cell<usize>,
}

impl FakeTree {
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            status_bar: StatusBar::AppearsAfter(0),
            texts: texts.into_iter().map(|t| Ok(t.into())).collect(),
            lookups: Cell::new(0),
            texts_read: Cell::new(0),
        }
    }

    pub fn status_bar(mut self, status_bar: StatusBar) -> Self {
        self.status_bar = status_bar;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FakeElement {
    StatusBar,
    Text(usize),
}

impl AccessibilityTree for FakeTree {
    type Root = ();
    type Element = FakeElement;

    fn find_descendant(
        &self,
        _root: &(),
        role: ElementRole,
        _identifier: &str,
    ) -> AccessResult<Option<FakeElement>> {
        assert_eq!(role, ElementRole::StatusBar);
        let attempt = self.lookups.get();
        self.lookups.set(attempt + 1);
        match self.status_bar {
            StatusBar::AppearsAfter(n) if attempt >= n => Ok(Some(FakeElement::StatusBar)),
            StatusBar::AppearsAfter(_) | StatusBar::Never => Ok(None),
            StatusBar::Detached => Err(AccessError::Detached("window closed".to_string())),
            StatusBar::Unsupported => Err(AccessError::Unsupported),
            StatusBar::Broken => Err(AccessError::Other(anyhow!("provider crashed"))),
        }
    }

    fn descendants<'a>(
        &'a self,
        _element: &'a FakeElement,
        role: ElementRole,
    ) -> AccessResult<Descendants<'a, FakeElement>> {
        assert_eq!(role, ElementRole::Text);
        Ok(Box::new((0..self.texts.len()).map(|i| Ok::<_, AccessError>(FakeElement::Text(i)))))
    }

    fn element_text(&self, element: &FakeElement) -> AccessResult<String> {
        let FakeElement::Text(index) = *element else {
            return Ok(String::new());
        };
        self.texts_read.set(self.texts_read.get() + 1);
        match &self.texts[index] {
            Ok(text) => Ok(text.clone()),
            Err(AccessError::Detached(msg)) => Err(AccessError::Detached(msg.clone())),
            Err(AccessError::Unsupported) => Err(AccessError::Unsupported),
            Err(AccessError::Other(e)) => Err(AccessError::Other(anyhow!("{e}"))),
        }
    }
}

/// Clipboard that records every write
#[derive(Default)]
pub struct MemoryClipboard {
    pub text: String,
    pub writes: Vec<String>,
    pub fail_writes: bool,
}

impl MemoryClipboard {
    pub fn holding(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }
}

impl Clipboard for MemoryClipboard {
    fn read_text(&mut self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("clipboard locked by another process"));
        }
        self.text = text.to_string();
        self.writes.push(text.to_string());
        Ok(())
    }
}

/// Focus script and tree bundled as one desktop, like the native backends
pub struct FakeDesktop {
    pub focus: ScriptedFocus,
    pub tree: FakeTree,
}

impl FocusProbe for FakeDesktop {
    type Handle = ();

    fn focused_application(&mut self) -> Option<FocusedApplication<()>> {
        self.focus.focused_application()
    }
}

impl AccessibilityTree for FakeDesktop {
    type Root = ();
    type Element = FakeElement;

    fn find_descendant(
        &self,
        root: &(),
        role: ElementRole,
        identifier: &str,
    ) -> AccessResult<Option<FakeElement>> {
        self.tree.find_descendant(root, role, identifier)
    }

    fn descendants<'a>(
        &'a self,
        element: &'a FakeElement,
        role: ElementRole,
    ) -> AccessResult<Descendants<'a, FakeElement>> {
        self.tree.descendants(element, role)
    }

    fn element_text(&self, element: &FakeElement) -> AccessResult<String> {
        self.tree.element_text(element)
    }
}
