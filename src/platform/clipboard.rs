use anyhow::{Context, Result};
use tracing::debug;

use super::Clipboard;

/// System clipboard via arboard
///
/// One instance is held for the whole session: on X11 the selection is
/// served by this process and disappears when the handle is dropped.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn open() -> Result<Self> {
        let inner = arboard::Clipboard::new().context("Failed to open system clipboard")?;
        Ok(Self { inner })
    }
}

impl Clipboard for SystemClipboard {
    fn read_text(&mut self) -> Result<String> {
        match self.inner.get_text() {
            Ok(text) => Ok(text),
            Err(arboard::Error::ContentNotAvailable) => {
                debug!("clipboard holds no text");
                Ok(String::new())
            }
            Err(e) => Err(e).context("Failed to read clipboard text"),
        }
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .set_text(text)
            .context("Failed to write clipboard text")
    }
}
