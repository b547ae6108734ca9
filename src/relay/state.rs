use anyhow::Result;

use crate::selection::SelectionTuple;
use crate::selection::structured::to_structured;

/// Session memory of the last published selection, in both encodings
///
/// The structured document is always derived from the human encoding and is
/// only replaced together with it. Nothing here outlives the process.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncState {
    last_human: Option<String>,
    last_structured: Option<String>,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_human(&self) -> Option<&str> {
        self.last_human.as_deref()
    }

    pub fn last_structured(&self) -> Option<&str> {
        self.last_structured.as_deref()
    }

    /// True if `selection` differs from what was last remembered
    pub fn is_new(&self, selection: &SelectionTuple) -> bool {
        self.last_human.as_deref() != Some(selection.to_string().as_str())
    }

    /// Record a freshly published selection, regenerating the structured form
    /// from its human encoding. Neither field changes on error.
    pub fn remember(&mut self, selection: SelectionTuple) -> Result<()> {
        let human = selection.to_string();
        let structured = to_structured(&human)?.to_string();
        self.last_human = Some(human);
        self.last_structured = Some(structured);
        Ok(())
    }
}
