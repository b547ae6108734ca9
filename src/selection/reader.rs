//! Selection readout extraction from the producer's status bar
//!
//! Every outcome is either a tuple or None. Expected absences (no status bar
//! yet, no marker, pattern mismatch) and detached elements are logged at
//! debug level; anything else at error level. Nothing escapes the reader.

use std::thread;
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::{debug, error};

use super::SelectionTuple;
use crate::constants::readout;
use crate::platform::{AccessError, AccessResult, AccessibilityTree, ElementRole};

pub struct SelectionReader {
    pattern: Regex,
    marker: String,
    status_bar_id: String,
    wait_timeout: Duration,
    retry_interval: Duration,
}

impl SelectionReader {
    pub fn new(pattern: Regex) -> Self {
        Self {
            pattern,
            marker: readout::SELECTION_MARKER.to_string(),
            status_bar_id: readout::STATUS_BAR_ID.to_string(),
            wait_timeout: readout::WAIT_TIMEOUT,
            retry_interval: readout::RETRY_INTERVAL,
        }
    }

    /// Override how long to wait for the status bar, and how often to retry
    #[cfg(test)]
    pub fn with_wait(mut self, wait_timeout: Duration, retry_interval: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self.retry_interval = retry_interval;
        self
    }

    pub fn read<A: AccessibilityTree>(&self, tree: &A, root: &A::Root) -> Option<SelectionTuple> {
        match self.try_read(tree, root) {
            Ok(selection) => selection,
            Err(AccessError::Detached(reason)) => {
                debug!(reason = %reason, "UI element unavailable while reading selection info");
                None
            }
            Err(AccessError::Unsupported) => {
                debug!("no accessibility tree for the producer on this platform");
                None
            }
            Err(AccessError::Other(e)) => {
                error!(error = ?e, "Unexpected failure while reading selection info");
                None
            }
        }
    }

    fn try_read<A: AccessibilityTree>(
        &self,
        tree: &A,
        root: &A::Root,
    ) -> AccessResult<Option<SelectionTuple>> {
        let Some(status_bar) = self.wait_for_status_bar(tree, root)? else {
            debug!(timeout = ?self.wait_timeout, "status bar not available");
            return Ok(None);
        };

        // Stop at the first marker-bearing text that parses
        for element in tree.descendants(&status_bar, ElementRole::Text)? {
            let text = tree.element_text(&element?)?;
            if !text.contains(&self.marker) {
                continue;
            }
            match self.pattern.captures(&text) {
                Some(captures) => match SelectionTuple::from_captures(&captures) {
                    Some(selection) => return Ok(Some(selection)),
                    None => debug!(text = %text, "selection fields are not non-negative integers"),
                },
                None => debug!(text = %text, "selection readout does not match pattern"),
            }
        }
        Ok(None)
    }

    /// Poll for the status bar until it appears or the wait times out.
    /// Detached errors during the wait are retried like a missing element.
    fn wait_for_status_bar<A: AccessibilityTree>(
        &self,
        tree: &A,
        root: &A::Root,
    ) -> AccessResult<Option<A::Element>> {
        let deadline = Instant::now() + self.wait_timeout;
        loop {
            match tree.find_descendant(root, ElementRole::StatusBar, &self.status_bar_id) {
                Ok(Some(status_bar)) => return Ok(Some(status_bar)),
                Ok(None) => {}
                Err(AccessError::Detached(reason)) => {
                    debug!(reason = %reason, "status bar lookup failed, retrying");
                }
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            thread::sleep(self.retry_interval.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fakes::{FakeTree, StatusBar};

    const READOUT: &str = "Selection top left: 10, 20. Bounding rectangle size: 300 x 150.";

    fn reader() -> SelectionReader {
        SelectionReader::new(Regex::new(readout::DEFAULT_PATTERN).unwrap())
            .with_wait(Duration::from_millis(100), Duration::from_millis(1))
    }

    #[test]
    fn test_reads_marker_text() {
        let tree = FakeTree::with_texts(["Zoom: 100%", READOUT, "1024 x 768"]);
        assert_eq!(reader().read(&tree, &()), Some(SelectionTuple::new(10, 20, 300, 150)));
    }

    #[test]
    fn test_stops_at_first_match() {
        let tree = FakeTree::with_texts([
            READOUT,
            "Selection top left: 1, 2. Bounding rectangle size: 3 x 4.",
        ]);
        assert_eq!(reader().read(&tree, &()), Some(SelectionTuple::new(10, 20, 300, 150)));
        assert_eq!(tree.texts_read.get(), 1);
    }

    #[test]
    fn test_waits_for_status_bar() {
        let tree = FakeTree::with_texts([READOUT]).status_bar(StatusBar::AppearsAfter(3));
        assert!(reader().read(&tree, &()).is_some());
        assert_eq!(tree.lookups.get(), 4);
    }

    #[test]
    fn test_status_bar_never_appears() {
        let tree = FakeTree::with_texts([READOUT]).status_bar(StatusBar::Never);
        let started = Instant::now();
        assert_eq!(reader().read(&tree, &()), None);
        assert!(started.elapsed() >= Duration::from_millis(100));
        assert!(tree.lookups.get() > 1);
    }

    #[test]
    fn test_no_marker_is_none() {
        let tree = FakeTree::with_texts(["Zoom: 100%", "10, 20, 300, 150"]);
        assert_eq!(reader().read(&tree, &()), None);
        assert_eq!(tree.texts_read.get(), 2);
    }

    #[test]
    fn test_marker_without_match_is_none() {
        let tree = FakeTree::with_texts(["Selection top left: none"]);
        assert_eq!(reader().read(&tree, &()), None);
    }

    #[test]
    fn test_custom_pattern() {
        let pattern = Regex::new(r"x=(\d+) y=(\d+) w=(\d+) h=(\d+)").unwrap();
        let reader = SelectionReader::new(pattern).with_wait(Duration::ZERO, Duration::ZERO);
        let tree = FakeTree::with_texts(["Selection top left x=5 y=6 w=7 h=8"]);
        assert_eq!(reader.read(&tree, &()), Some(SelectionTuple::new(5, 6, 7, 8)));
    }

    #[test]
    fn test_detached_status_bar_degrades_to_none() {
        let tree = FakeTree::with_texts([READOUT]).status_bar(StatusBar::Detached);
        assert_eq!(reader().read(&tree, &()), None);
        // Detached lookups are retried until the wait runs out
        assert!(tree.lookups.get() > 1);
    }

    #[test]
    fn test_unsupported_tree_returns_immediately() {
        let tree = FakeTree::with_texts([READOUT]).status_bar(StatusBar::Unsupported);
        assert_eq!(reader().read(&tree, &()), None);
        assert_eq!(tree.lookups.get(), 1);
    }

    #[test]
    fn test_unexpected_error_degrades_to_none() {
        let tree = FakeTree::with_texts([READOUT]).status_bar(StatusBar::Broken);
        assert_eq!(reader().read(&tree, &()), None);
        assert_eq!(tree.lookups.get(), 1);
    }

    #[test]
    fn test_detached_text_element_degrades_to_none() {
        let mut tree = FakeTree::with_texts(["Zoom: 100%", READOUT]);
        tree.texts[0] = Err(AccessError::Detached("element gone".to_string()));
        assert_eq!(reader().read(&tree, &()), None);
    }
}
