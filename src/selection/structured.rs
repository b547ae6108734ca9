//! Structured encoding consumed by the designated consumer
//!
//! ```json
//! {"children": {"Height": {"value": 150}, "Width": {"value": 300}, "X": {"value": 10}, "Y": {"value": 20}}}
//! ```
//!
//! Single line, with `", "` between entries and `": "` after keys.

use std::{fmt, io};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::SelectionTuple;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: u32,
}

/// The four named fields. Declared in the order they are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SelectionFields {
    pub height: FieldValue,
    pub width: FieldValue,
    pub x: FieldValue,
    pub y: FieldValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSelection {
    pub children: SelectionFields,
}

impl From<SelectionTuple> for StructuredSelection {
    fn from(selection: SelectionTuple) -> Self {
        Self {
            children: SelectionFields {
                height: FieldValue { value: selection.height },
                width: FieldValue { value: selection.width },
                x: FieldValue { value: selection.x },
                y: FieldValue { value: selection.y },
            },
        }
    }
}

/// Compact JSON with a space after every `,` and `:`
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

/// Serialized document, as written to the clipboard
impl fmt::Display for StructuredSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut json = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut json, SpacedFormatter);
        self.serialize(&mut serializer).map_err(|_| fmt::Error)?;
        f.write_str(std::str::from_utf8(&json).map_err(|_| fmt::Error)?)
    }
}

/// Translate a human encoding (`"x, y, width, height"`) to the structured form.
/// First field maps to X, then Y, Width, Height.
pub fn to_structured(human: &str) -> Result<StructuredSelection> {
    let selection: SelectionTuple = human.parse()?;
    Ok(selection.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_order_and_names() {
        let structured = to_structured("10, 20, 300, 150").unwrap();
        assert_eq!(structured.children.x.value, 10);
        assert_eq!(structured.children.y.value, 20);
        assert_eq!(structured.children.width.value, 300);
        assert_eq!(structured.children.height.value, 150);
    }

    #[test]
    fn test_matches_independently_built_document() {
        let expected = json!({
            "children": {
                "X": {"value": 10},
                "Y": {"value": 20},
                "Width": {"value": 300},
                "Height": {"value": 150},
            }
        });
        let document = to_structured("10, 20, 300, 150").unwrap().to_string();
        let actual: serde_json::Value = serde_json::from_str(&document).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_serialized_form_is_stable() {
        let document = StructuredSelection::from(SelectionTuple::new(10, 20, 300, 150)).to_string();
        assert_eq!(
            document,
            r#"{"children": {"Height": {"value": 150}, "Width": {"value": 300}, "X": {"value": 10}, "Y": {"value": 20}}}"#
        );
    }

    #[test]
    fn test_separators_are_spaced() {
        let expected = r#"{"children": {"Height": {"value": 2160}, "Width": {"value": 4096}, "X": {"value": 0}, "Y": {"value": 7}}}"#;
        assert_eq!(to_structured("0, 7, 4096, 2160").unwrap().to_string(), expected);
    }

    #[test]
    fn test_round_trip_through_human_encoding() {
        let samples = [
            SelectionTuple::new(0, 0, 0, 0),
            SelectionTuple::new(10, 20, 300, 150),
            SelectionTuple::new(u32::MAX, 1, 4096, 2160),
        ];
        for selection in samples {
            let structured = to_structured(&selection.to_string()).unwrap();
            assert_eq!(structured, StructuredSelection::from(selection));

            let parsed: StructuredSelection = serde_json::from_str(&structured.to_string()).unwrap();
            assert_eq!(parsed, structured);
        }
    }

    #[test]
    fn test_rejects_malformed_human_encoding() {
        assert!(to_structured("hello world").is_err());
    }
}
