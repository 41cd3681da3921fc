//! Partitioned document elements.
//!
//! Both the external partition routine and the document-understanding API
//! describe content as a flat list of typed elements. The JSON shape is
//! shared:
//!
//! ```json
//! {
//!   "type": "Table",
//!   "element_id": "4f2c…",
//!   "text": "Quarter Revenue …",
//!   "metadata": {
//!     "text_as_html": "<table>…</table>",
//!     "filetype": "image/jpeg",
//!     "page_number": 3,
//!     "filename": "page3_table1.jpg"
//!   }
//! }
//! ```
//!
//! Elements are consumed once to assemble the combined document text; they
//! have no persistent identity beyond the JSON artifacts written for
//! processed table images.

use serde::{Deserialize, Serialize};

/// Element category as reported by the partitioner.
///
/// Categories outside the known set deserialize to [`ElementCategory::Other`]
/// and are ignored by text assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementCategory {
    Title,
    NarrativeText,
    ListItem,
    Table,
    Image,
    Other,
}

impl From<String> for ElementCategory {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Title" => ElementCategory::Title,
            "NarrativeText" => ElementCategory::NarrativeText,
            "ListItem" => ElementCategory::ListItem,
            "Table" => ElementCategory::Table,
            "Image" => ElementCategory::Image,
            _ => ElementCategory::Other,
        }
    }
}

impl From<ElementCategory> for String {
    fn from(category: ElementCategory) -> Self {
        match category {
            ElementCategory::Title => "Title",
            ElementCategory::NarrativeText => "NarrativeText",
            ElementCategory::ListItem => "ListItem",
            ElementCategory::Table => "Table",
            ElementCategory::Image => "Image",
            ElementCategory::Other => "Other",
        }
        .to_string()
    }
}

impl ElementCategory {
    /// Whether this category contributes to the combined document text
    /// (titles, narrative text, list items, and inline tables).
    pub fn is_document_text(self) -> bool {
        matches!(
            self,
            ElementCategory::Title
                | ElementCategory::NarrativeText
                | ElementCategory::ListItem
                | ElementCategory::Table
        )
    }
}

/// One typed content element produced by partitioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub category: ElementCategory,
    pub element_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub metadata: ElementMetadata,
}

/// Element metadata carried through from the partitioner or API response.
///
/// All fields are optional on the wire; table elements from the
/// document-understanding API normally carry all four.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_as_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_deserialize() {
        let el: Element = serde_json::from_str(
            r#"{"type":"NarrativeText","element_id":"e1","text":"hello"}"#,
        )
        .unwrap();
        assert_eq!(el.category, ElementCategory::NarrativeText);
        assert_eq!(el.text, "hello");
        assert!(el.metadata.page_number.is_none());
    }

    #[test]
    fn unknown_category_maps_to_other() {
        let el: Element =
            serde_json::from_str(r#"{"type":"Header","element_id":"e2","text":"x"}"#).unwrap();
        assert_eq!(el.category, ElementCategory::Other);
        assert!(!el.category.is_document_text());
    }

    #[test]
    fn document_text_categories() {
        assert!(ElementCategory::Title.is_document_text());
        assert!(ElementCategory::NarrativeText.is_document_text());
        assert!(ElementCategory::ListItem.is_document_text());
        assert!(ElementCategory::Table.is_document_text());
        assert!(!ElementCategory::Image.is_document_text());
        assert!(!ElementCategory::Other.is_document_text());
    }

    #[test]
    fn table_element_serializes_with_type_tag() {
        let el = Element {
            category: ElementCategory::Table,
            element_id: "t1".to_string(),
            text: "a b c".to_string(),
            metadata: ElementMetadata {
                text_as_html: Some("<table></table>".to_string()),
                filetype: Some("image/jpeg".to_string()),
                page_number: Some(2),
                filename: Some("page2_table1.jpg".to_string()),
            },
        };
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["type"], "Table");
        assert_eq!(json["metadata"]["page_number"], 2);
    }

    #[test]
    fn missing_text_defaults_to_empty() {
        let el: Element =
            serde_json::from_str(r#"{"type":"Image","element_id":"e3"}"#).unwrap();
        assert_eq!(el.text, "");
    }
}
