//! Merged content sequence models.
//!
//! A synopsis is a flat, chronologically ordered list of images and text
//! paragraphs. Each item serializes as `{"type": "image" | "text", "content": ...}`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Image,
    Text,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Image => "image",
            ContentType::Text => "text",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of the merged synopsis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum ContentItem {
    /// Image reference returned by an image sink
    Image(String),
    /// Transcript text
    Text(String),
}

impl ContentItem {
    pub fn image(reference: impl Into<String>) -> Self {
        Self::Image(reference.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            ContentItem::Image(_) => ContentType::Image,
            ContentItem::Text(_) => ContentType::Text,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            ContentItem::Image(s) | ContentItem::Text(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_item_wire_format() {
        let item = ContentItem::image("frames/42.png");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["content"], "frames/42.png");

        let parsed: ContentItem =
            serde_json::from_str(r#"{"type":"text","content":"hello"}"#).unwrap();
        assert_eq!(parsed, ContentItem::text("hello"));
        assert_eq!(parsed.content_type(), ContentType::Text);
        assert_eq!(parsed.content(), "hello");
    }
}
