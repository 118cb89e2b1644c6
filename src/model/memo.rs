use serde::{Deserialize, Serialize};

/// Smallest width a memo can be resized to.
pub const MIN_MEMO_WIDTH: f32 = 190.0;
pub const MIN_MEMO_HEIGHT: f32 = 40.0;

/// A free-floating sticky note positioned in chart content coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    pub id: String,
    pub text: String,
    /// Optional rich-text body kept alongside the plain text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_html: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Memo {
    /// Create an empty memo at a content position with the default size.
    pub fn new_at(x: f32, y: f32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: String::new(),
            content_html: None,
            x,
            y,
            width: MIN_MEMO_WIDTH,
            height: 120.0,
        }
    }
}
