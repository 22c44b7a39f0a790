use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Generates a fresh identifier for a manual, page or block.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Fields shared by every block variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockBase {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

impl BlockBase {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: new_id(),
            x,
            y,
            width,
            height,
            z_index: None,
        }
    }

    /// Bottom edge of the block on the canvas.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Centre point of the block, used for rotation handles.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FontWeight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(FontWeight::Normal),
            "bold" => Ok(FontWeight::Bold),
            _ => Err(format!(
                "Invalid font weight: '{}'. Valid options: normal, bold",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(flatten)]
    pub base: BlockBase,
    pub content: String,
    pub font_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    /// Degrees. Any value is accepted, including negative and > 360.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl TextBlock {
    pub fn new(content: impl Into<String>, font_size: f64, base: BlockBase) -> Self {
        Self {
            base,
            content: content.into(),
            font_size,
            font_family: None,
            font_weight: None,
            color: None,
            italic: None,
            rotation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBlock {
    #[serde(flatten)]
    pub base: BlockBase,
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    /// Within `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ImageBlock {
    pub fn new(src: impl Into<String>, base: BlockBase) -> Self {
        Self {
            base,
            src: src.into(),
            alt_text: None,
            opacity: None,
            label: None,
        }
    }
}

/// A positioned element on a page, tagged by `type` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Text(TextBlock),
    Image(ImageBlock),
}

impl Block {
    pub fn base(&self) -> &BlockBase {
        match self {
            Block::Text(b) => &b.base,
            Block::Image(b) => &b.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut BlockBase {
        match self {
            Block::Text(b) => &mut b.base,
            Block::Image(b) => &mut b.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    /// Stacking order; blocks without one sit at layer 0.
    pub fn z_index(&self) -> i32 {
        self.base().z_index.unwrap_or(0)
    }

    /// The `type` tag as stored in JSON and in the `blocks` table.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Text(_) => "text",
            Block::Image(_) => "image",
        }
    }

    /// True when position, size and any text metrics are finite numbers.
    ///
    /// JSON has no NaN or infinity, so a block failing this cannot be
    /// stored or reloaded.
    pub fn is_finite(&self) -> bool {
        let metrics = match self {
            Block::Text(text) => {
                text.font_size.is_finite() && text.rotation.map_or(true, f64::is_finite)
            }
            Block::Image(_) => true,
        };
        self.base().is_finite() && metrics
    }

    /// Returns a copy of this block carrying a fresh id.
    pub fn with_new_id(&self) -> Block {
        let mut block = self.clone();
        block.base_mut().id = new_id();
        block
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = self.base();
        write!(
            f,
            "{:<5} {}  at ({}, {}) size {}x{}  layer {}",
            self.kind(),
            base.id,
            base.x,
            base.y,
            base.width,
            base.height,
            self.z_index()
        )?;
        match self {
            Block::Text(text) => write!(f, "  \"{}\"", text.content),
            Block::Image(image) if image.src.is_empty() => write!(f, "  (no image)"),
            Block::Image(image) => write!(f, "  {}", image.src),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_block_json_uses_camel_case_and_type_tag() {
        let mut block = TextBlock::new("Hello", 14.0, BlockBase::new(50.0, 50.0, 200.0, 100.0));
        block.base.z_index = Some(2);
        block.font_family = Some("Press Start 2P".to_string());
        let json = serde_json::to_value(Block::Text(block)).unwrap();

        assert_eq!(json["type"], "text");
        assert_eq!(json["fontSize"], 14.0);
        assert_eq!(json["zIndex"], 2);
        assert_eq!(json["fontFamily"], "Press Start 2P");
        assert!(json.get("rotation").is_none());
    }

    #[test]
    fn test_parse_image_block_from_editor_json() {
        let json = r#"{
            "id": "img-1",
            "type": "image",
            "src": "https://example.com/a.png",
            "x": 50,
            "y": 60,
            "width": 150,
            "height": 150,
            "opacity": 0.5
        }"#;

        let block: Block = serde_json::from_str(json).unwrap();
        match block {
            Block::Image(image) => {
                assert_eq!(image.base.id, "img-1");
                assert_eq!(image.base.y, 60.0);
                assert_eq!(image.opacity, Some(0.5));
                assert!(image.alt_text.is_none());
            }
            other => panic!("expected image block, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_block_type_is_rejected() {
        let json = r#"{"id":"v","type":"video","x":0,"y":0,"width":1,"height":1}"#;
        assert!(serde_json::from_str::<Block>(json).is_err());
    }

    #[test]
    fn test_with_new_id_keeps_everything_else() {
        let block = Block::Image(ImageBlock::new("a.png", BlockBase::new(1.0, 2.0, 3.0, 4.0)));
        let copy = block.with_new_id();

        assert_ne!(copy.id(), block.id());
        assert_eq!(copy.base().x, 1.0);
        assert_eq!(copy.kind(), "image");
    }

    #[test]
    fn test_font_weight_from_str() {
        assert_eq!("BOLD".parse::<FontWeight>().unwrap(), FontWeight::Bold);
        assert!("heavy".parse::<FontWeight>().is_err());
    }
}
