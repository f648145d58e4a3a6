//! Watermark tiling layout
//!
//! The watermark does not measure the page. It stacks a fixed number of rows
//! at a fixed pitch, starting above the top edge, which covers any common
//! page size.

use std::fmt;

/// First row index (rows above the page top are clipped by the renderer)
pub const FIRST_ROW: i32 = -5;
/// Last row index, inclusive
pub const LAST_ROW: i32 = 19;
/// Vertical distance between rows, in `margin-top` units
pub const ROW_PITCH: i32 = 100;

/// Shape height in points
pub const SHAPE_HEIGHT_PT: u32 = 20;
/// Keeps the watermark behind body text
pub const SHAPE_Z_INDEX: i64 = -251654144;

/// `margin-top` offsets for every row, top to bottom
pub fn vertical_offsets() -> impl Iterator<Item = i32> {
    (FIRST_ROW..=LAST_ROW).map(|row| row * ROW_PITCH)
}

/// Positioning style of one watermark shape
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStyle {
    pub width_pt: usize,
    pub height_pt: u32,
    pub z_index: i64,
    pub margin_top: i32,
    pub rotation: String,
}

impl ShapeStyle {
    /// Style declarations in the order they are written
    pub fn declarations(&self) -> Vec<(&'static str, String)> {
        vec![
            ("position", "absolute".to_string()),
            ("width", format!("{}pt", self.width_pt)),
            ("height", format!("{}pt", self.height_pt)),
            ("z-index", self.z_index.to_string()),
            ("mso-wrap-edited", "f".to_string()),
            // rows are spaced with margin-top, not top
            ("margin-top", self.margin_top.to_string()),
            ("mso-position-horizontal-relative", "page".to_string()),
            ("mso-position-vertical-relative", "page".to_string()),
            ("mso-position-vertical", "left".to_string()),
            ("mso-position-horizontal", "center".to_string()),
            ("rotation", self.rotation.clone()),
        ]
    }
}

impl fmt::Display for ShapeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .declarations()
            .iter()
            .map(|(key, value)| format!("{}:{}", key, value))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// Look up one declaration in a CSS-like `key:value; key:value` string
pub fn style_value<'a>(style: &'a str, key: &str) -> Option<&'a str> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim())
}
