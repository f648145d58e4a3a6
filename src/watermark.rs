//! Full-page text watermarks in the document header
//!
//! A watermark is a VML text-path shape ("WordArt") placed in the default
//! header, so Word repeats it on every page. One shape is a single row of the
//! repeated text; [`apply_full_page_watermark`] stacks rows at the offsets from
//! [`crate::layout::vertical_offsets`] to cover the page.

use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};
use crate::docx::xml::{qualify, Element};
use crate::docx::{Document, Header, RevisionIds};
use crate::error::{Error, Result};
use crate::layout::{vertical_offsets, ShapeStyle, SHAPE_HEIGHT_PT, SHAPE_Z_INDEX};

/// Font family of the watermark text
pub const FONT_NAME: &str = "宋体";
/// Text-path font size; the glyphs are scaled to the shape, not to this
pub const FONT_SIZE: &str = "0.2pt";
/// Fill colour of the glyphs
pub const FONT_COLOR: &str = "#d0d0d0";
/// Average character width in points, used to size the shape
pub const CHAR_WIDTH_PT: usize = 10;
/// Rotation of every row, in degrees
pub const ROTATION: &str = "30";
/// Spaces between repetitions of the text within a row
pub const SEPARATOR_SPACES: usize = 8;
/// Repetitions of the text within a row
pub const REPEATS_PER_ROW: usize = 10;

/// Shape id written on every watermark shape
///
/// Every row uses the same ids. Word accepts the duplicates, and other
/// tools look for this exact value, so it stays constant.
pub const SHAPE_ID: &str = "PowerPlusWaterMarkObject";
/// `o:spid` written on every watermark shape
pub const SHAPE_SPID: &str = "_x0000_s102";
/// Built-in plain-text WordArt shape type
pub const SHAPE_TYPE_ID: &str = "_x0000_t136";
/// Paragraph style of the carrier paragraph
pub const HEADER_STYLE: &str = "Header";

/// Everything needed to draw one watermark row
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkSpec {
    pub text: String,
    pub font_name: String,
    pub font_size: String,
    pub font_color: String,
    /// Points per character
    pub char_width: usize,
    /// Degrees
    pub rotation: String,
    /// `margin-top` of the row
    pub vertical_offset: i32,
}

impl WatermarkSpec {
    /// Spec with the fixed watermark look and a zero offset
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_name: FONT_NAME.to_string(),
            font_size: FONT_SIZE.to_string(),
            font_color: FONT_COLOR.to_string(),
            char_width: CHAR_WIDTH_PT,
            rotation: ROTATION.to_string(),
            vertical_offset: 0,
        }
    }

    /// Same spec, placed at another row
    pub fn with_vertical_offset(&self, vertical_offset: i32) -> Self {
        Self {
            vertical_offset,
            ..self.clone()
        }
    }

    /// One row of text: the text plus separator, repeated across the page
    pub fn tiled_text(&self) -> String {
        let unit = format!("{}{}", self.text, " ".repeat(SEPARATOR_SPACES));
        unit.repeat(REPEATS_PER_ROW)
    }

    /// Shape style for this row; the width follows the tiled text length
    pub fn shape_style(&self) -> ShapeStyle {
        ShapeStyle {
            width_pt: self.tiled_text().chars().count() * self.char_width,
            height_pt: SHAPE_HEIGHT_PT,
            z_index: SHAPE_Z_INDEX,
            margin_top: self.vertical_offset,
            rotation: self.rotation.clone(),
        }
    }

    /// Font declarations of the text path
    pub fn text_path_style(&self) -> String {
        format!("font-family:{};font-size:{}", self.font_name, self.font_size)
    }
}

/// Options for watermarking a file
#[derive(Debug, Clone)]
pub struct WatermarkOptions {
    /// Input .docx file path
    pub input_path: PathBuf,
    /// Output .docx file path
    pub output_path: PathBuf,
    /// Watermark text
    pub text: String,
}

/// Watermark a .docx file and write the result to a new file
///
/// The output is built completely in memory first, so a missing or broken
/// input never creates or touches the output file.
///
/// # Example
///
/// ```no_run
/// use docx_watermark::watermark::{watermark_docx, WatermarkOptions};
/// use std::path::PathBuf;
///
/// let options = WatermarkOptions {
///     input_path: PathBuf::from("contract.docx"),
///     output_path: PathBuf::from("contract-draft.docx"),
///     text: "DRAFT".to_string(),
/// };
///
/// watermark_docx(&options).expect("Failed to add watermark");
/// ```
pub fn watermark_docx(options: &WatermarkOptions) -> Result<()> {
    let started = Instant::now();

    debug!("Watermarking {}", options.input_path.display());
    let mut doc = Document::open(&options.input_path)?;
    apply_full_page_watermark(&mut doc, &options.text)?;
    doc.save(&options.output_path)?;

    info!(
        "Watermark added to {} in {} ms",
        options.output_path.display(),
        started.elapsed().as_millis()
    );
    Ok(())
}

/// Cover the page with watermark rows in the document's default header
///
/// The default header is created if the document has none. Each call appends
/// a full set of rows; nothing already in the header is replaced, so calling
/// this twice yields twice the shapes.
pub fn apply_full_page_watermark(doc: &mut Document, text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(Error::EmptyWatermarkText);
    }

    let revision = doc.first_paragraph_revision_ids()?;
    let spec = WatermarkSpec::new(text);
    let header = doc.create_default_header()?;

    let mut rows = 0;
    for offset in vertical_offsets() {
        place_one_watermark(header, &revision, &spec.with_vertical_offset(offset))?;
        rows += 1;
    }

    debug!("Placed {} watermark rows in {}", rows, header.part_name());
    Ok(())
}

/// Append one watermark row to the header's carrier paragraph
pub(crate) fn place_one_watermark(
    header: &mut Header,
    revision: &RevisionIds,
    spec: &WatermarkSpec,
) -> Result<()> {
    let (v, o) = header.vml_prefixes();
    let w = |local: &str| header.w(local);
    let (rsid_p, rsid_r_default) = (w("rsidP"), w("rsidRDefault"));
    let (p_pr, p_style, val) = (w("pPr"), w("pStyle"), w("val"));

    let run = Element::new(w("r"))
        .with_child(Element::new(w("rPr")).with_child(Element::new(w("noProof"))))
        .with_child(Element::new(w("pict"))
            .with_child(build_shape_type(&v, &o))
            .with_child(build_shape(&v, &o, spec)));

    let carrier = header.carrier_paragraph_mut();
    if let Some(rsid) = &revision.rsid_r {
        carrier.set_attr(rsid_p, rsid.as_str());
    }
    if let Some(rsid) = &revision.rsid_r_default {
        carrier.set_attr(rsid_r_default, rsid.as_str());
    }

    // w:pPr must stay the first child, and there is only ever one
    carrier
        .ensure_child(&p_pr, 0)
        .ensure_child(&p_style, 0)
        .set_attr(val, HEADER_STYLE);

    carrier.push_child(run);
    Ok(())
}

/// `v:shapetype` for the built-in plain-text WordArt template
fn build_shape_type(v: &str, o: &str) -> Element {
    Element::new(qualify(v, "shapetype"))
        .with_attr("id", SHAPE_TYPE_ID)
        .with_attr("coordsize", "21600,21600")
        .with_attr(qualify(o, "spt"), "136")
        .with_child(
            Element::new(qualify(v, "textpath"))
                .with_attr("on", "t")
                .with_attr("fitshape", "t"),
        )
        .with_child(Element::new(qualify(o, "lock")).with_attr(qualify(v, "ext"), "view"))
}

/// The rotated text-path shape for one row
fn build_shape(v: &str, o: &str, spec: &WatermarkSpec) -> Element {
    Element::new(qualify(v, "shape"))
        .with_attr("id", SHAPE_ID)
        .with_attr(qualify(o, "spid"), SHAPE_SPID)
        .with_attr("type", format!("#{}", SHAPE_TYPE_ID))
        .with_attr("style", spec.shape_style().to_string())
        .with_attr("fillcolor", spec.font_color.as_str())
        .with_attr("stroked", "f")
        .with_child(
            Element::new(qualify(v, "textpath"))
                .with_attr("style", spec.text_path_style())
                .with_attr("string", spec.tiled_text()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::style_value;

    #[test]
    fn test_tiled_text_sample() {
        let spec = WatermarkSpec::new("SAMPLE");
        let tiled = spec.tiled_text();

        assert_eq!(tiled, "SAMPLE        ".repeat(10));
        assert_eq!(tiled.chars().count(), 140);
        assert_eq!(spec.shape_style().width_pt, 1400);
    }

    #[test]
    fn test_width_counts_characters_not_bytes() {
        let spec = WatermarkSpec::new("机密");
        // (2 + 8) * 10 characters
        assert_eq!(spec.tiled_text().chars().count(), 100);
        assert_eq!(spec.shape_style().width_pt, 1000);
    }

    #[test]
    fn test_offset_only_changes_margin_top() {
        let spec = WatermarkSpec::new("DRAFT");
        let moved = spec.with_vertical_offset(-500);

        assert_eq!(moved.tiled_text(), spec.tiled_text());
        assert_eq!(style_value(&moved.shape_style().to_string(), "margin-top"), Some("-500"));
        let expected = ShapeStyle {
            margin_top: -500,
            ..spec.shape_style()
        };
        assert_eq!(moved.shape_style(), expected);
    }

    #[test]
    fn test_place_one_watermark_builds_run() {
        let mut header = Header::new("word/header1.xml");
        let revision = RevisionIds {
            rsid_r: Some("00A1B2C3".to_string()),
            rsid_r_default: Some("00D4E5F6".to_string()),
        };
        let spec = WatermarkSpec::new("SAMPLE").with_vertical_offset(300);

        place_one_watermark(&mut header, &revision, &spec).unwrap();
        place_one_watermark(&mut header, &revision, &spec).unwrap();

        assert_eq!(header.paragraph_count(), 1);
        let carrier = header.paragraphs()[0];
        assert_eq!(carrier.attr("w:rsidP"), Some("00A1B2C3"));
        assert_eq!(carrier.attr("w:rsidRDefault"), Some("00D4E5F6"));

        let names: Vec<&str> = carrier.child_elements().map(|el| el.name.as_str()).collect();
        assert_eq!(names, vec!["w:pPr", "w:r", "w:r"]);
        let style = carrier.find_child("w:pPr").unwrap().find_child("w:pStyle").unwrap();
        assert_eq!(style.attr("w:val"), Some("Header"));

        let run = carrier.find_child("w:r").unwrap();
        assert!(run.find_child("w:rPr").unwrap().find_child("w:noProof").is_some());
        let pict = run.find_child("w:pict").unwrap();
        let shape_type = pict.find_child("v:shapetype").unwrap();
        assert_eq!(shape_type.attr("id"), Some(SHAPE_TYPE_ID));
        assert_eq!(shape_type.find_child("o:lock").unwrap().attr("v:ext"), Some("view"));

        let shapes = header.watermark_shapes();
        assert_eq!(shapes.len(), 2);
        let shape = &shapes[0];
        assert_eq!(shape.id.as_deref(), Some(SHAPE_ID));
        assert_eq!(shape.spid.as_deref(), Some(SHAPE_SPID));
        assert_eq!(shape.shape_type.as_deref(), Some("#_x0000_t136"));
        assert_eq!(shape.fill_color.as_deref(), Some(FONT_COLOR));
        assert_eq!(shape.stroked.as_deref(), Some("f"));
        assert_eq!(shape.text_style.as_deref(), Some("font-family:宋体;font-size:0.2pt"));
        assert_eq!(shape.style_value("margin-top"), Some("300"));
        assert_eq!(shape.style_value("width"), Some("1400pt"));
        assert_eq!(shape.style_value("rotation"), Some("30"));
        assert_eq!(shapes[0], shapes[1]);
    }

    #[test]
    fn test_missing_revision_ids_leave_carrier_untouched() {
        let mut header = Header::new("word/header1.xml");
        place_one_watermark(&mut header, &RevisionIds::default(), &WatermarkSpec::new("X")).unwrap();

        let carrier = header.paragraphs()[0];
        assert_eq!(carrier.attr("w:rsidP"), None);
        assert_eq!(carrier.attr("w:rsidRDefault"), None);
    }
}
