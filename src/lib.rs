//! DOCX Watermark Library
//!
//! A cross-platform library for stamping a text watermark onto Word documents.
//! This library provides functionality to:
//! - Open and save .docx packages without disturbing unrelated parts
//! - Create or reuse the document's default header
//! - Tile a rotated, light-grey text watermark across the whole page
//!
//! # Example
//!
//! ```no_run
//! use docx_watermark::watermark::{watermark_docx, WatermarkOptions};
//! use std::path::PathBuf;
//!
//! let options = WatermarkOptions {
//!     input_path: PathBuf::from("report.docx"),
//!     output_path: PathBuf::from("report-confidential.docx"),
//!     text: "CONFIDENTIAL".to_string(),
//! };
//!
//! watermark_docx(&options).expect("Failed to add watermark");
//! ```

pub mod error;
pub mod docx;
pub mod layout;
pub mod logging;
pub mod watermark;

// Re-export commonly used items
pub use docx::Document;
pub use error::{Error, Result};
pub use watermark::{apply_full_page_watermark, watermark_docx, WatermarkOptions, WatermarkSpec};
