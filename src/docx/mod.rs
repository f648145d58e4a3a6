//! Minimal WordprocessingML document model
//!
//! Just enough of the OPC package and the main document part to locate or
//! create the default header and edit it in place.

pub mod content_types;
pub mod document;
pub mod header;
pub mod package;
pub mod rels;
pub mod xml;

/// WordprocessingML main namespace
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Office document relationships namespace (`r:id` attributes)
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// Legacy VML drawing namespace
pub const V_NS: &str = "urn:schemas-microsoft-com:vml";
/// Office VML extensions namespace
pub const O_NS: &str = "urn:schemas-microsoft-com:office:office";

// Re-export commonly used items
pub use document::{Document, RevisionIds};
pub use header::{Header, ShapeInfo};
pub use package::Package;
