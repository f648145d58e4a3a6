//! OPC package container (the zip archive behind a .docx)

use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};
use crate::error::Result;

/// A single zip entry
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
}

/// In-memory package: every entry is read up front and written back in order
#[derive(Debug, Clone, Default)]
pub struct Package {
    entries: Vec<Entry>,
}

impl Package {
    /// Read every entry of a zip archive
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::new();
            if !file.is_dir() {
                file.read_to_end(&mut data)?;
            }
            entries.push(Entry {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
                is_dir: file.is_dir(),
            });
        }

        Ok(Self { entries })
    }

    /// Part names (zip entry names, no leading slash), in archive order
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.find(name).map(|e| e.data.as_slice())
    }

    /// Replace a part's bytes, or append a new deflated part
    pub fn put(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|e| !e.is_dir && e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(Entry {
                name: name.to_string(),
                data,
                compression: CompressionMethod::Deflated,
                is_dir: false,
            }),
        }
    }

    fn find(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| !e.is_dir && e.name == name)
    }

    /// Write the archive, keeping each entry's original compression method
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            let options = FileOptions::default().compression_method(entry.compression);
            if entry.is_dir {
                writer.add_directory(entry.name.as_str(), options)?;
                continue;
            }
            writer.start_file(entry.name.as_str(), options)?;
            writer.write_all(&entry.data)?;
        }

        Ok(writer.finish()?.into_inner())
    }
}

/// Directory portion of a part name, without trailing slash
pub fn part_dir(part: &str) -> &str {
    match part.rfind('/') {
        Some(idx) => &part[..idx],
        None => "",
    }
}

/// Relationships part that belongs to `part`
///
/// `word/document.xml` → `word/_rels/document.xml.rels`; the package itself
/// (empty name) → `_rels/.rels`.
pub fn rels_part_for(part: &str) -> String {
    let dir = part_dir(part);
    let file = match part.rfind('/') {
        Some(idx) => &part[idx + 1..],
        None => part,
    };
    if dir.is_empty() {
        format!("_rels/{}.rels", file)
    } else {
        format!("{}/_rels/{}.rels", dir, file)
    }
}

/// Resolve a relationship target against the part that owns the relationship
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let joined = if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        let dir = part_dir(source_part);
        if dir.is_empty() {
            target.to_string()
        } else {
            format!("{}/{}", dir, target)
        }
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
