//! In-memory zip assembly
//!
//! Entries are collected first and serialized in one pass by [`ArchiveBuilder::finish`].
//! Entry order is insertion order, and every entry carries the same fixed
//! modification time, so identical input always yields identical bytes.

use std::io::{Cursor, Write};

use anyhow::{Context, Result};
use zip::{write::SimpleFileOptions, CompressionMethod, DateTime, ZipWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryContent {
    Text(String),
    Binary(Vec<u8>),
}

impl EntryContent {
    fn as_bytes(&self) -> &[u8] {
        match self {
            EntryContent::Text(text) => text.as_bytes(),
            EntryContent::Binary(bytes) => bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub content: EntryContent,
}

#[derive(Debug, Clone, Default)]
pub struct ArchiveBuilder {
    entries: Vec<ArchiveEntry>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_text(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.insert(name.into(), EntryContent::Text(text.into()))
    }

    pub fn add_binary(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> &mut Self {
        self.insert(name.into(), EntryContent::Binary(bytes))
    }

    /// Re-adding a name replaces the content but keeps the original position
    fn insert(&mut self, name: String, content: EntryContent) -> &mut Self {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => existing.content = content,
            None => self.entries.push(ArchiveEntry { name, content }),
        }
        self
    }

    /// Serialize all entries into one zip buffer
    pub fn finish(&self) -> Result<Vec<u8>> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            writer
                .start_file(entry.name.as_str(), options)
                .with_context(|| format!("[export::archive] Failed to start entry {}", entry.name))?;
            writer
                .write_all(entry.content.as_bytes())
                .with_context(|| format!("[export::archive] Failed to write entry {}", entry.name))?;
        }

        let cursor = writer
            .finish()
            .context("[export::archive] Failed to finalize zip archive")?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    /// Entry names of a zip buffer, in archive order
    pub(crate) fn names(bytes: &[u8]) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    pub(crate) fn read_text(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut text = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        text
    }

    pub(crate) fn read_bytes(bytes: &[u8], name: &str) -> Vec<u8> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut out = Vec::new();
        archive.by_name(name).unwrap().read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut builder = ArchiveBuilder::new();
        builder
            .add_text("README.txt", "hello")
            .add_binary("b.bin", vec![1, 2, 3])
            .add_text("a.txt", "a");
        let bytes = builder.finish().unwrap();

        assert_eq!(names(&bytes), vec!["README.txt", "b.bin", "a.txt"]);
        assert_eq!(read_text(&bytes, "README.txt"), "hello");
        assert_eq!(read_bytes(&bytes, "b.bin"), vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_name_replaces_in_place() {
        let mut builder = ArchiveBuilder::new();
        builder
            .add_text("first.txt", "old")
            .add_text("second.txt", "2")
            .add_text("first.txt", "new");

        let bytes = builder.finish().unwrap();
        assert_eq!(names(&bytes), vec!["first.txt", "second.txt"]);
        assert_eq!(read_text(&bytes, "first.txt"), "new");
    }

    #[test]
    fn test_identical_input_is_byte_identical() {
        let build = || {
            let mut builder = ArchiveBuilder::new();
            builder.add_text("data.csv", "a,b\n1,2\n");
            builder.finish().unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let bytes = ArchiveBuilder::new().finish().unwrap();
        assert!(names(&bytes).is_empty());
    }
}
