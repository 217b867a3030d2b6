//! EPUB archive access.
//!
//! An EPUB is a zip archive whose `META-INF/container.xml` points at an
//! OPF package file; the OPF manifest maps item ids to hrefs and the
//! spine gives the reading order. Only spine documents matter here.

use crate::error::{AppError, Result};
use roxmltree::Document;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// One spine-ordered content document.
#[derive(Debug, Clone)]
pub struct DocumentItem {
    /// Manifest id of the item.
    pub id: String,
    /// Path of the document inside the archive.
    pub path: String,
}

/// An opened EPUB with its spine already resolved.
pub struct EpubArchive<R: Read + Seek> {
    archive: ZipArchive<R>,
    documents: Vec<DocumentItem>,
}

impl EpubArchive<File> {
    /// Open an EPUB file from disk.
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }
}

impl<R: Read + Seek> EpubArchive<R> {
    /// Open an EPUB from any seekable reader.
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;

        let opf_path = find_opf_path(&mut archive)?;
        let opf_dir = opf_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");

        let opf_content = read_entry(&mut archive, &opf_path)?;
        let file_names: Vec<String> = archive.file_names().map(String::from).collect();
        let documents = parse_spine(&opf_content, opf_dir, &file_names)?;

        Ok(Self { archive, documents })
    }

    /// Spine documents in reading order.
    pub fn documents(&self) -> &[DocumentItem] {
        &self.documents
    }

    /// Read a spine document's markup.
    pub fn read_document(&mut self, item: &DocumentItem) -> Result<String> {
        read_entry(&mut self.archive, &item.path)
    }
}

/// Find the OPF file path from container.xml.
fn find_opf_path<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String> {
    let mut container = archive.by_name("META-INF/container.xml")?;
    let mut content = String::new();
    container.read_to_string(&mut content)?;

    let doc = Document::parse(&content)?;

    doc.descendants()
        .find(|n| n.has_tag_name("rootfile"))
        .and_then(|n| n.attribute("full-path"))
        .map(String::from)
        .ok_or_else(|| AppError::InvalidFormat("No rootfile in container.xml".into()))
}

/// Read an archive entry as text, tolerating stray non-UTF-8 bytes.
fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut data = Vec::new();
    archive.by_name(name)?.read_to_end(&mut data)?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

/// Parse the OPF manifest and spine into an ordered document list.
fn parse_spine(
    content: &str,
    opf_dir: &str,
    file_names: &[String],
) -> Result<Vec<DocumentItem>> {
    let doc = Document::parse(content)?;

    // Manifest: id -> (href, media-type)
    let mut manifest: Vec<(&str, &str, &str)> = Vec::new();
    for node in doc.descendants() {
        if node.tag_name().name() == "item"
            && let (Some(id), Some(href)) = (node.attribute("id"), node.attribute("href"))
        {
            let media_type = node.attribute("media-type").unwrap_or("");
            manifest.push((id, href, media_type));
        }
    }

    let mut documents = Vec::new();
    for node in doc.descendants() {
        if node.tag_name().name() != "itemref" {
            continue;
        }
        let Some(idref) = node.attribute("idref") else {
            continue;
        };
        let Some(&(id, href, media_type)) = manifest.iter().find(|(id, _, _)| *id == idref)
        else {
            continue;
        };
        if !matches!(media_type, "application/xhtml+xml" | "text/html") {
            continue;
        }

        // Hrefs are relative to the OPF directory; some books write them
        // from the archive root instead, so prefer whichever exists.
        let resolved = if opf_dir.is_empty() {
            href.to_string()
        } else {
            format!("{}/{}", opf_dir.trim_end_matches('/'), href)
        };
        let path = if file_names.iter().any(|n| n == &resolved) {
            resolved
        } else {
            href.to_string()
        };

        documents.push(DocumentItem {
            id: id.to_string(),
            path,
        });
    }

    Ok(documents)
}
