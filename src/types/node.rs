//! MetadataNode - one file or directory in the scanned tree

use chrono::{DateTime, Local, SecondsFormat};
use serde::{Deserialize, Serialize, Serializer};
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A scanned filesystem entry. Directories carry `children`, files do not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataNode {
    /// File name including extension
    pub full_name: String,

    /// Name up to the first `.`
    pub name: String,

    /// Everything after the first `.` (empty for directories)
    pub extension: String,

    /// Absolute path at scan time
    #[serde(serialize_with = "serialize_path_lossy")]
    pub route: PathBuf,

    /// Modification time, RFC 3339
    pub last_modified: String,

    /// Raw size reported by the filesystem. For directories this is the
    /// directory inode itself, not the sum of its contents.
    pub size: u64,

    #[serde(rename = "elems", default, skip_serializing_if = "has_no_children")]
    pub children: Option<Vec<MetadataNode>>,
}

/// Write a path as a JSON string, replacing bytes that are not valid UTF-8
/// with U+FFFD instead of failing the whole document.
pub(crate) fn serialize_path_lossy<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&path.to_string_lossy())
}

fn has_no_children(children: &Option<Vec<MetadataNode>>) -> bool {
    children.as_ref().map_or(true, Vec::is_empty)
}

impl MetadataNode {
    /// Create a directory node with no children yet
    pub fn directory(path: &Path, metadata: &Metadata) -> io::Result<Self> {
        let full_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name: full_name.clone(),
            full_name,
            extension: String::new(),
            route: path.to_path_buf(),
            last_modified: format_timestamp(metadata.modified()?),
            size: metadata.len(),
            children: Some(Vec::new()),
        })
    }

    /// Create a file node; `path` must end in `full_name`
    pub fn file(path: &Path, full_name: &str, metadata: &Metadata) -> io::Result<Self> {
        let (name, extension) = split_name(full_name);

        Ok(Self {
            full_name: full_name.to_string(),
            name: name.to_string(),
            extension: extension.to_string(),
            route: path.to_path_buf(),
            last_modified: format_timestamp(metadata.modified()?),
            size: metadata.len(),
            children: None,
        })
    }

    pub fn is_dir(&self) -> bool {
        self.children.is_some()
    }

    /// Direct children (empty for files)
    pub fn children(&self) -> &[MetadataNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Append a child; no-op on file nodes
    pub fn push_child(&mut self, child: MetadataNode) {
        if let Some(children) = self.children.as_mut() {
            children.push(child);
        }
    }

    /// Direct child by full name
    pub fn child(&self, full_name: &str) -> Option<&MetadataNode> {
        self.children().iter().find(|c| c.full_name == full_name)
    }

    /// Number of file nodes below this one
    pub fn file_count(&self) -> usize {
        self.children()
            .iter()
            .map(|c| if c.is_dir() { c.file_count() } else { 1 })
            .sum()
    }

    /// Number of directory nodes below this one
    pub fn dir_count(&self) -> usize {
        self.children()
            .iter()
            .filter(|c| c.is_dir())
            .map(|c| 1 + c.dir_count())
            .sum()
    }
}

/// Split a file name at the first `.`. A name with no dot has an empty extension.
pub fn split_name(full_name: &str) -> (&str, &str) {
    full_name.split_once('.').unwrap_or((full_name, ""))
}

/// Format a filesystem time as RFC 3339 in local time, second precision
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time).to_rfc3339_opts(SecondsFormat::Secs, true)
}
