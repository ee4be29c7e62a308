//! The package archive: named part payloads of a DOCX file.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// Text encodings an XML part may arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl PartEncoding {
    /// Detect the encoding from the byte order mark, or from the zero bytes
    /// ASCII markup leaves in BOM-less UTF-16. Returns the BOM length too.
    fn sniff(bytes: &[u8]) -> (Self, usize) {
        match bytes {
            [0xEF, 0xBB, 0xBF, ..] => (PartEncoding::Utf8, 3),
            [0xFF, 0xFE, ..] => (PartEncoding::Utf16Le, 2),
            [0xFE, 0xFF, ..] => (PartEncoding::Utf16Be, 2),
            [b'<', 0, _, 0, ..] => (PartEncoding::Utf16Le, 0),
            [0, b'<', 0, _, ..] => (PartEncoding::Utf16Be, 0),
            _ => (PartEncoding::Utf8, 0),
        }
    }
}

/// Decode an XML part to text. UTF-16 input has its declaration restated as
/// UTF-8, since the text handed to the XML reader is no longer UTF-16.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    let (encoding, bom) = PartEncoding::sniff(bytes);
    let body = &bytes[bom..];
    match encoding {
        PartEncoding::Utf8 => match std::str::from_utf8(body) {
            Ok(text) => Ok(text.to_string()),
            Err(e) if bom > 0 => Err(Error::Encoding(e.to_string())),
            Err(_) => Ok(String::from_utf8_lossy(body).into_owned()),
        },
        PartEncoding::Utf16Le => decode_utf16(body, u16::from_le_bytes).map(restate_as_utf8),
        PartEncoding::Utf16Be => decode_utf16(body, u16::from_be_bytes).map(restate_as_utf8),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    char::decode_utf16(bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]])))
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Encoding(e.to_string()))
}

fn restate_as_utf8(text: String) -> String {
    let Some(decl_end) = text
        .strip_prefix("<?xml")
        .and_then(|_| text.find("?>"))
    else {
        return text;
    };
    let declaration = text[..decl_end].to_ascii_lowercase();
    let Some(at) = declaration.find("utf-16") else {
        return text;
    };
    let mut fixed = text;
    fixed.replace_range(at..at + "utf-16".len(), "UTF-8");
    fixed
}

/// A DOCX package opened over an in-memory ZIP archive.
///
/// Required parts are read with [`read_xml`](Self::read_xml) and
/// [`read_binary`](Self::read_binary), which report absence as
/// [`Error::MissingComponent`]; optional parts with the `*_optional`
/// readers, which report it as `Ok(None)`.
pub struct OoxmlContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl OoxmlContainer {
    /// Open a package file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use undocx::container::OoxmlContainer;
    ///
    /// let container = OoxmlContainer::open("document.docx")?;
    /// assert!(container.exists("word/document.xml"));
    /// # Ok::<(), undocx::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(std::fs::read(path)?)
    }

    /// Open a package held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Open a package from any seekable reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Read an XML part as a string, failing if it is absent.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        decode_xml_bytes(&self.read_binary(path)?)
    }

    /// Read an optional XML part; absence is `Ok(None)`.
    pub fn read_xml_optional(&self, path: &str) -> Result<Option<String>> {
        self.read_binary_optional(path)?
            .map(|bytes| decode_xml_bytes(&bytes))
            .transpose()
    }

    /// Read a binary part, failing if it is absent.
    pub fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        self.read_binary_optional(path)?
            .ok_or_else(|| Error::MissingComponent(path.to_string()))
    }

    /// Read an optional binary part; absence is `Ok(None)`.
    pub fn read_binary_optional(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let mut archive = self.archive.borrow_mut();
        let mut entry = match archive.by_name(path) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut data = Vec::with_capacity(entry.size().min(1 << 20) as usize);
        entry.read_to_end(&mut data)?;
        Ok(Some(data))
    }

    /// Read a binary part, refusing entries larger than `limit` bytes.
    ///
    /// The declared size is checked before decompression and the read itself
    /// is bounded, so a lying header cannot force an unbounded allocation.
    pub fn read_binary_limited(&self, path: &str, limit: u64) -> Result<Vec<u8>> {
        let too_large = |size: u64| Error::ResourceTooLarge {
            path: path.to_string(),
            size,
            limit,
        };

        let mut archive = self.archive.borrow_mut();
        let entry = match archive.by_name(path) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(Error::ResourceNotFound(path.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        if entry.size() > limit {
            return Err(too_large(entry.size()));
        }

        let mut data = Vec::new();
        entry.take(limit.saturating_add(1)).read_to_end(&mut data)?;
        if data.len() as u64 > limit {
            return Err(too_large(data.len() as u64));
        }
        Ok(data)
    }

    /// Whether the archive has an entry named `path`.
    pub fn exists(&self, path: &str) -> bool {
        self.archive.borrow().index_for_name(path).is_some()
    }

    /// Names of all archive entries.
    pub fn list_files(&self) -> Vec<String> {
        self.list_files_with_prefix("")
    }

    /// Names of the archive entries under `prefix` (e.g. `word/media/`).
    pub fn list_files_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.archive
            .borrow()
            .file_names()
            .filter(|name| name.starts_with(prefix))
            .map(str::to_string)
            .collect()
    }

    /// Path of the relationship manifest belonging to `part_path`.
    pub fn rels_path_for(part_path: &str) -> String {
        if part_path.is_empty() || part_path == "/" {
            return "_rels/.rels".to_string();
        }
        match part_path.rsplit_once('/') {
            Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
            None => format!("_rels/{}.rels", part_path),
        }
    }

    /// Resolve a relationship target against the part that declares it.
    ///
    /// Targets starting with `/` are package-absolute; others are relative
    /// to the directory of `base`, with `.` and `..` segments applied.
    pub fn resolve_path(base: &str, relative: &str) -> String {
        let mut segments: Vec<&str> = match relative.strip_prefix('/') {
            Some(_) => Vec::new(),
            None => {
                let mut dir: Vec<&str> = base.split('/').collect();
                dir.pop();
                dir
            }
        };

        for segment in relative.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                name => segments.push(name),
            }
        }
        segments.retain(|s| !s.is_empty());
        segments.join("/")
    }
}

impl std::fmt::Debug for OoxmlContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlContainer")
            .field("entries", &self.archive.borrow().len())
            .finish()
    }
}
