// 📤 Output - DHIS2 metadata import document
// Sorted keys, 4-space indent, ASCII-only strings: downstream diffs depend on this exact layout

use crate::error::OutputError;
use crate::model::{OrgUnit, SystemMeta};
use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, PrettyFormatter};
use sha2::{Digest, Sha256};
use std::io;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub system: SystemMeta,
    #[serde(rename = "organisationUnits")]
    pub organisation_units: Vec<OrgUnit>,
}

// ============================================================================
// FORMATTER
// ============================================================================

/// Pretty printer that writes every character outside printable ASCII
/// (`' '..='~'`) as a `\uXXXX` escape, UTF-16 surrogate pairs above the BMP.
/// Quotes, backslashes and C0 controls never reach `write_string_fragment`.
struct AsciiFormatter<'a> {
    pretty: PrettyFormatter<'a>,
}

impl<'a> AsciiFormatter<'a> {
    fn new() -> Self {
        AsciiFormatter {
            pretty: PrettyFormatter::with_indent(b"    "),
        }
    }
}

impl Formatter for AsciiFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..i])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

// ============================================================================
// SERIALIZATION
// ============================================================================

/// Serialize with the import-file layout.
///
/// The value goes through `serde_json::Value` first, whose maps are ordered
/// by key, so nested and flattened fields all come out sorted.
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String, OutputError> {
    let value = serde_json::to_value(value)?;
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, AsciiFormatter::new());
    value.serialize(&mut ser)?;
    // the formatter only ever emits ASCII
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Hex SHA-256 of the serialized bytes, logged so reruns can be compared.
pub fn digest(json: &str) -> String {
    format!("{:x}", Sha256::digest(json.as_bytes()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<String, OutputError> {
    let json = to_json_string(value)?;
    std::fs::write(path, &json).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    let digest = digest(&json);
    info!(path = %path.display(), bytes = json.len(), sha256 = %digest, "wrote metadata");
    Ok(digest)
}
