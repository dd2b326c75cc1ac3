//! JSONL storage for inventory records.
//!
//! One tagged [`Entity`] per line. [`canonical_lines`] fixes the on-disk
//! order (statuses, then location types, then locations, each by name) so
//! records a line refers to come before it. The same lines feed
//! [`MemoryInventory::snapshot_ref`](crate::MemoryInventory::snapshot_ref).

use crate::record::{Entity, RecordKind};
use serde_json::Value;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Errors from reading or writing inventory JSONL.
#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupted inventory file {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: &'static str },

    #[error("line {line}: invalid JSON: {source}")]
    Syntax {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: record has no `kind` tag")]
    MissingKind { line: usize },

    #[error("line {line}: unknown record kind `{kind}`")]
    UnknownKind { line: usize, kind: String },

    #[error("line {line}: invalid {} record `{name}`: {source}", .kind.label())]
    Record {
        line: usize,
        kind: RecordKind,
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot serialize {} record `{name}`: {source}", .kind.label())]
    Serialize {
        kind: RecordKind,
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Render records as JSONL lines in canonical order.
pub fn canonical_lines(entities: &[Entity]) -> Result<Vec<String>, JsonlError> {
    let mut ordered: Vec<&Entity> = entities.iter().collect();
    ordered.sort_by(|a, b| (a.kind(), a.name()).cmp(&(b.kind(), b.name())));
    ordered
        .into_iter()
        .map(|entity| {
            serde_json::to_string(entity).map_err(|source| JsonlError::Serialize {
                kind: entity.kind(),
                name: entity.name().to_string(),
                source,
            })
        })
        .collect()
}

/// Parse one non-blank line. `line` is 1-based and only used in errors.
pub fn parse_line(line: usize, raw: &str) -> Result<Entity, JsonlError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|source| JsonlError::Syntax { line, source })?;
    let Some(tag) = value.get("kind").and_then(Value::as_str) else {
        return Err(JsonlError::MissingKind { line });
    };
    let kind = RecordKind::from_tag(tag).ok_or_else(|| JsonlError::UnknownKind {
        line,
        kind: tag.to_string(),
    })?;
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    serde_json::from_value(value).map_err(|source| JsonlError::Record {
        line,
        kind,
        name,
        source,
    })
}

/// Read records from a JSONL reader, skipping blank and `#` lines.
pub fn read_entities(reader: impl BufRead) -> Result<Vec<Entity>, JsonlError> {
    let mut entities = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| JsonlError::Io {
            path: PathBuf::from("<reader>"),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        entities.push(parse_line(index + 1, trimmed)?);
    }
    Ok(entities)
}

/// Read records from an inventory file.
pub fn read_entities_from_path(path: impl AsRef<Path>) -> Result<Vec<Entity>, JsonlError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| io_error(path, source))?;
    if bytes.contains(&0) {
        return Err(JsonlError::Corrupt {
            path: path.to_path_buf(),
            reason: "contains NUL byte(s)",
        });
    }
    if std::str::from_utf8(&bytes).is_err() {
        return Err(JsonlError::Corrupt {
            path: path.to_path_buf(),
            reason: "contains non-UTF-8 byte sequence(s)",
        });
    }
    let entities = read_entities(BufReader::new(bytes.as_slice()))?;
    tracing::debug!(path = %path.display(), records = entities.len(), "loaded inventory");
    Ok(entities)
}

/// Replace an inventory file with `entities` in canonical order.
///
/// Lines go to a sibling temp file which is synced and renamed over `path`;
/// the parent directory is synced after the rename.
pub fn write_entities_to_path(path: impl AsRef<Path>, entities: &[Entity]) -> Result<(), JsonlError> {
    let path = path.as_ref();
    let lines = canonical_lines(entities)?;

    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
    }

    let tmp_path = tmp_write_path(path);
    if let Err(error) = write_lines(&tmp_path, &lines) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    fs::rename(&tmp_path, path).map_err(|source| {
        let _ = fs::remove_file(&tmp_path);
        io_error(path, source)
    })?;

    if let Some(parent) = parent {
        File::open(parent)
            .and_then(|dir| dir.sync_all())
            .map_err(|source| io_error(parent, source))?;
    }

    tracing::debug!(path = %path.display(), records = lines.len(), "saved inventory");
    Ok(())
}

fn write_lines(tmp_path: &Path, lines: &[String]) -> Result<(), JsonlError> {
    let file = File::create(tmp_path).map_err(|source| io_error(tmp_path, source))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{line}").map_err(|source| io_error(tmp_path, source))?;
    }
    let file = writer
        .into_inner()
        .map_err(|e| io_error(tmp_path, e.into_error()))?;
    file.sync_all().map_err(|source| io_error(tmp_path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> JsonlError {
    JsonlError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}
