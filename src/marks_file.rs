use crate::error::StoreError;
use crate::record::{check_mark_bound, StudentRecord};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

pub const DEFAULT_FILE_NAME: &str = "studentMarks.txt";
const FIELD_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedLine {
    pub line_no: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedMarksFile {
    pub declared_count: Option<usize>,
    pub records: Vec<StudentRecord>,
    pub skipped: Vec<SkippedLine>,
    pub warnings: Vec<String>,
}

/// Reads `path`. A missing file is an empty collection; with `create_if_missing`
/// a file stamped with count 0 is written in its place.
pub fn read_marks_file(
    path: &Path,
    create_if_missing: bool,
    enforce_unique_codes: bool,
) -> Result<ParsedMarksFile, StoreError> {
    if !path.exists() {
        if create_if_missing {
            write_marks_file(path, &[])?;
            tracing::info!(path = %path.display(), "created empty marks file");
        }
        return Ok(ParsedMarksFile::default());
    }

    let bytes = std::fs::read(path).map_err(|e| StoreError::io(path, e))?;
    let text = String::from_utf8_lossy(&bytes);
    let parsed = parse_marks_text(&text, enforce_unique_codes)?;

    for w in &parsed.warnings {
        tracing::warn!(path = %path.display(), "{w}");
    }
    for s in &parsed.skipped {
        tracing::warn!(path = %path.display(), line = s.line_no, reason = %s.reason, "skipped line");
    }
    Ok(parsed)
}

pub fn parse_marks_text(
    text: &str,
    enforce_unique_codes: bool,
) -> Result<ParsedMarksFile, StoreError> {
    let mut out = ParsedMarksFile::default();
    let mut seen: HashSet<String> = HashSet::new();

    // (1-based line number, trimmed content); blank lines carry no data.
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let Some((count_line_no, count_line)) = lines.next() else {
        return Ok(out);
    };
    match count_line.parse::<usize>() {
        Ok(n) => out.declared_count = Some(n),
        Err(_) => {
            let e = StoreError::Format {
                line_no: Some(count_line_no),
                message: format!("record count {count_line:?} is not an integer"),
            };
            out.warnings.push(e.to_string());
            return Ok(out);
        }
    }

    for (line_no, line) in lines {
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() != FIELD_COUNT {
            out.skipped.push(SkippedLine {
                line_no,
                reason: format!("expected {FIELD_COUNT} fields, found {}", parts.len()),
            });
            continue;
        }
        let record = parse_record_fields(&parts, line_no)?;
        if enforce_unique_codes && !seen.insert(record.code.clone()) {
            out.skipped.push(SkippedLine {
                line_no,
                reason: format!("duplicate code {}", record.code),
            });
            continue;
        }
        out.records.push(record);
    }

    if let Some(n) = out.declared_count {
        if n != out.records.len() {
            out.warnings.push(format!(
                "declared record count {n} does not match {} loaded records",
                out.records.len()
            ));
        }
    }

    Ok(out)
}

fn parse_record_fields(parts: &[&str], line_no: usize) -> Result<StudentRecord, StoreError> {
    let int_at = |idx: usize, field: &str| -> Result<i64, StoreError> {
        let raw = parts[idx].trim();
        let value = raw.parse::<i64>().map_err(|_| StoreError::Input {
            field: field.to_string(),
            message: format!("expected an integer, got {raw:?}"),
            line_no: Some(line_no),
        })?;
        check_mark_bound(field, value, Some(line_no))?;
        Ok(value)
    };

    Ok(StudentRecord {
        code: parts[0].trim().to_string(),
        name: parts[1].trim().to_string(),
        c1: int_at(2, "c1")?,
        c2: int_at(3, "c2")?,
        c3: int_at(4, "c3")?,
        exam: int_at(5, "exam")?,
    })
}

pub fn render_marks_file(records: &[StudentRecord]) -> String {
    let mut out = format!("{}\n", records.len());
    for r in records {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            r.code, r.name, r.c1, r.c2, r.c3, r.exam
        ));
    }
    out
}

/// Full rewrite in place; every mutation ends here.
pub fn write_marks_file(path: &Path, records: &[StudentRecord]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
    }
    std::fs::write(path, render_marks_file(records)).map_err(|e| StoreError::io(path, e))
}
