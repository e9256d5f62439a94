use crate::calc::{self, ClassSummary};
use crate::error::StoreError;
use crate::marks_file::{self, SkippedLine};
use crate::record::{StudentPatch, StudentRecord};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub create_if_missing: bool,
    pub enforce_unique_codes: bool,
    pub strict_ranges: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            enforce_unique_codes: true,
            strict_ranges: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Asc),
            "desc" | "descending" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Highest,
    Lowest,
}

/// What the last load found besides the records themselves.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub count: usize,
    pub declared_count: Option<usize>,
    pub skipped: Vec<SkippedLine>,
    pub warnings: Vec<String>,
}

/// The in-memory collection bound to one marks file. Every mutation rewrites the
/// file before the new collection becomes visible.
#[derive(Debug)]
pub struct StudentStore {
    path: PathBuf,
    options: StoreOptions,
    records: Vec<StudentRecord>,
}

impl StudentStore {
    pub fn open(path: &Path, options: StoreOptions) -> Result<(Self, LoadReport), StoreError> {
        let mut store = StudentStore {
            path: path.to_path_buf(),
            options,
            records: Vec::new(),
        };
        let report = store.reload()?;
        Ok((store, report))
    }

    /// Re-reads the file. On error the current collection is kept.
    pub fn reload(&mut self) -> Result<LoadReport, StoreError> {
        let parsed = marks_file::read_marks_file(
            &self.path,
            self.options.create_if_missing,
            self.options.enforce_unique_codes,
        )?;
        self.records = parsed.records;
        tracing::info!(
            path = %self.path.display(),
            count = self.records.len(),
            skipped = parsed.skipped.len(),
            "loaded student records"
        );
        Ok(LoadReport {
            count: self.records.len(),
            declared_count: parsed.declared_count,
            skipped: parsed.skipped,
            warnings: parsed.warnings,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, code: &str) -> Result<&StudentRecord, StoreError> {
        let code = code.trim();
        self.records
            .iter()
            .find(|r| r.code == code)
            .ok_or_else(|| StoreError::NotFound(code.to_string()))
    }

    /// Exact code match or case-insensitive name substring, in collection order.
    pub fn search(&self, query: &str) -> Result<Vec<&StudentRecord>, StoreError> {
        let q = query.trim();
        if q.is_empty() {
            return Err(StoreError::input("query", "must not be empty"));
        }
        let q_lower = q.to_lowercase();
        let hits: Vec<&StudentRecord> = self
            .records
            .iter()
            .filter(|r| r.code == q || r.name.to_lowercase().contains(&q_lower))
            .collect();
        if hits.is_empty() {
            return Err(StoreError::NotFound(q.to_string()));
        }
        Ok(hits)
    }

    /// Ties go to the earliest record.
    pub fn extremum(&self, which: Extremum) -> Result<&StudentRecord, StoreError> {
        let mut best: Option<(&StudentRecord, f64)> = None;
        for r in &self.records {
            let p = r.percentage();
            let better = match best {
                None => true,
                Some((_, b)) => match which {
                    Extremum::Highest => p > b,
                    Extremum::Lowest => p < b,
                },
            };
            if better {
                best = Some((r, p));
            }
        }
        best.map(|(r, _)| r).ok_or(StoreError::EmptyCollection)
    }

    pub fn summary(&self) -> ClassSummary {
        calc::class_summary(self.records.iter().map(|r| r.percentage()))
    }

    pub fn text_report(&self) -> String {
        if self.is_empty() {
            return "No student records found.".to_string();
        }
        let mut out = String::new();
        for r in &self.records {
            out.push_str(&r.display_block());
        }
        let summary = self.summary();
        out.push_str(&format!("\nTotal Students: {}", summary.count));
        if let Some(avg) = summary.average_percentage {
            out.push_str(&format!(
                "\nAverage Percentage: {}%\n",
                calc::format_percentage(avg)
            ));
        }
        out
    }

    /// Stable: records with equal percentages keep their relative order either way.
    pub fn sort(&mut self, direction: SortDirection) -> Result<(), StoreError> {
        let mut next = self.records.clone();
        match direction {
            SortDirection::Asc => next.sort_by(|a, b| a.percentage().total_cmp(&b.percentage())),
            SortDirection::Desc => next.sort_by(|a, b| b.percentage().total_cmp(&a.percentage())),
        }
        self.commit(next)?;
        tracing::info!(?direction, "sorted student records");
        Ok(())
    }

    pub fn add(&mut self, record: StudentRecord) -> Result<&StudentRecord, StoreError> {
        let record = StudentRecord {
            code: record.code.trim().to_string(),
            name: record.name.trim().to_string(),
            ..record
        };
        record.validate_new(self.options.strict_ranges)?;
        if self.options.enforce_unique_codes && self.records.iter().any(|r| r.code == record.code) {
            return Err(StoreError::DuplicateCode(record.code));
        }

        let code = record.code.clone();
        let mut next = self.records.clone();
        next.push(record);
        self.commit(next)?;
        tracing::info!(code = %code, count = self.records.len(), "added student");
        let idx = self.records.len() - 1;
        Ok(&self.records[idx])
    }

    /// Removes the first record with `code`.
    pub fn delete(&mut self, code: &str) -> Result<StudentRecord, StoreError> {
        let code = code.trim();
        let idx = self
            .records
            .iter()
            .position(|r| r.code == code)
            .ok_or_else(|| StoreError::NotFound(code.to_string()))?;

        let mut next = self.records.clone();
        let removed = next.remove(idx);
        self.commit(next)?;
        tracing::info!(code = %code, count = self.records.len(), "deleted student");
        Ok(removed)
    }

    pub fn update(&mut self, code: &str, patch: &StudentPatch) -> Result<&StudentRecord, StoreError> {
        let code = code.trim();
        let idx = self
            .records
            .iter()
            .position(|r| r.code == code)
            .ok_or_else(|| StoreError::NotFound(code.to_string()))?;

        let updated = patch.apply(&self.records[idx], self.options.strict_ranges)?;
        let mut next = self.records.clone();
        next[idx] = updated;
        self.commit(next)?;
        tracing::info!(code = %code, "updated student");
        Ok(&self.records[idx])
    }

    fn commit(&mut self, next: Vec<StudentRecord>) -> Result<(), StoreError> {
        marks_file::write_marks_file(&self.path, &next)?;
        self.records = next;
        Ok(())
    }
}
