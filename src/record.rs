use crate::calc::{self, Grade};
use crate::error::StoreError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub code: String,
    pub name: String,
    pub c1: i64,
    pub c2: i64,
    pub c3: i64,
    pub exam: i64,
}

/// A record together with its derived fields, as handed to callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub code: String,
    pub name: String,
    pub c1: i64,
    pub c2: i64,
    pub c3: i64,
    pub exam: i64,
    pub coursework_total: i64,
    pub percentage: f64,
    pub grade: Grade,
}

impl StudentRecord {
    pub fn coursework_total(&self) -> i64 {
        calc::coursework_total(self.c1, self.c2, self.c3)
    }

    pub fn percentage(&self) -> f64 {
        calc::percentage(self.coursework_total(), self.exam)
    }

    pub fn grade(&self) -> Grade {
        Grade::from_percentage(self.percentage())
    }

    pub fn view(&self) -> StudentView {
        StudentView {
            code: self.code.clone(),
            name: self.name.clone(),
            c1: self.c1,
            c2: self.c2,
            c3: self.c3,
            exam: self.exam,
            coursework_total: self.coursework_total(),
            percentage: self.percentage(),
            grade: self.grade(),
        }
    }

    /// Checks a new record before it enters the collection.
    pub fn validate_new(&self, strict_ranges: bool) -> Result<(), StoreError> {
        validate_text_field("code", &self.code)?;
        self.validate(strict_ranges)
    }

    /// Checks the editable fields. The code is left alone so records loaded with an
    /// odd code stay editable.
    pub fn validate(&self, strict_ranges: bool) -> Result<(), StoreError> {
        validate_text_field("name", &self.name)?;
        check_mark_bound("c1", self.c1, None)?;
        check_mark_bound("c2", self.c2, None)?;
        check_mark_bound("c3", self.c3, None)?;
        check_mark_bound("exam", self.exam, None)?;
        if strict_ranges {
            check_range("c1", self.c1, calc::MAX_COMPONENT)?;
            check_range("c2", self.c2, calc::MAX_COMPONENT)?;
            check_range("c3", self.c3, calc::MAX_COMPONENT)?;
            check_range("exam", self.exam, calc::MAX_EXAM)?;
        }
        Ok(())
    }

    /// Plain-text block used by the text report.
    pub fn display_block(&self) -> String {
        let p = self.percentage();
        format!(
            "Name: {}\nStudent Number: {}\nTotal Coursework: {}/{}\nExam Mark: {}/{}\nPercentage: {}%\nGrade: {}\n{}\n",
            self.name,
            self.code,
            self.coursework_total(),
            calc::MAX_COURSEWORK_TOTAL,
            self.exam,
            calc::MAX_EXAM,
            calc::format_percentage(p),
            Grade::from_percentage(p),
            "-".repeat(35)
        )
    }
}

/// Fields to replace on an existing record. `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub c1: Option<i64>,
    pub c2: Option<i64>,
    pub c3: Option<i64>,
    pub exam: Option<i64>,
    /// Replaces all three components at once, spread evenly.
    pub coursework_total: Option<i64>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.c1.is_none()
            && self.c2.is_none()
            && self.c3.is_none()
            && self.exam.is_none()
            && self.coursework_total.is_none()
    }

    /// Returns the patched copy of `record`; the original is not touched.
    pub fn apply(&self, record: &StudentRecord, strict_ranges: bool) -> Result<StudentRecord, StoreError> {
        if self.is_empty() {
            return Err(StoreError::input("patch", "no fields to update"));
        }
        let explicit_components = self.c1.is_some() || self.c2.is_some() || self.c3.is_some();
        if explicit_components && self.coursework_total.is_some() {
            return Err(StoreError::input(
                "courseworkTotal",
                "cannot be combined with c1/c2/c3",
            ));
        }

        let mut next = record.clone();
        if let Some(name) = &self.name {
            next.name = name.trim().to_string();
        }
        if let Some(total) = self.coursework_total {
            if strict_ranges {
                check_range("courseworkTotal", total, calc::MAX_COURSEWORK_TOTAL)?;
            }
            let (c1, c2, c3) = calc::spread_coursework_total(total);
            next.c1 = c1;
            next.c2 = c2;
            next.c3 = c3;
        }
        if let Some(v) = self.c1 {
            next.c1 = v;
        }
        if let Some(v) = self.c2 {
            next.c2 = v;
        }
        if let Some(v) = self.c3 {
            next.c3 = v;
        }
        if let Some(v) = self.exam {
            next.exam = v;
        }
        next.validate(strict_ranges)?;
        Ok(next)
    }
}

/// Parses an integer score typed by a user, e.g. `" 17"`.
pub fn parse_score(field: &str, raw: &str) -> Result<i64, StoreError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| StoreError::input(field, format!("expected an integer, got {:?}", raw.trim())))
}

/// Rejects marks outside `-MARK_LIMIT..=MARK_LIMIT`, whatever the range policy.
pub fn check_mark_bound(field: &str, value: i64, line_no: Option<usize>) -> Result<(), StoreError> {
    if !(-calc::MARK_LIMIT..=calc::MARK_LIMIT).contains(&value) {
        return Err(StoreError::Input {
            field: field.to_string(),
            message: format!("{value} is too large for a mark"),
            line_no,
        });
    }
    Ok(())
}

fn validate_text_field(field: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::input(field, "must not be empty"));
    }
    // The marks file has no escaping.
    if value.contains(',') || value.contains('\n') || value.contains('\r') {
        return Err(StoreError::input(
            field,
            "must not contain commas or line breaks",
        ));
    }
    Ok(())
}

fn check_range(field: &str, value: i64, max: i64) -> Result<(), StoreError> {
    if !(0..=max).contains(&value) {
        return Err(StoreError::input(
            field,
            format!("{value} is outside 0..={max}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(code: &str, c: [i64; 3], exam: i64) -> StudentRecord {
        StudentRecord {
            code: code.to_string(),
            name: format!("Student {code}"),
            c1: c[0],
            c2: c[1],
            c3: c[2],
            exam,
        }
    }

    #[test]
    fn view_derives_fields() {
        let v = rec("1001", [15, 12, 18], 67).view();
        assert_eq!(v.coursework_total, 45);
        assert_eq!(v.percentage, 70.0);
        assert_eq!(v.grade, Grade::A);
    }

    #[test]
    fn validate_rejects_commas_and_ranges() {
        let mut r = rec("1001", [10, 10, 10], 50);
        r.name = "Smith, John".to_string();
        assert!(matches!(r.validate(true), Err(StoreError::Input { .. })));

        let r = rec("1001", [21, 10, 10], 50);
        assert!(r.validate(true).is_err());
        assert!(r.validate(false).is_ok());

        let r = rec("  ", [1, 1, 1], 1);
        assert!(r.validate_new(false).is_err());
        assert!(r.validate(false).is_ok());

        let r = rec("1001", [i64::MAX, 1, 0], 0);
        assert_eq!(r.validate(false).expect_err("too large").code(), "bad_input");
        let r = rec("1001", [0, 0, 0], i64::MIN);
        assert!(r.validate(false).is_err());
    }

    #[test]
    fn patch_spreads_coursework_total() {
        let r = rec("1001", [1, 2, 3], 40);
        let patch = StudentPatch {
            coursework_total: Some(50),
            exam: Some(80),
            ..Default::default()
        };
        let next = patch.apply(&r, true).expect("apply");
        assert_eq!((next.c1, next.c2, next.c3), (17, 17, 16));
        assert_eq!(next.exam, 80);
        assert_eq!(r.exam, 40);
    }

    #[test]
    fn patch_rejects_empty_and_conflicting() {
        let r = rec("1001", [1, 2, 3], 40);
        assert!(StudentPatch::default().apply(&r, true).is_err());
        let patch = StudentPatch {
            c1: Some(5),
            coursework_total: Some(30),
            ..Default::default()
        };
        assert!(patch.apply(&r, true).is_err());
    }

    #[test]
    fn parse_score_reports_field() {
        assert_eq!(parse_score("c1", " 17 ").expect("parse"), 17);
        let e = parse_score("exam", "seventy").expect_err("not a number");
        assert_eq!(e.code(), "bad_input");
        assert!(e.to_string().contains("exam"));
    }
}
