use serde::Serialize;

/// Coursework components (3 x 20) plus the exam (100).
pub const MAX_TOTAL: i64 = 160;
pub const MAX_COMPONENT: i64 = 20;
pub const MAX_COURSEWORK_TOTAL: i64 = 60;
pub const MAX_EXAM: i64 = 100;
/// Any stored or supplied mark must fit in an `i32`, so the sums below cannot overflow.
pub const MARK_LIMIT: i64 = i32::MAX as i64;

/// Rounds to 2 decimals with exact ties going to the even digit (29.375 -> 29.38,
/// 65.625 -> 65.62), the precision percentages are stored at.
pub fn round_off_2_decimals(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

/// Report formatting: whole values keep one decimal (`70.0`), others print as stored.
pub fn format_percentage(p: f64) -> String {
    if p.fract() == 0.0 {
        format!("{p:.1}")
    } else {
        p.to_string()
    }
}

pub fn coursework_total(c1: i64, c2: i64, c3: i64) -> i64 {
    c1 + c2 + c3
}

pub fn percentage(coursework_total: i64, exam: i64) -> f64 {
    // Scale before dividing so exact boundaries (112/160 = 70%) stay exact.
    round_off_2_decimals((coursework_total + exam) as f64 * 100.0 / MAX_TOTAL as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Thresholds are inclusive: exactly 70.0 is an A.
    pub fn from_percentage(p: f64) -> Self {
        if p >= 70.0 {
            Grade::A
        } else if p >= 60.0 {
            Grade::B
        } else if p >= 50.0 {
            Grade::C
        } else if p >= 40.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.letter())
    }
}

/// Splits a coursework total over three components, earlier components taking the
/// remainder, so the components always sum back to `total`.
pub fn spread_coursework_total(total: i64) -> (i64, i64, i64) {
    let base = total.div_euclid(3);
    let rem = total.rem_euclid(3);
    let c1 = base + if rem > 0 { 1 } else { 0 };
    let c2 = base + if rem > 1 { 1 } else { 0 };
    (c1, c2, base)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeCounts {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub d: usize,
    pub f: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub count: usize,
    pub average_percentage: Option<f64>,
    pub highest_percentage: Option<f64>,
    pub lowest_percentage: Option<f64>,
    pub grades: GradeCounts,
}

pub fn class_summary<I>(percentages: I) -> ClassSummary
where
    I: IntoIterator<Item = f64>,
{
    let mut count: usize = 0;
    let mut sum: f64 = 0.0;
    let mut highest: Option<f64> = None;
    let mut lowest: Option<f64> = None;
    let mut grades = GradeCounts {
        a: 0,
        b: 0,
        c: 0,
        d: 0,
        f: 0,
    };

    for p in percentages {
        count += 1;
        sum += p;
        highest = Some(highest.map_or(p, |h| h.max(p)));
        lowest = Some(lowest.map_or(p, |l| l.min(p)));
        match Grade::from_percentage(p) {
            Grade::A => grades.a += 1,
            Grade::B => grades.b += 1,
            Grade::C => grades.c += 1,
            Grade::D => grades.d += 1,
            Grade::F => grades.f += 1,
        }
    }

    let average_percentage = if count > 0 {
        Some(round_off_2_decimals(sum / count as f64))
    } else {
        None
    };

    ClassSummary {
        count,
        average_percentage,
        highest_percentage: highest,
        lowest_percentage: lowest,
        grades,
    }
}
