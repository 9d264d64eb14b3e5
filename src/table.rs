use crate::constants::{GradeLevel, NO_WORK_KIND_ID};
use crate::error::{PtaError, Result};
use crate::model::{Test, TestWeekPeriods, WeightingField};
use crate::text::{clean_text, format_date_nl};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedFootnote {
    pub number: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub content: String,
    /// `inleverdatum: ...` or `datum: ...`
    pub date_note: Option<String>,
    pub footnote: Option<NumberedFootnote>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Description(Description),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

/// Footnote numbers handed out while building one subject's table.
#[derive(Debug, Default)]
pub struct FootnoteCounter {
    last: u32,
}

impl FootnoteCounter {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u32 {
        self.last += 1;
        self.last
    }
}

#[derive(Debug, Clone)]
pub struct TestTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl TestTable {
    pub fn footnotes(&self) -> Vec<&NumberedFootnote> {
        self.rows
            .iter()
            .flatten()
            .filter_map(|c| match c {
                Cell::Description(d) => d.footnote.as_ref(),
                Cell::Text(_) => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub hide_domain: bool,
    pub weighting_r4: bool,
    pub weighting: Option<(&'static str, WeightingField)>,
}

pub fn column_layout(grade_level: GradeLevel) -> ColumnLayout {
    let weighting = match grade_level {
        GradeLevel::GymAth3 => Some(("Weging", WeightingField::R4)),
        GradeLevel::Havo4 | GradeLevel::Vwo4 => Some(("Weging SE", WeightingField::Ed4)),
        GradeLevel::Havo5 | GradeLevel::Vwo5 => Some(("Weging SE", WeightingField::Ed5)),
        GradeLevel::Vwo6 => Some(("Weging SE", WeightingField::Ed6)),
        _ => None,
    };
    ColumnLayout {
        hide_domain: grade_level == GradeLevel::GymAth3,
        weighting_r4: matches!(
            grade_level,
            GradeLevel::Vwo4 | GradeLevel::Vwo5 | GradeLevel::Havo4
        ),
        weighting,
    }
}

/// Weight values of zero print as empty cells.
pub fn weight_text(value: Option<i64>) -> String {
    match value {
        Some(v) if v != 0 => v.to_string(),
        _ => String::new(),
    }
}

/// Period label and week cell; test weeks become `"<period> (tw)"` with
/// the period's configured weeks joined by `/`.
pub fn period_and_week(test: &Test, periods: &TestWeekPeriods) -> (String, String) {
    let period = match test.period {
        Some(p) if p != 0 => p.to_string(),
        _ => String::new(),
    };
    let week = match test.week {
        Some(w) if w != 0 => w,
        _ => return (period, String::new()),
    };

    let Some(matched) = periods.period_of_week(week) else {
        return (period, week.to_string());
    };
    let weeks = test
        .period
        .and_then(|p| periods.weeks_for(p))
        .filter(|weeks| weeks.contains(&week))
        .or_else(|| periods.weeks_for(matched))
        .unwrap_or_default();
    let joined = weeks
        .iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>()
        .join("/");
    (format!("{} (tw)", period).trim_start().to_string(), joined)
}

fn date_note(test: &Test) -> Option<String> {
    if let Some(d) = test.due_date {
        Some(format!("inleverdatum: {}", format_date_nl(d)))
    } else {
        test.date.map(|d| format!("datum: {}", format_date_nl(d)))
    }
}

fn description(test: &Test, counter: &mut FootnoteCounter) -> Description {
    let footnote = test
        .footnote
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|f| NumberedFootnote {
            number: counter.next(),
            text: f.to_string(),
        });
    Description {
        content: clean_text(test.description.as_deref().unwrap_or("")),
        date_note: date_note(test),
        footnote,
    }
}

fn work_kind_label(test: &Test) -> String {
    match &test.work_kind {
        Some(kind) if kind.id != NO_WORK_KIND_ID => kind.name.clone(),
        _ => String::new(),
    }
}

/// Header row plus one row per test, in the given order.
///
/// `counter` must be fresh for every subject.
pub fn build_test_table(
    grade_level: GradeLevel,
    tests: &[Test],
    periods: &TestWeekPeriods,
    counter: &mut FootnoteCounter,
) -> Result<TestTable> {
    let layout = column_layout(grade_level);

    let mut header: Vec<String> = vec!["Code".into(), "Onderwerp/Omschrijving".into()];
    if !layout.hide_domain {
        header.push("Domein".into());
    }
    header.extend(
        ["Periode", "Week", "Soort werk", "Tijd\n(min)"]
            .iter()
            .map(|s| s.to_string()),
    );
    if layout.weighting_r4 {
        header.push("Weging R4".into());
    }
    if let Some((label, _)) = layout.weighting {
        header.push(label.to_string());
    }

    let mut rows = Vec::with_capacity(tests.len());
    for (idx, test) in tests.iter().enumerate() {
        let (period, week) = period_and_week(test, periods);

        let mut row = vec![
            Cell::text(test.code_text()),
            Cell::Description(description(test, counter)),
        ];
        if !layout.hide_domain {
            row.push(Cell::text(test.domain_text()));
        }
        row.push(Cell::text(period));
        row.push(Cell::text(week));
        row.push(Cell::text(work_kind_label(test)));
        row.push(Cell::text(weight_text(test.duration)));
        if layout.weighting_r4 {
            row.push(Cell::text(weight_text(test.weighting_r4)));
        }
        if let Some((_, field)) = layout.weighting {
            row.push(Cell::text(weight_text(test.weighting(field))));
        }

        ensure_row_shape(header.len(), idx + 1, row.len())?;
        rows.push(row);
    }

    Ok(TestTable { header, rows })
}

/// Every row must line up with the header; anything else is a defect.
pub fn ensure_row_shape(header: usize, row: usize, actual: usize) -> Result<()> {
    if header != actual {
        return Err(PtaError::ColumnMismatch {
            header,
            row,
            actual,
        });
    }
    Ok(())
}
