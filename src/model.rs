use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::constants::{AccessMode, CrossOverAction, ExportMode, GradeLevel, Sector, SortMode};

#[derive(Debug, Clone)]
pub struct Calendar {
    /// Two week numbers for each of the four test-week periods.
    pub test_weeks: [[Option<i64>; 2]; 4],
}

impl Calendar {
    pub fn test_week_periods(&self) -> TestWeekPeriods {
        let mut periods = BTreeMap::new();
        for (idx, weeks) in self.test_weeks.iter().enumerate() {
            let weeks: Vec<i64> = weeks.iter().flatten().copied().collect();
            if !weeks.is_empty() {
                periods.insert(idx as i64 + 1, weeks);
            }
        }
        TestWeekPeriods::new(periods)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestWeekPeriods {
    periods: BTreeMap<i64, Vec<i64>>,
}

impl TestWeekPeriods {
    pub fn new(periods: BTreeMap<i64, Vec<i64>>) -> Self {
        Self { periods }
    }

    pub fn weeks_for(&self, period: i64) -> Option<&[i64]> {
        self.periods.get(&period).map(|v| v.as_slice())
    }

    /// First period (by number) whose test weeks include `week`.
    pub fn period_of_week(&self, week: i64) -> Option<i64> {
        self.periods
            .iter()
            .find(|(_, weeks)| weeks.contains(&week))
            .map(|(period, _)| *period)
    }
}

#[derive(Debug, Clone)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub abbreviation: Option<String>,
    pub display: Option<i64>,
    pub sort_mode: SortMode,
    pub export_mode: ExportMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkKind {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightingField {
    Ed3,
    Ed4,
    Ed5,
    Ed6,
    R4,
}

#[derive(Debug, Clone, Default)]
pub struct Test {
    pub id: i64,
    pub year: i64,
    pub grade_level: Option<GradeLevel>,
    pub type_code: Option<i64>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub domain: Option<String>,
    pub week: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub date: Option<NaiveDate>,
    pub period: Option<i64>,
    pub work_kind: Option<WorkKind>,
    pub duration: Option<i64>,
    pub weighting_ed3: Option<i64>,
    pub weighting_ed4: Option<i64>,
    pub weighting_ed5: Option<i64>,
    pub weighting_ed6: Option<i64>,
    pub weighting_r4: Option<i64>,
    pub pct: Option<i64>,
    pub resit: Option<i64>,
    pub footnote: Option<String>,
}

impl Test {
    pub fn weighting(&self, field: WeightingField) -> Option<i64> {
        match field {
            WeightingField::Ed3 => self.weighting_ed3,
            WeightingField::Ed4 => self.weighting_ed4,
            WeightingField::Ed5 => self.weighting_ed5,
            WeightingField::Ed6 => self.weighting_ed6,
            WeightingField::R4 => self.weighting_r4,
        }
    }

    pub fn code_text(&self) -> &str {
        self.code.as_deref().unwrap_or("")
    }

    pub fn domain_text(&self) -> &str {
        self.domain.as_deref().unwrap_or("")
    }

    /// `"2019-2020"` for a test of 2019.
    pub fn school_year(&self) -> String {
        format!("{}-{}", self.year, self.year + 1)
    }
}

#[derive(Debug, Clone)]
pub struct CrossOver {
    pub weighting: Option<i64>,
    pub action: Option<CrossOverAction>,
    pub old_test_id: Option<i64>,
    pub old_test: Option<Test>,
    pub linked_test: Option<Test>,
}

#[derive(Debug, Clone)]
pub struct Footnote {
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct User {
    pub access: AccessMode,
    pub sector: Option<Sector>,
}
