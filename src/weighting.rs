use crate::constants::{GradeLevel, Track, FRACTION_LABELS};
use crate::error::{PtaError, Result};
use crate::model::Test;

/// Combined school-exam weighting:
/// `(year_4 * ED4 + year_5 * ED5 + year_6 * ED6) / denominator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinedWeight {
    pub denominator: i64,
    pub year_4: i64,
    pub year_5: i64,
    pub year_6: i64,
}

impl CombinedWeight {
    #[cfg(test)]
    pub fn as_tuple(&self) -> (i64, i64, i64, i64) {
        (self.denominator, self.year_4, self.year_5, self.year_6)
    }
}

/// Turns a weighting code into an exact fraction.
///
/// `0` is no weight, `1..=100` a percentage, and anything above 100 picks
/// entry `code - 100` (1-based) from [`FRACTION_LABELS`].
pub fn parse_weight_code(code: i64) -> Result<(i64, i64)> {
    match code {
        0 => Ok((0, 1)),
        1..=100 => Ok((code, 100)),
        c if c > 100 => {
            let idx = usize::try_from(c - 101).map_err(|_| PtaError::InvalidWeightCode(code))?;
            let label = FRACTION_LABELS
                .get(idx)
                .ok_or(PtaError::InvalidWeightCode(code))?;
            let (num, den) = label
                .split_once('/')
                .ok_or(PtaError::InvalidWeightCode(code))?;
            let num = num.parse::<i64>().map_err(|_| PtaError::InvalidWeightCode(code))?;
            let den = den.parse::<i64>().map_err(|_| PtaError::InvalidWeightCode(code))?;
            Ok((num, den))
        }
        _ => Err(PtaError::InvalidWeightCode(code)),
    }
}

/// The grade level one school year earlier within the same track.
///
/// `Ok(None)` for the first level of a track.
pub fn previous_grade_level(grade_level: GradeLevel) -> Result<Option<GradeLevel>> {
    let track = grade_level
        .track()
        .ok_or(PtaError::UnknownTrack(grade_level.label()))?;
    let seq = track.sequence();
    let Some(pos) = seq.iter().position(|g| *g == grade_level) else {
        return Err(PtaError::UnknownTrack(grade_level.label()));
    };
    Ok(pos.checked_sub(1).map(|p| seq[p]))
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Lowest id wins when a subject has several tests for one year and grade level.
fn find_test(tests: &[Test], year: i64, grade_level: GradeLevel) -> Option<&Test> {
    tests
        .iter()
        .filter(|t| t.year == year && t.grade_level == Some(grade_level))
        .min_by_key(|t| t.id)
}

/// Blends this year's result with the one or two previous school years.
///
/// `tests` holds one subject's tests across years. Returns `Ok(None)` when
/// there is nothing to blend.
pub fn compute_combined_weight(
    year: i64,
    grade_level: GradeLevel,
    tests: &[Test],
) -> Result<Option<CombinedWeight>> {
    if grade_level.is_year_4() || grade_level.is_cross_over() {
        return Ok(None);
    }

    let Some(this_year) = find_test(tests, year, grade_level) else {
        return Ok(None);
    };

    let Some(previous) = previous_grade_level(grade_level)? else {
        return Ok(None);
    };
    let one_year_ago = find_test(tests, year - 1, previous);

    let (source_4, source_5) = if grade_level.is_year_6() {
        let two_years_ago = match previous_grade_level(previous)? {
            Some(level) => find_test(tests, year - 2, level),
            None => None,
        };
        (two_years_ago, one_year_ago)
    } else {
        (one_year_ago, Some(this_year))
    };

    let Some(source_4) = source_4 else {
        return Ok(None);
    };

    let (num_4, den_4) = parse_weight_code(source_4.pct.unwrap_or(0))?;
    let (num_5, den_5) = parse_weight_code(source_5.and_then(|t| t.pct).unwrap_or(0))?;

    let mut denominator = den_4 * den_5;
    let mut year_4 = den_5 * num_4;
    let (mut year_5, mut year_6, divisor) = match grade_level.track() {
        Some(Track::Havo) => {
            let year_5 = denominator - year_4;
            (year_5, 0, gcd(year_4, year_5))
        }
        Some(Track::Vwo) => {
            let year_5 = den_4 * num_5;
            let year_6 = denominator - year_4 - year_5;
            (year_5, year_6, gcd(gcd(year_4, year_5), year_6))
        }
        None => return Err(PtaError::UnknownTrack(grade_level.label())),
    };

    if divisor > 1 {
        denominator /= divisor;
        year_4 /= divisor;
        year_5 /= divisor;
        year_6 /= divisor;
    }

    if denominator == 1 {
        return Ok(None);
    }

    Ok(Some(CombinedWeight {
        denominator,
        year_4,
        year_5,
        year_6,
    }))
}

/// Grade levels whose final grade blends in earlier school years.
pub fn blends_prior_years(grade_level: GradeLevel) -> bool {
    matches!(grade_level, GradeLevel::Havo5 | GradeLevel::Vwo6)
}

/// Note printed under the test table, e.g.
/// `berekening SE cijfer: (2x ED4 + 3x ED5) / 5`.
pub fn weighting_note(year: i64, grade_level: GradeLevel, tests: &[Test]) -> Result<Option<String>> {
    if !blends_prior_years(grade_level) {
        return Ok(None);
    }
    let Some(weight) = compute_combined_weight(year, grade_level, tests)? else {
        return Ok(None);
    };
    Ok(Some(format!(
        "berekening SE cijfer: {}",
        format_combined_weight(&weight)
    )))
}

pub fn format_combined_weight(weight: &CombinedWeight) -> String {
    let bits: Vec<String> = [
        (weight.year_4, "ED4"),
        (weight.year_5, "ED5"),
        (weight.year_6, "ED6"),
    ]
    .iter()
    .filter(|(n, _)| *n != 0)
    .map(|(n, label)| format!("{}x {}", n, label))
    .collect();
    format!("({}) / {}", bits.join(" + "), weight.denominator)
}
