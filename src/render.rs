use std::collections::HashMap;
use tracing::debug;

use crate::constants::{CrossOverAction, ExportMode, GradeLevel};
use crate::docx::{cm, mm, Align, Document, Paragraph, Run, Table, TableCell, Twips, HEADER_BG_COLOR};
use crate::error::Result;
use crate::model::{CrossOver, Footnote, Subject, Test, TestWeekPeriods, WeightingField};
use crate::table::{
    build_test_table, ensure_row_shape, period_and_week, Cell, Description, FootnoteCounter,
};
use crate::text::{capfirst, clean_text, normalize_newlines, unescape_html};
use crate::weighting::weighting_note;

const DEFAULT_WIDTHS: [f64; 7] = [1.51, 10.43, 3.25, 1.75, 1.5, 2.25, 1.5];
const GYM_ATH_3_WIDTHS: [f64; 7] = [1.51, 10.43, 1.75, 1.5, 2.75, 1.5, 2.0];
const VOCATIONAL_WIDTHS: [f64; 8] = [1.51, 10.43, 2.00, 1.50, 2.00, 3.00, 1.50, 2.50];
const CARRY_OVER_WIDTHS: [f64; 6] = [2.00, 2.50, 10.43, 3.25, 3.00, 2.00];
const CATCH_UP_WIDTHS: [f64; 5] = [2.00, 2.50, 10.43, 3.25, 2.00];
const CROSS_OVER_6_WIDTHS: [f64; 5] = [2.00, 2.50, 10.43, 3.25, 3.00];

const MIN_ROW_HEIGHT_CM: f64 = 0.7;

const CROSS_OVER_5_COMPLETED: &str = "De leerling heeft dit vak in een eerder stadium al afgerond op Vwo \
     niveau. De eindbeoordeling van dit vak wordt meegenomen.";
const CROSS_OVER_5_CARRY_OVER_INTRO: &str = "De volgende al gemaakte onderdelen worden meegenomen uit \
     eerdere leerjaren.\nDaarbij wordt het cijfer overgenomen, of de toets wordt opnieuw gewaardeerd.";
const CROSS_OVER_5_CATCH_UP_INTRO: &str = "De volgende toetsen uit havo 4 moeten worden ingehaald.";
const CROSS_OVER_5_MAKE_UP_INTRO: &str = "Tevens moet de volgende inhaalopdracht worden gemaakt om aan \
     het schoolexamen Havo te voldoen:";
const CROSS_OVER_6_COMPLETED: &str = "De leerling heeft dit vak in een eerder stadium afgesloten op Vwo niveau";
const CROSS_OVER_6_FINISH_VWO: &str = "De leerling rond dit vak af op Vwo niveau. Eventuele openstaande \
     opdrachten in het Vwo 6 PTA moeten worden afgerond.";
const CROSS_OVER_6_INTRO: &str = "De volgende al gemaakte onderdelen worden meegenomen uit eerdere \
     leerjaren.\nDaarbij wordt het cijfer overgenomen, of de toets wordt opnieuw gewaardeerd.\n\
     Toetsen van periode 3 worden meegemaakt met de Havo 5 klas.";

/// How a grade level's subjects end up in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Regular,
    Vocational,
    CrossOver5,
    CrossOver6,
}

impl Strategy {
    pub fn for_grade_level(grade_level: GradeLevel) -> Self {
        match grade_level {
            GradeLevel::CrossOverVwo5 => Strategy::CrossOver5,
            GradeLevel::CrossOverVwo6 => Strategy::CrossOver6,
            GradeLevel::Tl3 | GradeLevel::Tl4 => Strategy::Vocational,
            _ => Strategy::Regular,
        }
    }
}

/// Everything one export shares across its subjects.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub year: i64,
    pub grade_level: GradeLevel,
    pub periods: &'a TestWeekPeriods,
}

/// Records of a single subject, already filtered and ordered.
#[derive(Debug, Clone, Copy)]
pub struct SubjectData<'a> {
    pub subject: &'a Subject,
    /// Tests at the exported year and grade level.
    pub tests: &'a [Test],
    /// Tests of the last three years, input for the weighting note.
    pub history: &'a [Test],
    pub footnotes: &'a [Footnote],
    pub cross_overs: &'a [CrossOver],
    /// Havo-5 tests of the exported year.
    pub havo5_tests: &'a [Test],
}

/// Appends the subject to `doc` and returns the number of pages it produced.
pub fn render_subject(doc: &mut Document, ctx: &RenderContext, data: &SubjectData) -> Result<usize> {
    let strategy = Strategy::for_grade_level(ctx.grade_level);
    debug!(subject = %data.subject.name, ?strategy, "rendering subject");
    match strategy {
        Strategy::Regular => render_regular(doc, ctx, data),
        Strategy::Vocational => render_vocational(doc, ctx, data),
        Strategy::CrossOver5 => render_cross_over_5(doc, ctx, data),
        Strategy::CrossOver6 => render_cross_over_6(doc, ctx, data),
    }
}

pub fn header_paragraph(subject: &Subject, year: i64, grade_level: GradeLevel) -> Paragraph {
    let mut name = capfirst(&unescape_html(&subject.name));
    if let Some(abbr) = subject.abbreviation.as_deref().filter(|a| !a.is_empty()) {
        if subject.display == Some(1) {
            name = format!("{} ({})", name, abbr);
        }
    }
    let prefix = if grade_level == GradeLevel::GymAth3 {
        "PTB"
    } else {
        "PTA"
    };
    Paragraph::new()
        .tab_stop(cm(3.0), Align::Left)
        .tab_stop(cm(22.71), Align::Right)
        .tab_stop(cm(23.06), Align::Left)
        .run(
            Run::new(format!(
                "{}\t{}\t{}\t{}-{}",
                prefix,
                name,
                grade_level.label(),
                year,
                year + 1
            ))
            .bold()
            .size(14),
        )
}

/// Fixed widths first, remaining columns split what is left of the page.
fn column_widths(fixed: &[f64], columns: usize, page_width: Twips) -> Vec<Twips> {
    let fixed: Vec<Twips> = fixed.iter().map(|w| cm(*w)).collect();
    let extra_columns = columns.saturating_sub(fixed.len());
    let extra = if extra_columns > 0 {
        let used: Twips = fixed.iter().sum::<Twips>() + mm(1.0);
        page_width.saturating_sub(used) / extra_columns as Twips
    } else {
        0
    };
    (0..columns)
        .map(|idx| fixed.get(idx).copied().unwrap_or(extra))
        .collect()
}

fn styled_table(
    header: &[String],
    body: Vec<Vec<Vec<Paragraph>>>,
    widths: Vec<Twips>,
    no_center: usize,
) -> Table {
    let mut rows = Vec::with_capacity(body.len() + 1);
    rows.push(
        header
            .iter()
            .enumerate()
            .map(|(idx, title)| {
                let mut p = Paragraph::new().run(Run::new(title.as_str()).bold());
                if idx != no_center {
                    p = p.align(Align::Center);
                }
                TableCell::new(vec![p]).shaded(HEADER_BG_COLOR)
            })
            .collect(),
    );
    for row in body {
        rows.push(
            row.into_iter()
                .enumerate()
                .map(|(idx, mut paragraphs)| {
                    if let Some(first) = paragraphs.first_mut() {
                        if idx == 0 {
                            first.runs.iter_mut().for_each(|r| r.bold = true);
                        }
                    }
                    if idx != no_center {
                        paragraphs.iter_mut().for_each(|p| p.align = Some(Align::Center));
                    }
                    TableCell::new(paragraphs)
                })
                .collect(),
        );
    }
    Table {
        widths,
        rows,
        min_row_height: cm(MIN_ROW_HEIGHT_CM),
    }
}

fn text_cell(text: impl Into<String>) -> Vec<Paragraph> {
    vec![Paragraph::with_text(text)]
}

fn description_cell(d: &Description) -> Vec<Paragraph> {
    let mut first = Paragraph::with_text(d.content.as_str());
    if let Some(note) = &d.footnote {
        first = first
            .run(Run::new(" "))
            .run(Run::new(format!("{})", note.number)).superscript());
    }
    let mut paragraphs = vec![first];
    if let Some(date) = &d.date_note {
        paragraphs.push(Paragraph::new().run(Run::new(date.as_str()).italic().size(8)));
    }
    paragraphs
}

fn render_cell(cell: &Cell) -> Vec<Paragraph> {
    match cell {
        Cell::Text(text) => text_cell(text.as_str()),
        Cell::Description(d) => description_cell(d),
    }
}

/// Plain string rows under a header, checked against the header width.
fn checked_rows(header: &[String], rows: Vec<Vec<String>>) -> Result<Vec<Vec<Vec<Paragraph>>>> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| {
            ensure_row_shape(header.len(), idx + 1, row.len())?;
            Ok(row.into_iter().map(text_cell).collect())
        })
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn render_regular(doc: &mut Document, ctx: &RenderContext, data: &SubjectData) -> Result<usize> {
    if data.tests.is_empty() {
        debug!(subject = %data.subject.name, "no tests, skipped");
        return Ok(0);
    }

    doc.add_paragraph(header_paragraph(data.subject, ctx.year, ctx.grade_level));
    doc.add_paragraph(Paragraph::new().align(Align::Right));

    let mut counter = FootnoteCounter::new();
    let table = build_test_table(ctx.grade_level, data.tests, ctx.periods, &mut counter)?;

    let fixed: &[f64] = if ctx.grade_level == GradeLevel::GymAth3 {
        &GYM_ATH_3_WIDTHS
    } else {
        &DEFAULT_WIDTHS
    };
    let widths = column_widths(fixed, table.header.len(), doc.page.text_width());
    let body = table
        .rows
        .iter()
        .map(|row| row.iter().map(render_cell).collect())
        .collect();
    doc.add_table(styled_table(&table.header, body, widths, 1));

    if let Some(note) = weighting_note(ctx.year, ctx.grade_level, data.history)? {
        doc.add_paragraph(Paragraph::with_text(note).space_before(10));
    }

    let test_notes = table.footnotes();
    if !test_notes.is_empty() || !data.footnotes.is_empty() {
        doc.add_paragraph(
            Paragraph::new()
                .run(Run::new("opmerking").bold())
                .space_before(10),
        );
    }
    if !test_notes.is_empty() {
        let mut p = Paragraph::new().space_after(0);
        for note in test_notes {
            p = p
                .run(Run::new(format!("{})", note.number)).superscript())
                .run(Run::new(format!(" {}\n", normalize_newlines(&note.text))));
        }
        doc.add_paragraph(p);
    }
    if !data.footnotes.is_empty() {
        let mut p = Paragraph::new().space_after(0);
        for note in data.footnotes {
            p = p.run(Run::new(format!("{}\n", normalize_newlines(&note.text))));
        }
        doc.add_paragraph(p);
    }

    doc.add_page_break();
    Ok(1)
}

fn resit_label(resit: Option<i64>) -> &'static str {
    match resit {
        Some(0) => "nee",
        Some(1) => "ja",
        _ => "",
    }
}

fn vocational_kind(type_code: Option<i64>) -> &'static str {
    match type_code {
        Some(3) => "schriftelijk",
        Some(4) => "praktisch",
        Some(5) => "handelingsdeel",
        _ => "",
    }
}

fn render_vocational(doc: &mut Document, ctx: &RenderContext, data: &SubjectData) -> Result<usize> {
    if data.tests.is_empty() {
        debug!(subject = %data.subject.name, "no tests, skipped");
        return Ok(0);
    }

    doc.add_paragraph(header_paragraph(data.subject, ctx.year, ctx.grade_level));

    let header = strings(&[
        "Code",
        "Onderwerp/Omschrijving",
        "Eind-\ntermen",
        "Periode",
        "Herkansbaar",
        "Soort werk",
        "Tijd\n(min)",
        "Weging SE",
    ]);
    let weighting_field = match ctx.grade_level {
        GradeLevel::Tl3 => Some(WeightingField::Ed3),
        GradeLevel::Tl4 => Some(WeightingField::Ed4),
        _ => None,
    };
    let rows = data
        .tests
        .iter()
        .map(|t| {
            let weighting = weighting_field.and_then(|f| t.weighting(f));
            vec![
                t.code_text().to_string(),
                clean_text(t.description.as_deref().unwrap_or("")),
                t.domain_text().to_string(),
                period_and_week(t, ctx.periods).0,
                resit_label(t.resit).to_string(),
                vocational_kind(t.type_code).to_string(),
                t.duration.map(|d| d.to_string()).unwrap_or_default(),
                weighting.map(|w| w.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    let body = checked_rows(&header, rows)?;
    let widths = column_widths(&VOCATIONAL_WIDTHS, header.len(), doc.page.text_width());
    doc.add_table(styled_table(&header, body, widths, 1));

    doc.add_page_break();
    Ok(1)
}

/// Code, school year, description and domain of a cross-over's old test.
fn old_test_columns(old: Option<&Test>) -> Vec<String> {
    match old {
        Some(t) => vec![
            t.code_text().to_string(),
            t.school_year(),
            clean_text(t.description.as_deref().unwrap_or("")),
            t.domain_text().to_string(),
        ],
        None => strings(&["-", "-", "(toets ontbreekt)", "-"]),
    }
}

fn number_text(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn remark_page(doc: &mut Document, ctx: &RenderContext, subject: &Subject, text: &str) -> usize {
    doc.add_paragraph(header_paragraph(subject, ctx.year, ctx.grade_level));
    doc.add_paragraph(Paragraph::with_text(text));
    doc.add_page_break();
    1
}

fn render_cross_over_5(doc: &mut Document, ctx: &RenderContext, data: &SubjectData) -> Result<usize> {
    match data.subject.export_mode {
        ExportMode::Table => {}
        ExportMode::RemarkCompletedEarlier => {
            return Ok(remark_page(doc, ctx, data.subject, CROSS_OVER_5_COMPLETED));
        }
        ExportMode::NoExport => {
            debug!(subject = %data.subject.name, "not exported");
            return Ok(0);
        }
        ExportMode::RemarkVwo | ExportMode::Unrecognised => {}
    }

    let carried: Vec<&CrossOver> = data
        .cross_overs
        .iter()
        .filter(|c| {
            matches!(
                c.action,
                Some(CrossOverAction::CarryOver | CrossOverAction::Revalue)
            )
        })
        .collect();
    let catch_up: Vec<&CrossOver> = data
        .cross_overs
        .iter()
        .filter(|c| c.action == Some(CrossOverAction::CatchUp))
        .collect();
    let make_up = data.tests;

    let empty = carried.is_empty() && catch_up.is_empty() && make_up.is_empty();
    if empty && data.subject.export_mode == ExportMode::Table {
        debug!(subject = %data.subject.name, "no cross-over records, skipped");
        return Ok(0);
    }

    doc.add_paragraph(header_paragraph(data.subject, ctx.year, ctx.grade_level));
    let page_width = doc.page.text_width();

    if !carried.is_empty() {
        doc.add_paragraph(Paragraph::with_text(CROSS_OVER_5_CARRY_OVER_INTRO));
        let header = strings(&[
            "Code V4/V5",
            "Jaar",
            "Omschrijving",
            "Domein",
            "Overnemen/Herwaarderen",
            "Weging SE",
        ]);
        let rows = carried
            .iter()
            .map(|c| {
                let mut row = old_test_columns(c.old_test.as_ref());
                row.push(c.action.map(|a| a.label()).unwrap_or("").to_string());
                row.push(number_text(c.weighting));
                row
            })
            .collect();
        let body = checked_rows(&header, rows)?;
        let widths = column_widths(&CARRY_OVER_WIDTHS, header.len(), page_width);
        doc.add_table(styled_table(&header, body, widths, 2));
    }

    let sub_header = strings(&["Code H4", "Jaar", "Omschrijving", "Domein", "Weging SE"]);

    if !catch_up.is_empty() {
        let mut intro = Paragraph::with_text(CROSS_OVER_5_CATCH_UP_INTRO);
        if !carried.is_empty() {
            intro = intro.space_before(10);
        }
        doc.add_paragraph(intro);
        let rows = catch_up
            .iter()
            .map(|c| {
                let mut row = old_test_columns(c.old_test.as_ref());
                row.push(number_text(c.weighting));
                row
            })
            .collect();
        let body = checked_rows(&sub_header, rows)?;
        let widths = column_widths(&CATCH_UP_WIDTHS, sub_header.len(), page_width);
        doc.add_table(styled_table(&sub_header, body, widths, 2));
    }

    if !make_up.is_empty() {
        let mut intro = Paragraph::with_text(CROSS_OVER_5_MAKE_UP_INTRO);
        if !carried.is_empty() || !catch_up.is_empty() {
            intro = intro.space_before(10);
        }
        doc.add_paragraph(intro);
        let rows = make_up
            .iter()
            .map(|t| {
                let mut row = old_test_columns(Some(t));
                row.push(number_text(t.weighting_ed4));
                row
            })
            .collect();
        let body = checked_rows(&sub_header, rows)?;
        let widths = column_widths(&CATCH_UP_WIDTHS, sub_header.len(), page_width);
        doc.add_table(styled_table(&sub_header, body, widths, 2));
    }

    doc.add_page_break();
    Ok(1)
}

fn render_cross_over_6(doc: &mut Document, ctx: &RenderContext, data: &SubjectData) -> Result<usize> {
    match data.subject.export_mode {
        ExportMode::Table => {}
        ExportMode::RemarkCompletedEarlier => {
            return Ok(remark_page(doc, ctx, data.subject, CROSS_OVER_6_COMPLETED));
        }
        ExportMode::RemarkVwo => {
            return Ok(remark_page(doc, ctx, data.subject, CROSS_OVER_6_FINISH_VWO));
        }
        ExportMode::NoExport => {
            debug!(subject = %data.subject.name, "not exported");
            return Ok(0);
        }
        ExportMode::Unrecognised => {}
    }

    if data.havo5_tests.is_empty() {
        debug!(subject = %data.subject.name, "no havo 5 tests, skipped");
        return Ok(0);
    }

    // Later records replace earlier ones for the same old test.
    let by_old_test: HashMap<i64, &CrossOver> = data
        .cross_overs
        .iter()
        .filter_map(|c| c.old_test_id.map(|id| (id, c)))
        .collect();

    doc.add_paragraph(header_paragraph(data.subject, ctx.year, ctx.grade_level));
    doc.add_paragraph(Paragraph::with_text(CROSS_OVER_6_INTRO));

    let header = strings(&["Code H5", "Oude toets", "Omschrijving", "Domein", "Actie"]);
    let rows = data
        .havo5_tests
        .iter()
        .map(|t| {
            let cross_over = by_old_test.get(&t.id);
            let predecessor = cross_over
                .and_then(|c| c.linked_test.as_ref())
                .and_then(|linked| {
                    let prefix = linked.grade_level.and_then(|g| g.vwo_prefix())?;
                    Some(format!("{} {}", prefix, linked.code_text()))
                })
                .unwrap_or_default();
            let action = cross_over
                .and_then(|c| c.action)
                .map(|a| a.label())
                .unwrap_or("");
            vec![
                t.code_text().to_string(),
                predecessor,
                clean_text(t.description.as_deref().unwrap_or("")),
                t.domain_text().to_string(),
                action.to_string(),
            ]
        })
        .collect();
    let body = checked_rows(&header, rows)?;
    let widths = column_widths(&CROSS_OVER_6_WIDTHS, header.len(), doc.page.text_width());
    doc.add_table(styled_table(&header, body, widths, 2));

    doc.add_page_break();
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SortMode;
    use crate::docx::Block;
    use std::collections::BTreeMap;

    fn subject(export_mode: ExportMode) -> Subject {
        Subject {
            id: 1,
            name: "scheikunde".into(),
            abbreviation: Some("SK".into()),
            display: Some(1),
            sort_mode: SortMode::Chronological,
            export_mode,
        }
    }

    fn test(id: i64, year: i64, grade_level: GradeLevel) -> Test {
        Test {
            id,
            year,
            grade_level: Some(grade_level),
            code: Some(format!("SK{id}")),
            description: Some(format!("Toets {id}")),
            domain: Some("B".into()),
            period: Some(1),
            duration: Some(100),
            ..Test::default()
        }
    }

    fn periods() -> TestWeekPeriods {
        let mut map = BTreeMap::new();
        map.insert(1, vec![44, 45]);
        TestWeekPeriods::new(map)
    }

    fn data<'a>(subject: &'a Subject, tests: &'a [Test]) -> SubjectData<'a> {
        SubjectData {
            subject,
            tests,
            history: tests,
            footnotes: &[],
            cross_overs: &[],
            havo5_tests: &[],
        }
    }

    fn all_text(doc: &Document) -> String {
        let mut out = String::new();
        for block in &doc.blocks {
            match block {
                Block::Paragraph(p) => out.push_str(&p.text()),
                Block::Table(t) => {
                    for cell in t.rows.iter().flatten() {
                        for p in &cell.paragraphs {
                            out.push_str(&p.text());
                            out.push('|');
                        }
                    }
                }
            }
            out.push('\n');
        }
        out
    }

    fn tables(doc: &Document) -> Vec<&Table> {
        doc.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Table(t) => Some(t),
                Block::Paragraph(_) => None,
            })
            .collect()
    }

    #[test]
    fn strategy_per_grade_level() {
        assert_eq!(Strategy::for_grade_level(GradeLevel::CrossOverVwo5), Strategy::CrossOver5);
        assert_eq!(Strategy::for_grade_level(GradeLevel::CrossOverVwo6), Strategy::CrossOver6);
        assert_eq!(Strategy::for_grade_level(GradeLevel::Tl4), Strategy::Vocational);
        assert_eq!(Strategy::for_grade_level(GradeLevel::GymAth3), Strategy::Regular);
    }

    #[test]
    fn no_export_in_cross_over_grade_produces_nothing() {
        let s = subject(ExportMode::NoExport);
        let tests = [test(1, 2019, GradeLevel::CrossOverVwo5)];
        for grade_level in [GradeLevel::CrossOverVwo5, GradeLevel::CrossOverVwo6] {
            let p = periods();
            let ctx = RenderContext {
                year: 2019,
                grade_level,
                periods: &p,
            };
            let mut doc = Document::new();
            let mut d = data(&s, &tests);
            d.havo5_tests = &tests;
            assert_eq!(render_subject(&mut doc, &ctx, &d).unwrap(), 0);
            assert!(doc.blocks.is_empty());
        }
    }

    #[test]
    fn regular_subject_without_tests_is_skipped() {
        let s = subject(ExportMode::Table);
        let p = periods();
        let ctx = RenderContext {
            year: 2019,
            grade_level: GradeLevel::Havo5,
            periods: &p,
        };
        let mut doc = Document::new();
        assert_eq!(render_subject(&mut doc, &ctx, &data(&s, &[])).unwrap(), 0);
        assert!(doc.blocks.is_empty());
    }

    #[test]
    fn regular_page_has_header_note_and_remarks() {
        let s = subject(ExportMode::NoExport);
        let mut h4 = test(1, 2018, GradeLevel::Havo4);
        h4.pct = Some(40);
        let mut h5 = test(2, 2019, GradeLevel::Havo5);
        h5.pct = Some(0);
        h5.footnote = Some("mondeling".into());
        h5.weighting_ed5 = Some(25);
        let history = [h4, h5.clone()];
        let tests = [h5];
        let notes = [Footnote {
            text: "Zie ook de studiewijzer".into(),
        }];

        let p = periods();
        let ctx = RenderContext {
            year: 2019,
            grade_level: GradeLevel::Havo5,
            periods: &p,
        };
        let mut d = data(&s, &tests);
        d.history = &history;
        d.footnotes = &notes;
        let mut doc = Document::new();
        assert_eq!(render_subject(&mut doc, &ctx, &d).unwrap(), 1);

        let text = all_text(&doc);
        assert!(text.starts_with("PTA\tScheikunde (SK)\t5 Havo\t2019-2020\n"));
        assert!(text.contains("berekening SE cijfer: (2x ED4 + 3x ED5) / 5"));
        assert!(text.contains("Toets 2 1)|"));
        assert!(text.contains("1) mondeling\n"));
        assert!(text.contains("Zie ook de studiewijzer\n"));
        assert_eq!(doc.page_break_count(), 1);

        let table = tables(&doc)[0];
        assert_eq!(table.rows[0][0].shading, Some(HEADER_BG_COLOR));
        assert!(table.rows[1][0].paragraphs[0].runs[0].bold);
        assert_eq!(table.rows[1][1].paragraphs[0].align, None);
        assert_eq!(table.rows[1][2].paragraphs[0].align, Some(Align::Center));
    }

    #[test]
    fn gym_ath_3_uses_ptb_prefix_and_own_widths() {
        let s = subject(ExportMode::NoExport);
        let tests = [test(1, 2019, GradeLevel::GymAth3)];
        let p = periods();
        let ctx = RenderContext {
            year: 2019,
            grade_level: GradeLevel::GymAth3,
            periods: &p,
        };
        let mut doc = Document::new();
        render_subject(&mut doc, &ctx, &data(&s, &tests)).unwrap();
        assert!(all_text(&doc).starts_with("PTB\t"));
        let table = tables(&doc)[0];
        assert_eq!(table.widths[2], cm(1.75));
        assert_eq!(table.widths.len(), 7);
    }

    #[test]
    fn extra_columns_share_remaining_width() {
        let page = Document::new().page.text_width();
        let widths = column_widths(&DEFAULT_WIDTHS, 9, page);
        let fixed: Twips = DEFAULT_WIDTHS.iter().map(|w| cm(*w)).sum();
        let extra = (page - fixed - mm(1.0)) / 2;
        assert_eq!(widths[7], extra);
        assert_eq!(widths[8], extra);
        assert_eq!(widths[0], cm(1.51));
    }

    #[test]
    fn vocational_row_values() {
        let s = subject(ExportMode::NoExport);
        let mut t = test(1, 2019, GradeLevel::Tl4);
        t.type_code = Some(4);
        t.resit = Some(1);
        t.weighting_ed3 = Some(10);
        t.weighting_ed4 = Some(30);
        t.week = Some(45);
        let tests = [t];
        let p = periods();
        let ctx = RenderContext {
            year: 2019,
            grade_level: GradeLevel::Tl4,
            periods: &p,
        };
        let mut doc = Document::new();
        assert_eq!(render_subject(&mut doc, &ctx, &data(&s, &tests)).unwrap(), 1);
        let text = all_text(&doc);
        assert!(text.contains("SK1|Toets 1|B|1 (tw)|ja|praktisch|100|30|"));
        assert_eq!(tables(&doc)[0].widths[7], cm(2.5));

        let ctx = RenderContext {
            grade_level: GradeLevel::Tl3,
            ..ctx
        };
        let mut doc = Document::new();
        render_subject(&mut doc, &ctx, &data(&s, &tests)).unwrap();
        assert!(all_text(&doc).contains("|praktisch|100|10|"));
    }

    #[test]
    fn cross_over_5_remark_and_empty_table_mode() {
        let p = periods();
        let ctx = RenderContext {
            year: 2019,
            grade_level: GradeLevel::CrossOverVwo5,
            periods: &p,
        };

        let s = subject(ExportMode::RemarkCompletedEarlier);
        let mut doc = Document::new();
        assert_eq!(render_subject(&mut doc, &ctx, &data(&s, &[])).unwrap(), 1);
        assert!(all_text(&doc).contains("al afgerond op Vwo niveau."));

        let s = subject(ExportMode::Table);
        let mut doc = Document::new();
        assert_eq!(render_subject(&mut doc, &ctx, &data(&s, &[])).unwrap(), 0);
    }

    #[test]
    fn cross_over_5_sub_tables() {
        let s = subject(ExportMode::Table);
        let old = test(10, 2018, GradeLevel::Vwo4);
        let cross_overs = [
            CrossOver {
                weighting: Some(20),
                action: Some(CrossOverAction::Revalue),
                old_test_id: Some(10),
                old_test: Some(old),
                linked_test: None,
            },
            CrossOver {
                weighting: Some(5),
                action: Some(CrossOverAction::CatchUp),
                old_test_id: None,
                old_test: None,
                linked_test: None,
            },
        ];
        let mut make_up = test(3, 2019, GradeLevel::CrossOverVwo5);
        make_up.weighting_ed4 = Some(15);
        let tests = [make_up];

        let p = periods();
        let ctx = RenderContext {
            year: 2019,
            grade_level: GradeLevel::CrossOverVwo5,
            periods: &p,
        };
        let mut d = data(&s, &tests);
        d.cross_overs = &cross_overs;
        let mut doc = Document::new();
        assert_eq!(render_subject(&mut doc, &ctx, &d).unwrap(), 1);

        let text = all_text(&doc);
        assert!(text.contains("SK10|2018-2019|Toets 10|B|herwaarderen|20|"));
        assert!(text.contains("-|-|(toets ontbreekt)|-|5|"));
        assert!(text.contains("SK3|2019-2020|Toets 3|B|15|"));
        assert_eq!(tables(&doc).len(), 3);
    }

    #[test]
    fn cross_over_6_maps_havo_5_tests_to_predecessors() {
        let s = subject(ExportMode::Table);
        let h5 = [test(20, 2019, GradeLevel::Havo5), test(21, 2019, GradeLevel::Havo5)];
        let cross_overs = [CrossOver {
            weighting: None,
            action: Some(CrossOverAction::CarryOver),
            old_test_id: Some(20),
            old_test: Some(h5[0].clone()),
            linked_test: Some(test(7, 2018, GradeLevel::Vwo5)),
        }];
        let p = periods();
        let ctx = RenderContext {
            year: 2019,
            grade_level: GradeLevel::CrossOverVwo6,
            periods: &p,
        };
        let mut d = data(&s, &[]);
        d.cross_overs = &cross_overs;
        d.havo5_tests = &h5;
        let mut doc = Document::new();
        assert_eq!(render_subject(&mut doc, &ctx, &d).unwrap(), 1);

        let text = all_text(&doc);
        assert!(text.contains("SK20|V5 SK7|Toets 20|B|overnemen|"));
        assert!(text.contains("SK21||Toets 21|B||"));

        let s = subject(ExportMode::RemarkVwo);
        let mut doc = Document::new();
        assert_eq!(render_subject(&mut doc, &ctx, &data(&s, &[])).unwrap(), 1);
        assert!(all_text(&doc).contains("Vwo 6 PTA moeten worden afgerond."));
    }

    #[test]
    fn cross_over_5_remark_vwo_falls_back_to_tables() {
        let p = periods();
        let ctx = RenderContext {
            year: 2019,
            grade_level: GradeLevel::CrossOverVwo5,
            periods: &p,
        };
        let tests = [test(3, 2019, GradeLevel::CrossOverVwo5)];

        for mode in [ExportMode::RemarkVwo, ExportMode::Unrecognised] {
            let s = subject(mode);
            let mut doc = Document::new();
            assert_eq!(render_subject(&mut doc, &ctx, &data(&s, &tests)).unwrap(), 1);
            assert!(all_text(&doc).contains("SK3|2019-2020|Toets 3|B|"));
            assert_eq!(tables(&doc).len(), 1);

            // no records still yields a header-only page
            let mut doc = Document::new();
            assert_eq!(render_subject(&mut doc, &ctx, &data(&s, &[])).unwrap(), 1);
            assert!(all_text(&doc).contains("Scheikunde"));
            assert!(tables(&doc).is_empty());
            assert_eq!(doc.page_break_count(), 1);
        }
    }

    #[test]
    fn cross_over_6_later_record_wins_for_same_old_test() {
        let h5 = [test(20, 2019, GradeLevel::Havo5)];
        let record = |action| CrossOver {
            weighting: None,
            action: Some(action),
            old_test_id: Some(20),
            old_test: None,
            linked_test: None,
        };
        let cross_overs = [record(CrossOverAction::CarryOver), record(CrossOverAction::Revalue)];
        let p = periods();
        let ctx = RenderContext {
            year: 2019,
            grade_level: GradeLevel::CrossOverVwo6,
            periods: &p,
        };

        for mode in [ExportMode::Table, ExportMode::Unrecognised] {
            let s = subject(mode);
            let mut d = data(&s, &[]);
            d.cross_overs = &cross_overs;
            d.havo5_tests = &h5;
            let mut doc = Document::new();
            assert_eq!(render_subject(&mut doc, &ctx, &d).unwrap(), 1);
            assert!(all_text(&doc).contains("SK20||Toets 20|B|herwaarderen|"));
        }
    }
}
