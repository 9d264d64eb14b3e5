use chrono::{Datelike, NaiveDate};

use crate::constants::MONTHS_NL;

/// Decodes HTML character references, legacy ones without `;` included.
pub fn unescape_html(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Newline-normalised, trimmed and entity-decoded.
pub fn clean_text(text: &str) -> String {
    unescape_html(normalize_newlines(text).trim())
}

pub fn capfirst(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `5 maart 2020`
pub fn format_date_nl(date: NaiveDate) -> String {
    let month = MONTHS_NL[date.month0() as usize];
    format!("{} {} {}", date.day(), month, date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_decodes_and_trims() {
        assert_eq!(
            clean_text("  Caf&eacute; &amp; r&#233;sum&#xE9;\r\nregel 2 \r\n"),
            "Café & résumé\nregel 2"
        );
    }

    #[test]
    fn unknown_entities_are_kept() {
        assert_eq!(unescape_html("a &foo; b & c"), "a &foo; b & c");
        assert_eq!(unescape_html("&;"), "&;");
    }

    #[test]
    fn full_entity_set_is_decoded() {
        assert_eq!(clean_text("&copy; 2020"), "\u{a9} 2020");
        assert_eq!(clean_text("Br&oslash;nsted"), "Br\u{f8}nsted");
        assert_eq!(clean_text("&frac12; uur"), "\u{bd} uur");
        assert_eq!(clean_text("3 &times; 4"), "3 \u{d7} 4");
        assert_eq!(clean_text("caf&eacute"), "caf\u{e9}");
    }

    #[test]
    fn capfirst_only_touches_first_char() {
        assert_eq!(capfirst("scheikunde"), "Scheikunde");
        assert_eq!(capfirst("éen TWEE"), "Éen TWEE");
        assert_eq!(capfirst(""), "");
    }

    #[test]
    fn dutch_dates() {
        let d = NaiveDate::from_ymd_opt(2020, 3, 5).unwrap();
        assert_eq!(format_date_nl(d), "5 maart 2020");
        let d = NaiveDate::from_ymd_opt(2019, 12, 20).unwrap();
        assert_eq!(format_date_nl(d), "20 december 2019");
    }
}
