use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

pub const CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES_ENTRY: &str = "[Content_Types].xml";
const ROOT_RELS_ENTRY: &str = "_rels/.rels";
const DOCUMENT_ENTRY: &str = "word/document.xml";
const DOCUMENT_RELS_ENTRY: &str = "word/_rels/document.xml.rels";
const STYLES_ENTRY: &str = "word/styles.xml";

pub const HEADER_BG_COLOR: &str = "D9D9D9";

/// Twentieths of a point.
pub type Twips = u32;

pub fn cm(value: f64) -> Twips {
    (value * 1440.0 / 2.54).round() as Twips
}

pub fn mm(value: f64) -> Twips {
    cm(value / 10.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn as_str(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub superscript: bool,
    /// Points; `None` keeps the document default.
    pub size: Option<u32>,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn superscript(mut self) -> Self {
        self.superscript = true;
        self
    }

    pub fn size(mut self, points: u32) -> Self {
        self.size = Some(points);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabStop {
    pub position: Twips,
    pub align: Align,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub align: Option<Align>,
    pub tab_stops: Vec<TabStop>,
    /// Points.
    pub space_before: Option<u32>,
    pub space_after: Option<u32>,
    pub page_break: bool,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new().run(Run::new(text))
    }

    pub fn page_break() -> Self {
        Self {
            page_break: true,
            ..Self::default()
        }
    }

    pub fn run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub fn tab_stop(mut self, position: Twips, align: Align) -> Self {
        self.tab_stops.push(TabStop { position, align });
        self
    }

    pub fn space_before(mut self, points: u32) -> Self {
        self.space_before = Some(points);
        self
    }

    pub fn space_after(mut self, points: u32) -> Self {
        self.space_after = Some(points);
        self
    }

    #[cfg(test)]
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
    pub shading: Option<&'static str>,
}

impl TableCell {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            shading: None,
        }
    }

    pub fn shaded(mut self, color: &'static str) -> Self {
        self.shading = Some(color);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub widths: Vec<Twips>,
    pub rows: Vec<Vec<TableCell>>,
    pub min_row_height: Twips,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSetup {
    pub width: Twips,
    pub height: Twips,
    pub margin_top: Twips,
    pub margin_bottom: Twips,
    pub margin_left: Twips,
    pub margin_right: Twips,
}

impl PageSetup {
    /// A4 landscape with the margins used for every PTA.
    pub fn a4_landscape() -> Self {
        Self {
            width: mm(297.0),
            height: mm(210.0),
            margin_top: cm(2.5),
            margin_bottom: cm(2.5),
            margin_left: cm(2.0),
            margin_right: cm(2.0),
        }
    }

    pub fn text_width(&self) -> Twips {
        self.width
            .saturating_sub(self.margin_left)
            .saturating_sub(self.margin_right)
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub page: PageSetup,
    pub blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            page: PageSetup::a4_landscape(),
            blocks: Vec::new(),
        }
    }

    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    pub fn add_table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }

    pub fn add_page_break(&mut self) {
        self.blocks.push(Block::Paragraph(Paragraph::page_break()));
    }

    pub fn page_break_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Paragraph(p) if p.page_break))
            .count()
    }

    pub fn document_xml(&self) -> String {
        let mut out = String::with_capacity(4096);
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        out.push_str(&format!(
            "<w:document xmlns:w=\"{}\" xmlns:r=\"{}\"><w:body>",
            W_NS, R_NS
        ));
        for block in &self.blocks {
            match block {
                Block::Paragraph(p) => write_paragraph(&mut out, p),
                Block::Table(t) => write_table(&mut out, t),
            }
        }
        // Word refuses a body whose last block before sectPr is a table.
        if matches!(self.blocks.last(), Some(Block::Table(_))) {
            out.push_str("<w:p/>");
        }
        let pg = &self.page;
        out.push_str(&format!(
            "<w:sectPr><w:pgSz w:w=\"{}\" w:h=\"{}\" w:orient=\"landscape\"/>\
             <w:pgMar w:top=\"{}\" w:right=\"{}\" w:bottom=\"{}\" w:left=\"{}\" \
             w:header=\"708\" w:footer=\"708\" w:gutter=\"0\"/></w:sectPr>",
            pg.width, pg.height, pg.margin_top, pg.margin_right, pg.margin_bottom, pg.margin_left
        ));
        out.push_str("</w:body></w:document>");
        out
    }

    /// Packs the document as a `.docx` archive.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts: [(&str, String); 5] = [
            (CONTENT_TYPES_ENTRY, content_types_xml()),
            (ROOT_RELS_ENTRY, root_rels_xml()),
            (DOCUMENT_ENTRY, self.document_xml()),
            (DOCUMENT_RELS_ENTRY, document_rels_xml()),
            (STYLES_ENTRY, styles_xml()),
        ];
        for (name, body) in parts {
            zip.start_file(name, opts)?;
            zip.write_all(body.as_bytes())?;
        }

        Ok(zip.finish()?.into_inner())
    }
}

/// Escapes text content; control characters other than tab and newline are dropped.
pub fn escape_xml(text: &str) -> String {
    let printable: String = text
        .chars()
        .filter(|c| matches!(c, '\t' | '\n') || (*c as u32) >= 0x20)
        .collect();
    html_escape::encode_text(&printable).into_owned()
}

fn write_run(out: &mut String, run: &Run) {
    out.push_str("<w:r>");
    if run.bold || run.italic || run.superscript || run.size.is_some() {
        out.push_str("<w:rPr>");
        if run.bold {
            out.push_str("<w:b/>");
        }
        if run.italic {
            out.push_str("<w:i/>");
        }
        if let Some(size) = run.size {
            out.push_str(&format!("<w:sz w:val=\"{}\"/>", size * 2));
        }
        if run.superscript {
            out.push_str("<w:vertAlign w:val=\"superscript\"/>");
        }
        out.push_str("</w:rPr>");
    }
    let escaped = escape_xml(&run.text);
    for (i, line) in escaped.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<w:br/>");
        }
        for (j, piece) in line.split('\t').enumerate() {
            if j > 0 {
                out.push_str("<w:tab/>");
            }
            if !piece.is_empty() {
                out.push_str("<w:t xml:space=\"preserve\">");
                out.push_str(piece);
                out.push_str("</w:t>");
            }
        }
    }
    out.push_str("</w:r>");
}

fn write_paragraph(out: &mut String, p: &Paragraph) {
    out.push_str("<w:p>");
    let has_props = !p.tab_stops.is_empty()
        || p.space_before.is_some()
        || p.space_after.is_some()
        || p.align.is_some();
    if has_props {
        out.push_str("<w:pPr>");
        if !p.tab_stops.is_empty() {
            out.push_str("<w:tabs>");
            for tab in &p.tab_stops {
                out.push_str(&format!(
                    "<w:tab w:val=\"{}\" w:pos=\"{}\"/>",
                    tab.align.as_str(),
                    tab.position
                ));
            }
            out.push_str("</w:tabs>");
        }
        if p.space_before.is_some() || p.space_after.is_some() {
            out.push_str("<w:spacing");
            if let Some(before) = p.space_before {
                out.push_str(&format!(" w:before=\"{}\"", before * 20));
            }
            if let Some(after) = p.space_after {
                out.push_str(&format!(" w:after=\"{}\"", after * 20));
            }
            out.push_str("/>");
        }
        if let Some(align) = p.align {
            out.push_str(&format!("<w:jc w:val=\"{}\"/>", align.as_str()));
        }
        out.push_str("</w:pPr>");
    }
    for run in &p.runs {
        write_run(out, run);
    }
    if p.page_break {
        out.push_str("<w:r><w:br w:type=\"page\"/></w:r>");
    }
    out.push_str("</w:p>");
}

fn write_table(out: &mut String, t: &Table) {
    out.push_str(
        "<w:tbl><w:tblPr><w:tblStyle w:val=\"TableGrid\"/><w:tblW w:w=\"0\" w:type=\"auto\"/>\
         <w:tblLayout w:type=\"fixed\"/></w:tblPr><w:tblGrid>",
    );
    for w in &t.widths {
        out.push_str(&format!("<w:gridCol w:w=\"{}\"/>", w));
    }
    out.push_str("</w:tblGrid>");
    for row in &t.rows {
        out.push_str(&format!(
            "<w:tr><w:trPr><w:trHeight w:val=\"{}\" w:hRule=\"atLeast\"/></w:trPr>",
            t.min_row_height
        ));
        for (idx, cell) in row.iter().enumerate() {
            out.push_str("<w:tc><w:tcPr>");
            if let Some(w) = t.widths.get(idx) {
                out.push_str(&format!("<w:tcW w:w=\"{}\" w:type=\"dxa\"/>", w));
            }
            if let Some(color) = cell.shading {
                out.push_str(&format!(
                    "<w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"{}\"/>",
                    color
                ));
            }
            out.push_str("<w:vAlign w:val=\"center\"/></w:tcPr>");
            if cell.paragraphs.is_empty() {
                out.push_str("<w:p/>");
            }
            for p in &cell.paragraphs {
                write_paragraph(out, p);
            }
            out.push_str("</w:tc>");
        }
        out.push_str("</w:tr>");
    }
    out.push_str("</w:tbl>");
}

fn content_types_xml() -> String {
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
     <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
     <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
     <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
     <Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>\
     <Override PartName=\"/word/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml\"/>\
     </Types>"
        .to_string()
}

fn root_rels_xml() -> String {
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
     <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
     <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"word/document.xml\"/>\
     </Relationships>"
        .to_string()
}

fn document_rels_xml() -> String {
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
     <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
     <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles\" Target=\"styles.xml\"/>\
     </Relationships>"
        .to_string()
}

/// Arial 10pt by default, plus the bordered "TableGrid" table style.
fn styles_xml() -> String {
    let border = "w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"";
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <w:styles xmlns:w=\"{ns}\">\
         <w:docDefaults><w:rPrDefault><w:rPr>\
         <w:rFonts w:ascii=\"Arial\" w:hAnsi=\"Arial\" w:eastAsia=\"Arial\" w:cs=\"Arial\"/>\
         <w:sz w:val=\"20\"/><w:szCs w:val=\"20\"/><w:lang w:val=\"nl-NL\"/>\
         </w:rPr></w:rPrDefault>\
         <w:pPrDefault><w:pPr><w:spacing w:after=\"0\" w:line=\"240\" w:lineRule=\"auto\"/></w:pPr></w:pPrDefault>\
         </w:docDefaults>\
         <w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\"><w:name w:val=\"Normal\"/><w:qFormat/></w:style>\
         <w:style w:type=\"table\" w:default=\"1\" w:styleId=\"TableNormal\"><w:name w:val=\"Normal Table\"/>\
         <w:tblPr><w:tblInd w:w=\"0\" w:type=\"dxa\"/><w:tblCellMar>\
         <w:top w:w=\"0\" w:type=\"dxa\"/><w:left w:w=\"108\" w:type=\"dxa\"/>\
         <w:bottom w:w=\"0\" w:type=\"dxa\"/><w:right w:w=\"108\" w:type=\"dxa\"/>\
         </w:tblCellMar></w:tblPr></w:style>\
         <w:style w:type=\"table\" w:styleId=\"TableGrid\"><w:name w:val=\"Table Grid\"/>\
         <w:basedOn w:val=\"TableNormal\"/><w:tblPr><w:tblBorders>\
         <w:top {b}/><w:left {b}/><w:bottom {b}/><w:right {b}/><w:insideH {b}/><w:insideV {b}/>\
         </w:tblBorders></w:tblPr></w:style>\
         </w:styles>",
        ns = W_NS,
        b = border
    )
}
