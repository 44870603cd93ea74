//! DOCX text extraction.
//!
//! A `.docx` file is a zip archive; the document body lives in
//! `word/document.xml`. Paragraph text is concatenated with newlines,
//! and any tables are appended after a `[TABLES]` marker as aligned
//! text grids (first row treated as the header).

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::error;

/// Extract text from DOCX bytes. Best-effort: any failure logs and
/// yields an empty string.
pub fn extract_docx(bytes: &[u8]) -> String {
    match read_docx(bytes) {
        Ok(text) => text,
        Err(err) => {
            error!(error = %err, "DOCX extraction error");
            String::new()
        }
    }
}

fn read_docx(bytes: &[u8]) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name("word/document.xml")?.read_to_string(&mut xml)?;
    parse_document_xml(&xml)
}

/// One table: rows of cell texts.
type Table = Vec<Vec<String>>;

fn parse_document_xml(xml: &str) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let mut reader = Reader::from_str(xml);

    let mut body = String::new();
    let mut tables: Vec<Table> = Vec::new();

    // Parser state: nesting depth inside w:tbl (nested tables are
    // flattened into their outer cell), and whether we are inside a
    // w:t text run.
    let mut table_depth = 0usize;
    let mut in_text_run = false;
    let mut paragraph = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => {
                    table_depth += 1;
                    if table_depth == 1 {
                        tables.push(Table::new());
                    }
                }
                b"w:tr" if table_depth == 1 => {
                    if let Some(table) = tables.last_mut() {
                        table.push(Vec::new());
                    }
                }
                b"w:tc" if table_depth == 1 => {
                    if let Some(row) = tables.last_mut().and_then(|t| t.last_mut()) {
                        row.push(String::new());
                    }
                }
                b"w:t" => in_text_run = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:t" => in_text_run = false,
                b"w:p" => {
                    if table_depth == 0 {
                        body.push_str(&paragraph);
                        body.push('\n');
                        paragraph.clear();
                    } else if let Some(cell) = current_cell(&mut tables) {
                        // Paragraph breaks inside a cell become newlines.
                        if !cell.is_empty() {
                            cell.push('\n');
                        }
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_text_run => {
                let text = t.unescape()?;
                if table_depth == 0 {
                    paragraph.push_str(&text);
                } else if let Some(cell) = current_cell(&mut tables) {
                    cell.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut out = body;
    if !tables.is_empty() {
        out.push_str("\n[TABLES]\n");
        for table in &tables {
            out.push_str(&render_table(table));
            out.push('\n');
        }
    }
    Ok(out)
}

fn current_cell(tables: &mut [Table]) -> Option<&mut String> {
    tables.last_mut()?.last_mut()?.last_mut()
}

/// Render a table as a column-aligned text grid.
fn render_table(table: &Table) -> String {
    let columns = table.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return String::new();
    }

    let mut widths = vec![0usize; columns];
    for row in table {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.trim().chars().count());
        }
    }

    let mut out = String::new();
    for row in table {
        let mut line = String::new();
        for (i, width) in widths.iter().enumerate() {
            let cell = row.get(i).map(|c| c.trim()).unwrap_or("");
            if i > 0 {
                line.push_str("  ");
            }
            line.push_str(cell);
            for _ in cell.chars().count()..*width {
                line.push(' ');
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
