//! Parser for Excel worksheet XML files.
//!
//! Reads `<sheetData>` into sorted rows of typed cells. Besides the plain
//! cell types this resolves shared strings, shared formulas (by shifting the
//! master formula), ISO 8601 date cells and implicit cell positions.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::warn;

use super::styles_parser::NumberFormatTable;
use super::{attr_value, read_rich_text, read_text};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::xlsx::cell::{CachedValue, CellValue, SourceCell};
use crate::ooxml::xlsx::shared_strings::SharedStrings;
use crate::ooxml::xlsx::worksheet::SourceRow;
use crate::sheet::reference::{MAX_COLUMN, parse_row_number};
use crate::sheet::{ErrorCode, reference_to_coords, shift_formula};

/// Workbook-level data the cells of a worksheet refer to.
#[derive(Debug, Clone, Copy)]
pub struct WorksheetContext<'a> {
    pub shared_strings: &'a SharedStrings,
    pub formats: &'a NumberFormatTable,
    pub date1904: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormulaKind {
    Normal,
    Shared,
    Array,
    DataTable,
}

#[derive(Debug)]
struct RawFormula {
    text: String,
    kind: FormulaKind,
    shared_index: Option<u32>,
    has_ref: bool,
}

#[derive(Debug, Default)]
struct RawCell {
    value: Option<String>,
    inline: Option<String>,
    formula: Option<RawFormula>,
}

/// Master of a shared-formula group.
#[derive(Debug)]
struct SharedMaster {
    formula: String,
    row: u32,
    col: u32,
}

/// Parse worksheet XML into rows sorted by index, cells sorted by column.
pub fn parse_worksheet(content: &str, ctx: &WorksheetContext<'_>) -> Result<Vec<SourceRow>> {
    let mut reader = Reader::from_str(content);
    let mut parser = SheetDataParser::new(ctx);
    let mut buf = Vec::with_capacity(1024);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"row" => parser.start_row(&reader, &e)?,
                b"c" => {
                    let (row, col, style, cell_type) = parser.cell_header(&reader, &e)?;
                    let raw = read_cell_body(&mut reader)?;
                    parser.finish_cell(row, col, style, &cell_type, raw)?;
                },
                _ => {},
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"row" => {
                    parser.start_row(&reader, &e)?;
                    parser.current_row = None;
                },
                b"c" => {
                    let (row, col, style, cell_type) = parser.cell_header(&reader, &e)?;
                    parser.finish_cell(row, col, style, &cell_type, RawCell::default())?;
                },
                _ => {},
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"row" => parser.current_row = None,
                b"sheetData" => break,
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("worksheet: {}", e))),
            _ => {},
        }
    }

    Ok(parser.into_rows())
}

struct SheetDataParser<'a> {
    ctx: &'a WorksheetContext<'a>,
    rows: BTreeMap<u32, BTreeMap<u32, SourceCell>>,
    shared: HashMap<u32, SharedMaster>,
    current_row: Option<u32>,
    next_row: u32,
    next_col: u32,
}

impl<'a> SheetDataParser<'a> {
    fn new(ctx: &'a WorksheetContext<'a>) -> Self {
        Self {
            ctx,
            rows: BTreeMap::new(),
            shared: HashMap::new(),
            current_row: None,
            next_row: 0,
            next_col: 0,
        }
    }

    fn start_row(&mut self, reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Result<()> {
        let index = match attr_value(reader, e, b"r") {
            Some(r) => parse_row_number(r.as_bytes())
                .ok_or_else(|| OoxmlError::InvalidFormat(format!("invalid row number '{}'", r)))?,
            None => self.next_row,
        };

        self.rows.entry(index).or_default();
        self.current_row = Some(index);
        self.next_row = index + 1;
        self.next_col = 0;
        Ok(())
    }

    /// Resolve position, style index and type of a `<c>` element.
    fn cell_header(
        &mut self,
        reader: &Reader<&[u8]>,
        e: &BytesStart<'_>,
    ) -> Result<(u32, u32, usize, String)> {
        let (row, col) = match attr_value(reader, e, b"r") {
            Some(r) => reference_to_coords(&r)
                .ok_or_else(|| OoxmlError::InvalidFormat(format!("invalid cell reference '{}'", r)))?,
            None => {
                let row = self.current_row.unwrap_or(self.next_row);
                if self.next_col > MAX_COLUMN {
                    return Err(OoxmlError::InvalidFormat(format!(
                        "too many cells in row {}",
                        row + 1
                    )));
                }
                (row, self.next_col)
            },
        };
        self.next_col = col + 1;

        let style = attr_value(reader, e, b"s")
            .and_then(|s| atoi_simd::parse::<usize>(s.as_bytes()).ok())
            .unwrap_or(0);
        let cell_type = attr_value(reader, e, b"t").unwrap_or_else(|| "n".to_string());

        Ok((row, col, style, cell_type))
    }

    fn finish_cell(
        &mut self,
        row: u32,
        col: u32,
        style: usize,
        cell_type: &str,
        raw: RawCell,
    ) -> Result<()> {
        let cached = self.typed_value(cell_type, raw.value.as_deref(), raw.inline, row, col)?;

        let value = match raw.formula {
            Some(formula) => self.formula_value(formula, cached, row, col),
            None => cached.into(),
        };

        let format_id = self.ctx.formats.format_id(style);
        self.rows
            .entry(row)
            .or_default()
            .insert(col, SourceCell::new(col, value, format_id));
        Ok(())
    }

    fn typed_value(
        &self,
        cell_type: &str,
        value: Option<&str>,
        inline: Option<String>,
        row: u32,
        col: u32,
    ) -> Result<CachedValue> {
        let cached = match cell_type {
            "inlineStr" => match inline {
                Some(text) => CachedValue::String(text),
                None => value.map_or(CachedValue::Empty, |v| CachedValue::String(v.to_string())),
            },
            _ => {
                let Some(value) = value else {
                    return Ok(CachedValue::Empty);
                };
                match cell_type {
                    "b" => CachedValue::Boolean(matches!(value.trim(), "1" | "true")),
                    "e" => CachedValue::Error(ErrorCode::from_text(value).unwrap_or_else(|| {
                        warn!(row, col, code = value, "unknown error value, using #N/A");
                        ErrorCode::NotAvailable
                    })),
                    "s" => {
                        let text = atoi_simd::parse::<usize>(value.trim().as_bytes())
                            .ok()
                            .and_then(|i| self.ctx.shared_strings.get(i))
                            .ok_or_else(|| {
                                OoxmlError::InvalidFormat(format!(
                                    "shared string index '{}' out of range",
                                    value
                                ))
                            })?;
                        CachedValue::String(text.to_string())
                    },
                    "str" => CachedValue::String(value.to_string()),
                    "d" => {
                        let serial = iso_to_serial(value, self.ctx.date1904).ok_or_else(|| {
                            OoxmlError::InvalidFormat(format!("invalid date value '{}'", value))
                        })?;
                        CachedValue::Number(serial)
                    },
                    _ => {
                        let trimmed = value.trim();
                        if trimmed.is_empty() {
                            CachedValue::Empty
                        } else {
                            let number = fast_float2::parse::<f64, _>(trimmed).map_err(|_| {
                                OoxmlError::InvalidFormat(format!("invalid number '{}'", value))
                            })?;
                            CachedValue::Number(number)
                        }
                    },
                }
            },
        };
        Ok(cached)
    }

    fn formula_value(&mut self, formula: RawFormula, cached: CachedValue, row: u32, col: u32) -> CellValue {
        let text = formula.text.trim();
        let text = text.strip_prefix('=').unwrap_or(text);

        match formula.kind {
            FormulaKind::DataTable => cached.into(),
            FormulaKind::Shared if text.is_empty() => {
                let Some(index) = formula.shared_index else {
                    warn!(row, col, "shared formula without index, keeping cached value");
                    return cached.into();
                };
                let Some(master) = self.shared.get(&index) else {
                    warn!(row, col, index, "shared formula master not found, keeping cached value");
                    return cached.into();
                };

                let row_delta = i64::from(row) - i64::from(master.row);
                let col_delta = i64::from(col) - i64::from(master.col);
                match shift_formula(&master.formula, row_delta, col_delta) {
                    Ok(shifted) => CellValue::Formula {
                        formula: shifted,
                        cached,
                    },
                    Err(e) => {
                        warn!(row, col, error = %e, "cannot expand shared formula, keeping cached value");
                        cached.into()
                    },
                }
            },
            _ if text.is_empty() => cached.into(),
            kind => {
                if kind == FormulaKind::Shared
                    && let Some(index) = formula.shared_index
                    && (formula.has_ref || !self.shared.contains_key(&index))
                {
                    self.shared.insert(
                        index,
                        SharedMaster {
                            formula: text.to_string(),
                            row,
                            col,
                        },
                    );
                }
                CellValue::Formula {
                    formula: text.to_string(),
                    cached,
                }
            },
        }
    }

    fn into_rows(self) -> Vec<SourceRow> {
        self.rows
            .into_iter()
            .map(|(index, cells)| SourceRow {
                index,
                cells: cells.into_values().collect(),
            })
            .collect()
    }
}

/// Read the children of a `<c>` element up to `</c>`.
fn read_cell_body(reader: &mut Reader<&[u8]>) -> Result<RawCell> {
    let mut raw = RawCell::default();
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"v" => raw.value = Some(read_text(reader, b"v")?),
                b"is" => raw.inline = Some(read_rich_text(reader, b"is")?),
                b"f" => {
                    let mut formula = formula_header(reader, &e);
                    formula.text = read_text(reader, b"f")?;
                    raw.formula = Some(formula);
                },
                _ => {},
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"f" => raw.formula = Some(formula_header(reader, &e)),
                b"v" => raw.value = Some(String::new()),
                b"is" => raw.inline = Some(String::new()),
                _ => {},
            },
            Event::End(e) if e.local_name().as_ref() == b"c" => break,
            Event::Eof => {
                return Err(OoxmlError::Xml("unexpected end of document inside <c>".to_string()));
            },
            _ => {},
        }
    }

    Ok(raw)
}

fn formula_header(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> RawFormula {
    let kind = match attr_value(reader, e, b"t").as_deref() {
        Some("shared") => FormulaKind::Shared,
        Some("array") => FormulaKind::Array,
        Some("dataTable") => FormulaKind::DataTable,
        _ => FormulaKind::Normal,
    };
    RawFormula {
        text: String::new(),
        kind,
        shared_index: attr_value(reader, e, b"si").and_then(|v| atoi_simd::parse::<u32>(v.as_bytes()).ok()),
        has_ref: attr_value(reader, e, b"ref").is_some(),
    }
}

/// Convert an ISO 8601 date, date-time or time to a serial date number.
///
/// The 1900 system keeps Excel's phantom 1900-02-29, so dates before
/// 1900-03-01 are one lower than the plain day count.
pub fn iso_to_serial(text: &str, date1904: bool) -> Option<f64> {
    let text = text.trim().trim_end_matches('Z');

    let datetime = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });

    let Some(datetime) = datetime else {
        let time = NaiveTime::parse_from_str(text, "%H:%M:%S%.f").ok()?;
        return Some(day_fraction(time));
    };

    let epoch = if date1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };

    let mut days = (datetime.date() - epoch).num_days() as f64;
    if !date1904 && datetime.date() < NaiveDate::from_ymd_opt(1900, 3, 1)? {
        days -= 1.0;
    }
    if days < 0.0 {
        return None;
    }

    Some(days + day_fraction(datetime.time()))
}

fn day_fraction(time: NaiveTime) -> f64 {
    let seconds = f64::from(time.num_seconds_from_midnight()) + f64::from(time.nanosecond()) / 1e9;
    seconds / 86_400.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::reference::MAX_ROW;

    fn sheet_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
            body
        )
    }

    fn parse(body: &str) -> Vec<SourceRow> {
        let sst = SharedStrings::parse("<sst><si><t>Name</t></si><si><t>Age</t></si></sst>").unwrap();
        let formats = NumberFormatTable {
            cell_formats: vec![0, 14, 164],
            ..Default::default()
        };
        let ctx = WorksheetContext {
            shared_strings: &sst,
            formats: &formats,
            date1904: false,
        };
        parse_worksheet(&sheet_xml(body), &ctx).unwrap()
    }

    #[test]
    fn test_basic_types() {
        let rows = parse(
            r#"<row r="1">
                <c r="A1" t="s"><v>0</v></c>
                <c r="B1" t="s"><v>1</v></c>
                <c r="C1" t="b"><v>1</v></c>
                <c r="D1" t="e"><v>#DIV/0!</v></c>
                <c r="E1" s="1"><v>45000.5</v></c>
                <c r="F1" t="inlineStr"><is><t>inline</t></is></c>
                <c r="G1" s="2"/>
            </row>"#,
        );

        assert_eq!(rows.len(), 1);
        let cells = &rows[0].cells;
        assert_eq!(cells[0].value, CellValue::String("Name".to_string()));
        assert_eq!(cells[1].value, CellValue::String("Age".to_string()));
        assert_eq!(cells[2].value, CellValue::Boolean(true));
        assert_eq!(cells[3].value, CellValue::Error(ErrorCode::Div0));
        assert_eq!(cells[4].value, CellValue::Numeric(45000.5));
        assert_eq!(cells[4].format_id, 14);
        assert_eq!(cells[5].value, CellValue::String("inline".to_string()));
        assert_eq!(cells[6].value, CellValue::Blank);
        assert_eq!(cells[6].format_id, 164);
    }

    #[test]
    fn test_sparse_rows_sorted() {
        let rows = parse(
            r#"<row r="3"><c r="B3"><v>2</v></c><c r="A3"><v>1</v></c></row>
               <row r="1"><c r="A1"><v>0</v></c></row>
               <row r="7"/>"#,
        );

        let indices: Vec<u32> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 2, 6]);
        assert_eq!(rows[1].cells[0].col, 0);
        assert_eq!(rows[1].cells[1].col, 1);
        assert!(rows[2].cells.is_empty());
    }

    #[test]
    fn test_implicit_positions() {
        let rows = parse(r#"<row><c><v>1</v></c><c><v>2</v></c></row><row><c r="C2"><v>3</v></c><c><v>4</v></c></row>"#);
        assert_eq!(rows[0].index, 0);
        assert_eq!(rows[0].cells[1].col, 1);
        assert_eq!(rows[1].index, 1);
        assert_eq!(rows[1].cells[1].col, 3);
        assert_eq!(rows[1].cells[1].value, CellValue::Numeric(4.0));
    }

    #[test]
    fn test_formulas() {
        let rows = parse(
            r#"<row r="1">
                <c r="A1"><f>SUM(B1:C1)</f><v>3</v></c>
                <c r="B1" t="str"><f>"a"&amp;"b"</f><v>ab</v></c>
                <c r="C1"><f t="array" ref="C1">A1*2</f><v>6</v></c>
                <c r="D1"><f t="dataTable" ref="D1:D2" dt2D="0" dtr="0" r1="A1"/><v>9</v></c>
            </row>"#,
        );

        let cells = &rows[0].cells;
        assert_eq!(
            cells[0].value,
            CellValue::Formula {
                formula: "SUM(B1:C1)".to_string(),
                cached: CachedValue::Number(3.0)
            }
        );
        assert_eq!(
            cells[1].value,
            CellValue::Formula {
                formula: "\"a\"&\"b\"".to_string(),
                cached: CachedValue::String("ab".to_string())
            }
        );
        assert!(matches!(&cells[2].value, CellValue::Formula { formula, .. } if formula == "A1*2"));
        assert_eq!(cells[3].value, CellValue::Numeric(9.0));
    }

    #[test]
    fn test_shared_formula_expansion() {
        let rows = parse(
            r#"<row r="2"><c r="B2"><f t="shared" ref="B2:C3" si="0">A2*$A$1</f><v>1</v></c><c r="C2"><f t="shared" si="0"/><v>2</v></c></row>
               <row r="3"><c r="B3"><f t="shared" si="0"/><v>3</v></c><c r="C3"><f t="shared" si="7"/><v>4</v></c></row>"#,
        );

        let formula = |row: usize, cell: usize| match &rows[row].cells[cell].value {
            CellValue::Formula { formula, .. } => formula.clone(),
            other => format!("{:?}", other),
        };
        assert_eq!(formula(0, 0), "A2*$A$1");
        assert_eq!(formula(0, 1), "B2*$A$1");
        assert_eq!(formula(1, 0), "A3*$A$1");
        // Unknown group falls back to the cached value.
        assert_eq!(rows[1].cells[1].value, CellValue::Numeric(4.0));
    }

    #[test]
    fn test_unknown_error_code() {
        let rows = parse(r#"<row r="1"><c r="A1" t="e"><v>#SPILL!</v></c></row>"#);
        assert_eq!(rows[0].cells[0].value, CellValue::Error(ErrorCode::NotAvailable));
    }

    #[test]
    fn test_date_cells() {
        let rows = parse(r#"<row r="1"><c r="A1" t="d" s="1"><v>2024-01-15T12:00:00</v></c></row>"#);
        assert_eq!(rows[0].cells[0].value, CellValue::Numeric(45306.5));
    }

    #[test]
    fn test_iso_to_serial() {
        assert_eq!(iso_to_serial("1900-01-01", false), Some(1.0));
        assert_eq!(iso_to_serial("1900-02-28", false), Some(59.0));
        assert_eq!(iso_to_serial("1900-03-01", false), Some(61.0));
        assert_eq!(iso_to_serial("2024-01-15", false), Some(45306.0));
        assert_eq!(iso_to_serial("1904-01-02", true), Some(1.0));
        assert_eq!(iso_to_serial("06:00:00", false), Some(0.25));
        assert_eq!(iso_to_serial("not a date", false), None);
    }

    #[test]
    fn test_invalid_shared_string_index() {
        let sst = SharedStrings::new();
        let formats = NumberFormatTable::default();
        let ctx = WorksheetContext {
            shared_strings: &sst,
            formats: &formats,
            date1904: false,
        };
        let xml = sheet_xml(r#"<row r="1"><c r="A1" t="s"><v>3</v></c></row>"#);
        assert!(parse_worksheet(&xml, &ctx).is_err());
    }

    #[test]
    fn test_row_limit_check() {
        assert_eq!(parse_row_number(b"1048576"), Some(MAX_ROW));
    }
}
