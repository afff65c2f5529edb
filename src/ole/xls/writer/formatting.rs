//! XLS cell formatting (FONT, FORMAT and XF records)
//!
//! This module implements the BIFF8 formatting tables for Excel 97-2003 files.
//! Based on Microsoft's "[MS-XLS]" specification.
//!
//! # Key Structures
//!
//! - **XF (Extended Format)**: cell format record; cells point at it by index
//! - **FONT**: font definition; the workbook carries the four default fonts
//! - **FORMAT**: number format code keyed by its format index
//!
//! Only the number format varies between cell styles. Every other XF
//! attribute keeps Excel's defaults.

use super::super::{XlsError, XlsResult};
use std::collections::BTreeMap;
use std::io::Write;

/// Font weight constants
pub const FONT_WEIGHT_NORMAL: u16 = 400;
pub const FONT_WEIGHT_BOLD: u16 = 700;

/// Default color index (window text)
pub const COLOR_AUTOMATIC: u16 = 0x7FFF;

/// Built-in number format strings written as FORMAT records (indices 0..7).
const BUILTIN_NUMBER_FORMATS: [&str; 8] = [
    "General",                         // 0x00
    "0",                               // 0x01
    "0.00",                            // 0x02
    "#,##0",                           // 0x03
    "#,##0.00",                        // 0x04
    "\"$\"#,##0_);(\"$\"#,##0)",       // 0x05
    "\"$\"#,##0_);[Red](\"$\"#,##0)",  // 0x06
    "\"$\"#,##0.00_);(\"$\"#,##0.00)", // 0x07
];

/// Number of style XFs preceding the default cell XF.
const STYLE_XF_COUNT: u16 = 15;
/// XF index used by cells without an explicit style.
pub const DEFAULT_CELL_XF_INDEX: u16 = STYLE_XF_COUNT;
/// Style XFs for the comma, currency and percent styles.
const BUILTIN_STYLE_FORMATS: [u16; 5] = [0x002B, 0x0029, 0x002C, 0x002A, 0x0009];
/// First XF index available to cell styles.
pub const FIRST_USER_XF_INDEX: u16 = DEFAULT_CELL_XF_INDEX + 1 + BUILTIN_STYLE_FORMATS.len() as u16;
/// BIFF8 readers reject workbooks with more XF records than this.
const MAX_XF_RECORDS: usize = 4050;

/// Handle to a cell style record owned by a workbook.
///
/// Cells referring to the same handle share one XF record, so changing the
/// style's number format affects all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellStyleId(pub(crate) u32);

impl CellStyleId {
    /// Position in the workbook's style table (0-based).
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Font definition
#[derive(Debug, Clone)]
pub struct Font {
    /// Font height in twips (1/20 of a point)
    pub height: u16,
    /// Font weight (400 = normal, 700 = bold)
    pub weight: u16,
    /// Italic flag
    pub italic: bool,
    /// Font color index
    pub color_index: u16,
    /// Font name
    pub name: String,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            height: 200, // 10pt
            weight: FONT_WEIGHT_NORMAL,
            italic: false,
            color_index: COLOR_AUTOMATIC,
            name: "Arial".to_string(),
        }
    }
}

/// Extended Format (XF) record contents that vary in this workbook
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtendedFormat {
    /// Font index
    pub font_index: u16,
    /// Number format index
    pub format_index: u16,
}

/// Write FONT record (0x0031)
pub fn write_font<W: Write>(writer: &mut W, font: &Font) -> XlsResult<()> {
    let name_bytes = font.name.as_bytes();
    let name_len = name_bytes.len().min(255);

    // Fixed payload is 14 bytes of properties, then NameLen (1), Options (1), Name (N).
    let data_len = 14 + 1 + 1 + name_len;
    super::biff::write_record_header(writer, 0x0031, data_len as u16)?;

    writer.write_all(&font.height.to_le_bytes())?;

    let mut flags = 0u16;
    if font.italic {
        flags |= 0x0002;
    }
    writer.write_all(&flags.to_le_bytes())?;

    writer.write_all(&font.color_index.to_le_bytes())?;
    writer.write_all(&font.weight.to_le_bytes())?;

    // Escapement (none), underline (none), family, charset, reserved
    writer.write_all(&0u16.to_le_bytes())?;
    writer.write_all(&[0, 0, 0, 0])?;

    // Font names are ASCII
    writer.write_all(&[name_len as u8, 0x00])?;
    writer.write_all(&name_bytes[..name_len])?;

    Ok(())
}

/// Write XF (Extended Format) record (0x00E0)
///
/// # Arguments
///
/// * `writer` - Output writer
/// * `xf` - Extended format definition
/// * `is_style_xf` - True for style XF, false for cell XF
pub fn write_xf<W: Write>(writer: &mut W, xf: &ExtendedFormat, is_style_xf: bool) -> XlsResult<()> {
    super::biff::write_record_header(writer, 0x00E0, 20)?;

    writer.write_all(&xf.font_index.to_le_bytes())?;
    writer.write_all(&xf.format_index.to_le_bytes())?;

    // Locked; style XFs set fStyle with parent 0xFFF, cell XFs inherit style XF 0
    let xf_type: u16 = if is_style_xf { 0xFFF5 } else { 0x0001 };
    writer.write_all(&xf_type.to_le_bytes())?;

    // Alignment: general, bottom
    writer.write_all(&[0x20])?;
    // Rotation, indent
    writer.write_all(&[0, 0])?;

    // Used attribute flags: a cell XF with its own number format sets fAtrNum
    let used = if !is_style_xf && xf.format_index != 0 { 0x04 } else { 0x00 };
    writer.write_all(&[used])?;

    // No borders, border colors or diagonal lines
    writer.write_all(&0u16.to_le_bytes())?;
    writer.write_all(&0u16.to_le_bytes())?;
    writer.write_all(&0u32.to_le_bytes())?;

    // Pattern colors: foreground 0x40, background 0x41 (system defaults)
    writer.write_all(&0x20C0u16.to_le_bytes())?;

    Ok(())
}

/// Formatting manager tracking number formats and cell style records
#[derive(Debug)]
pub struct FormattingManager {
    fonts: Vec<Font>,
    /// FORMAT records keyed by format index, in addition to built-ins 0..7
    number_formats: BTreeMap<u16, String>,
    /// One cell XF per style, holding its number format index
    styles: Vec<ExtendedFormat>,
}

impl FormattingManager {
    /// Create a new formatting manager with default entries
    pub fn new() -> Self {
        // Default fonts (indices 0..3): normal, bold, italic, bold italic.
        let fonts = vec![
            Font::default(),
            Font {
                weight: FONT_WEIGHT_BOLD,
                ..Font::default()
            },
            Font {
                italic: true,
                ..Font::default()
            },
            Font {
                weight: FONT_WEIGHT_BOLD,
                italic: true,
                ..Font::default()
            },
        ];

        Self {
            fonts,
            number_formats: BTreeMap::new(),
            styles: Vec::new(),
        }
    }

    /// Register a number format code under a fixed format index.
    ///
    /// The code replaces an earlier one registered under the same index, and
    /// replaces the built-in FORMAT record for indices 0..7.
    pub fn register_number_format_with_id(&mut self, index: u16, code: &str) -> XlsResult<()> {
        if code.is_empty() {
            return Err(XlsError::InvalidFormat(index));
        }
        self.number_formats.insert(index, code.to_string());
        Ok(())
    }

    /// Number format code registered under `index`, if any.
    pub fn number_format(&self, index: u16) -> Option<&str> {
        self.number_formats.get(&index).map(String::as_str)
    }

    /// Create a cell style with the General number format.
    pub fn create_cell_style(&mut self) -> XlsResult<CellStyleId> {
        let used = FIRST_USER_XF_INDEX as usize + self.styles.len();
        if used >= MAX_XF_RECORDS {
            return Err(XlsError::InvalidData(format!(
                "workbook cannot hold more than {} cell styles",
                MAX_XF_RECORDS - FIRST_USER_XF_INDEX as usize
            )));
        }
        let id = CellStyleId(self.styles.len() as u32);
        self.styles.push(ExtendedFormat::default());
        Ok(id)
    }

    /// Set the number format index of a style.
    pub fn set_data_format(&mut self, style: CellStyleId, format_index: u16) -> XlsResult<()> {
        let xf = self
            .styles
            .get_mut(style.0 as usize)
            .ok_or(XlsError::InvalidStyle(style.0))?;
        xf.format_index = format_index;
        Ok(())
    }

    /// Number format index of a style.
    pub fn data_format(&self, style: CellStyleId) -> Option<u16> {
        self.styles.get(style.0 as usize).map(|xf| xf.format_index)
    }

    /// Number of style records created so far.
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// XF index written into cell records for `style`.
    pub(crate) fn cell_xf_index_for(&self, style: Option<CellStyleId>) -> XlsResult<u16> {
        match style {
            None => Ok(DEFAULT_CELL_XF_INDEX),
            Some(id) if (id.0 as usize) < self.styles.len() => Ok(FIRST_USER_XF_INDEX + id.0 as u16),
            Some(id) => Err(XlsError::InvalidStyle(id.0)),
        }
    }

    /// Write all FONT records
    pub fn write_fonts<W: Write>(&self, writer: &mut W) -> XlsResult<()> {
        for font in &self.fonts {
            write_font(writer, font)?;
        }
        Ok(())
    }

    /// Write all FORMAT records (0x041E): built-in indices 0..7 unless
    /// redefined, then every registered code in index order.
    pub fn write_number_formats<W: Write>(&self, writer: &mut W) -> XlsResult<()> {
        for (index, format_str) in BUILTIN_NUMBER_FORMATS.iter().enumerate() {
            let index = index as u16;
            if !self.number_formats.contains_key(&index) {
                super::biff::write_format_record(writer, index, format_str)?;
            }
        }

        for (code, pattern) in &self.number_formats {
            super::biff::write_format_record(writer, *code, pattern)?;
        }

        Ok(())
    }

    /// Write all XF records
    pub fn write_formats<W: Write>(&self, writer: &mut W) -> XlsResult<()> {
        // 0..14: default style XFs; 1,2 use the bold font and 3,4 the italic one
        for i in 0..STYLE_XF_COUNT {
            let xf = ExtendedFormat {
                font_index: match i {
                    1 | 2 => 1,
                    3 | 4 => 2,
                    _ => 0,
                },
                format_index: 0,
            };
            write_xf(writer, &xf, true)?;
        }

        // 15: default cell XF
        write_xf(writer, &ExtendedFormat::default(), false)?;

        // 16..20: style XFs for built-in number format styles
        for &format_index in &BUILTIN_STYLE_FORMATS {
            let xf = ExtendedFormat {
                font_index: 0,
                format_index,
            };
            write_xf(writer, &xf, true)?;
        }

        // 21..: one cell XF per style
        for xf in &self.styles {
            write_xf(writer, xf, false)?;
        }

        Ok(())
    }
}

impl Default for FormattingManager {
    fn default() -> Self {
        Self::new()
    }
}
