//! Formula lexer.
//!
//! Splits SpreadsheetML formula text (`SUM(A1:B2)*2`, with or without a
//! leading `=`) into tokens with byte spans. The shared-formula expander uses
//! the spans to rewrite references in place; the BIFF8 tokenizer consumes the
//! tokens directly.

use std::fmt;
use std::ops::Range;

use thiserror::Error;

use super::reference::{CellRef, MAX_COLUMN, MAX_ROW, letters_to_column, parse_row_number, shift_index};

/// Error literals recognized in formulas, longest first.
const ERROR_LITERALS: [&str; 8] = [
    "#GETTING_DATA",
    "#DIV/0!",
    "#VALUE!",
    "#NULL!",
    "#NAME?",
    "#REF!",
    "#NUM!",
    "#N/A",
];

/// Errors produced while lexing formula text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character '{ch}' at offset {at}")]
    Unexpected { ch: char, at: usize },

    #[error("unterminated string literal starting at offset {0}")]
    UnterminatedString(usize),

    #[error("unterminated sheet name starting at offset {0}")]
    UnterminatedSheetName(usize),

    #[error("invalid reference at offset {0}")]
    InvalidReference(usize),
}

/// Binary and postfix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Percent,
}

/// One end of a whole-row or whole-column range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRef {
    /// Row or column index (0-based)
    pub index: u32,
    pub absolute: bool,
}

/// The grid region a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefTarget {
    /// `A1`
    Cell(CellRef),
    /// `A1:B2`
    Area(CellRef, CellRef),
    /// `A:C`
    Columns(LineRef, LineRef),
    /// `1:3`
    Rows(LineRef, LineRef),
}

impl RefTarget {
    /// Move relative parts by the given deltas, `None` if any part leaves the grid.
    pub fn offset(self, row_delta: i64, col_delta: i64) -> Option<Self> {
        let line = |l: LineRef, delta: i64, max: u32| -> Option<LineRef> {
            if l.absolute {
                Some(l)
            } else {
                Some(LineRef {
                    index: shift_index(l.index, delta, max)?,
                    absolute: false,
                })
            }
        };

        Some(match self {
            RefTarget::Cell(c) => RefTarget::Cell(c.offset(row_delta, col_delta)?),
            RefTarget::Area(a, b) => RefTarget::Area(
                a.offset(row_delta, col_delta)?,
                b.offset(row_delta, col_delta)?,
            ),
            RefTarget::Columns(a, b) => RefTarget::Columns(
                line(a, col_delta, MAX_COLUMN)?,
                line(b, col_delta, MAX_COLUMN)?,
            ),
            RefTarget::Rows(a, b) => {
                RefTarget::Rows(line(a, row_delta, MAX_ROW)?, line(b, row_delta, MAX_ROW)?)
            },
        })
    }
}

impl fmt::Display for RefTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dollar = |abs: bool| if abs { "$" } else { "" };
        match self {
            RefTarget::Cell(c) => write!(f, "{}", c),
            RefTarget::Area(a, b) => write!(f, "{}:{}", a, b),
            RefTarget::Columns(a, b) => write!(
                f,
                "{}{}:{}{}",
                dollar(a.absolute),
                super::reference::column_to_letters(a.index),
                dollar(b.absolute),
                super::reference::column_to_letters(b.index)
            ),
            RefTarget::Rows(a, b) => write!(
                f,
                "{}{}:{}{}",
                dollar(a.absolute),
                a.index + 1,
                dollar(b.absolute),
                b.index + 1
            ),
        }
    }
}

/// A reference token, optionally qualified by a sheet name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Unquoted sheet name when the reference has a `Sheet!` prefix
    pub sheet: Option<String>,
    pub target: RefTarget,
    /// Byte length of the `Sheet!` prefix in the source text
    pub prefix_len: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Number(f64),
    Text(String),
    Bool(bool),
    Error(&'static str),
    Reference(Reference),
    /// Function name; the following token is always `LParen`
    Function(&'a str),
    /// Identifier that is neither a function, boolean nor reference
    Name(&'a str),
    Operator(Operator),
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<'a> {
    pub token: Token<'a>,
    pub span: Range<usize>,
}

/// Tokenize formula text.
pub fn tokenize(formula: &str) -> Result<Vec<Spanned<'_>>, LexError> {
    let bytes = formula.as_bytes();
    let mut tokens = Vec::with_capacity(formula.len() / 2 + 1);
    let mut pos = 0;

    if bytes.first() == Some(&b'=') {
        pos = 1;
    }

    while pos < bytes.len() {
        let start = pos;
        let c = bytes[pos];

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let token = match c {
            b'"' => {
                let (text, end) = lex_string(formula, pos)?;
                pos = end;
                Token::Text(text)
            },
            b'#' => {
                let literal = ERROR_LITERALS
                    .iter()
                    .find(|lit| formula[pos..].to_ascii_uppercase().starts_with(*lit))
                    .ok_or(LexError::Unexpected { ch: '#', at: pos })?;
                pos += literal.len();
                Token::Error(literal)
            },
            b'\'' => {
                let (sheet, after_bang) = lex_quoted_sheet(formula, pos)?;
                let (target, end) =
                    ref_body(bytes, after_bang).ok_or(LexError::InvalidReference(after_bang))?;
                pos = end;
                Token::Reference(Reference {
                    sheet: Some(sheet),
                    target,
                    prefix_len: after_bang - start,
                })
            },
            b'(' => {
                pos += 1;
                Token::LParen
            },
            b')' => {
                pos += 1;
                Token::RParen
            },
            b',' => {
                pos += 1;
                Token::Comma
            },
            b'<' | b'>' => {
                let next = bytes.get(pos + 1).copied();
                let (op, len) = match (c, next) {
                    (b'<', Some(b'=')) => (Operator::Le, 2),
                    (b'<', Some(b'>')) => (Operator::Ne, 2),
                    (b'<', _) => (Operator::Lt, 1),
                    (_, Some(b'=')) => (Operator::Ge, 2),
                    _ => (Operator::Gt, 1),
                };
                pos += len;
                Token::Operator(op)
            },
            b'+' | b'-' | b'*' | b'/' | b'^' | b'&' | b'=' | b'%' => {
                pos += 1;
                Token::Operator(match c {
                    b'+' => Operator::Add,
                    b'-' => Operator::Sub,
                    b'*' => Operator::Mul,
                    b'/' => Operator::Div,
                    b'^' => Operator::Pow,
                    b'&' => Operator::Concat,
                    b'=' => Operator::Eq,
                    _ => Operator::Percent,
                })
            },
            b'$' => {
                let (target, end) = ref_body(bytes, pos).ok_or(LexError::InvalidReference(pos))?;
                pos = end;
                Token::Reference(Reference {
                    sheet: None,
                    target,
                    prefix_len: 0,
                })
            },
            b'0'..=b'9' | b'.' => {
                if let Some((target, end)) = row_range(bytes, pos) {
                    pos = end;
                    Token::Reference(Reference {
                        sheet: None,
                        target,
                        prefix_len: 0,
                    })
                } else {
                    let (value, end) = lex_number(formula, pos)?;
                    pos = end;
                    Token::Number(value)
                }
            },
            _ => {
                let ident_end = scan_identifier(formula, pos);
                if ident_end == pos {
                    let ch = formula[pos..].chars().next().unwrap_or('\0');
                    return Err(LexError::Unexpected { ch, at: pos });
                }
                let ident = &formula[pos..ident_end];

                match bytes.get(ident_end) {
                    Some(b'!') => {
                        let body_start = ident_end + 1;
                        let (target, end) = ref_body(bytes, body_start)
                            .ok_or(LexError::InvalidReference(body_start))?;
                        pos = end;
                        Token::Reference(Reference {
                            sheet: Some(ident.to_string()),
                            target,
                            prefix_len: body_start - start,
                        })
                    },
                    Some(b'(') => {
                        pos = ident_end;
                        Token::Function(ident)
                    },
                    _ => {
                        if let Some((target, end)) = ref_body(bytes, pos) {
                            pos = end;
                            Token::Reference(Reference {
                                sheet: None,
                                target,
                                prefix_len: 0,
                            })
                        } else if ident.eq_ignore_ascii_case("TRUE") {
                            pos = ident_end;
                            Token::Bool(true)
                        } else if ident.eq_ignore_ascii_case("FALSE") {
                            pos = ident_end;
                            Token::Bool(false)
                        } else {
                            pos = ident_end;
                            Token::Name(ident)
                        }
                    },
                }
            },
        };

        tokens.push(Spanned {
            token,
            span: start..pos,
        });
    }

    Ok(tokens)
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '.' | '\\' | '$')
}

fn scan_identifier(formula: &str, start: usize) -> usize {
    let mut end = start;
    for (offset, ch) in formula[start..].char_indices() {
        if offset == 0 && !(ch.is_alphabetic() || ch == '_' || ch == '\\') {
            return start;
        }
        if !is_ident_char(ch) {
            break;
        }
        end = start + offset + ch.len_utf8();
    }
    end
}

fn lex_string(formula: &str, start: usize) -> Result<(String, usize), LexError> {
    let bytes = formula.as_bytes();
    let mut text = String::new();
    let mut pos = start + 1;
    let mut chunk_start = pos;

    while pos < bytes.len() {
        if bytes[pos] == b'"' {
            text.push_str(&formula[chunk_start..pos]);
            if bytes.get(pos + 1) == Some(&b'"') {
                text.push('"');
                pos += 2;
                chunk_start = pos;
                continue;
            }
            return Ok((text, pos + 1));
        }
        pos += 1;
    }

    Err(LexError::UnterminatedString(start))
}

/// Lex `'Sheet name'!`, returning the unescaped name and the offset after `!`.
fn lex_quoted_sheet(formula: &str, start: usize) -> Result<(String, usize), LexError> {
    let bytes = formula.as_bytes();
    let mut name = String::new();
    let mut pos = start + 1;
    let mut chunk_start = pos;

    while pos < bytes.len() {
        if bytes[pos] == b'\'' {
            name.push_str(&formula[chunk_start..pos]);
            if bytes.get(pos + 1) == Some(&b'\'') {
                name.push('\'');
                pos += 2;
                chunk_start = pos;
                continue;
            }
            return if bytes.get(pos + 1) == Some(&b'!') {
                Ok((name, pos + 2))
            } else {
                Err(LexError::Unexpected { ch: '\'', at: start })
            };
        }
        pos += 1;
    }

    Err(LexError::UnterminatedSheetName(start))
}

fn lex_number(formula: &str, start: usize) -> Result<(f64, usize), LexError> {
    let bytes = formula.as_bytes();
    let mut pos = start;

    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            pos = exp;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }

    let text = &formula[start..pos];
    fast_float2::parse::<f64, _>(text)
        .map(|value| (value, pos))
        .map_err(|_| LexError::Unexpected { ch: '.', at: start })
}

enum RefPart {
    Cell(CellRef),
    Column(LineRef),
    Row(LineRef),
}

/// Parse one side of a reference: `$A$1`, `$A` or `$1`.
fn ref_part(bytes: &[u8], start: usize) -> Option<(RefPart, usize)> {
    let mut pos = start;

    let col_abs = bytes.get(pos) == Some(&b'$');
    if col_abs {
        pos += 1;
    }
    let letters_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
        pos += 1;
    }
    let letters_end = pos;

    let row_abs = bytes.get(pos) == Some(&b'$');
    if row_abs {
        pos += 1;
    }
    let digits_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let digits_end = pos;

    let has_letters = letters_end > letters_start;
    let has_digits = digits_end > digits_start;

    match (has_letters, has_digits) {
        (true, true) => {
            let col = letters_to_column(&bytes[letters_start..letters_end])?;
            let row = parse_row_number(&bytes[digits_start..digits_end])?;
            Some((
                RefPart::Cell(CellRef {
                    row,
                    col,
                    row_abs,
                    col_abs,
                }),
                digits_end,
            ))
        },
        (true, false) if !row_abs => {
            let col = letters_to_column(&bytes[letters_start..letters_end])?;
            Some((
                RefPart::Column(LineRef {
                    index: col,
                    absolute: col_abs,
                }),
                letters_end,
            ))
        },
        (false, true) if !row_abs => {
            // A lone `$` before digits is the row marker.
            let row = parse_row_number(&bytes[digits_start..digits_end])?;
            Some((
                RefPart::Row(LineRef {
                    index: row,
                    absolute: col_abs,
                }),
                digits_end,
            ))
        },
        _ => None,
    }
}

fn at_boundary(bytes: &[u8], pos: usize) -> bool {
    match bytes.get(pos) {
        None => true,
        Some(&b) => !(b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'(' | b'$' | b'!') || b >= 0x80),
    }
}

/// Parse a complete reference body starting at `start`.
fn ref_body(bytes: &[u8], start: usize) -> Option<(RefTarget, usize)> {
    let (first, end) = ref_part(bytes, start)?;

    if bytes.get(end) == Some(&b':')
        && let Some((second, end2)) = ref_part(bytes, end + 1)
        && at_boundary(bytes, end2)
    {
        let target = match (first, second) {
            (RefPart::Cell(a), RefPart::Cell(b)) => RefTarget::Area(a, b),
            (RefPart::Column(a), RefPart::Column(b)) => RefTarget::Columns(a, b),
            (RefPart::Row(a), RefPart::Row(b)) => RefTarget::Rows(a, b),
            _ => return None,
        };
        return Some((target, end2));
    }

    match first {
        RefPart::Cell(cell) if at_boundary(bytes, end) => Some((RefTarget::Cell(cell), end)),
        _ => None,
    }
}

/// Whole-row ranges (`1:3`, `$2:$2`) start with a digit and would otherwise lex as numbers.
fn row_range(bytes: &[u8], start: usize) -> Option<(RefTarget, usize)> {
    if !bytes.get(start).is_some_and(u8::is_ascii_digit) {
        return None;
    }
    match ref_body(bytes, start)? {
        (target @ RefTarget::Rows(..), end) => Some((target, end)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(formula: &str) -> Vec<Token<'_>> {
        tokenize(formula)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_simple_expression() {
        let tokens = kinds("=A1+2.5*$B$2");
        assert_eq!(tokens.len(), 5);
        assert!(matches!(tokens[0], Token::Reference(_)));
        assert_eq!(tokens[1], Token::Operator(Operator::Add));
        assert_eq!(tokens[2], Token::Number(2.5));
        assert_eq!(tokens[3], Token::Operator(Operator::Mul));
    }

    #[test]
    fn test_function_and_area() {
        let tokens = kinds("SUM(A1:B10, 3)");
        assert_eq!(tokens[0], Token::Function("SUM"));
        assert_eq!(tokens[1], Token::LParen);
        match &tokens[2] {
            Token::Reference(r) => {
                assert!(r.sheet.is_none());
                assert_eq!(r.target.to_string(), "A1:B10");
            },
            other => panic!("expected reference, got {:?}", other),
        }
        assert_eq!(tokens[3], Token::Comma);
        assert_eq!(tokens[5], Token::RParen);
    }

    #[test]
    fn test_function_name_with_digits() {
        let tokens = kinds("LOG10(100)");
        assert_eq!(tokens[0], Token::Function("LOG10"));
    }

    #[test]
    fn test_sheet_prefixes() {
        let tokens = tokenize("'Q1 ''24'!C3+Data!A:A").unwrap();
        match &tokens[0].token {
            Token::Reference(r) => {
                assert_eq!(r.sheet.as_deref(), Some("Q1 '24"));
                assert_eq!(r.prefix_len, "'Q1 ''24'!".len());
            },
            other => panic!("unexpected {:?}", other),
        }
        match &tokens[2].token {
            Token::Reference(r) => {
                assert_eq!(r.sheet.as_deref(), Some("Data"));
                assert!(matches!(r.target, RefTarget::Columns(..)));
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_literals() {
        let tokens = kinds("IF(TRUE,\"say \"\"hi\"\"\",#N/A)");
        assert_eq!(tokens[2], Token::Bool(true));
        assert_eq!(tokens[4], Token::Text("say \"hi\"".to_string()));
        assert_eq!(tokens[6], Token::Error("#N/A"));
    }

    #[test]
    fn test_rows_and_numbers() {
        let tokens = kinds("SUM(2:4)+1.5E3%");
        assert!(matches!(
            tokens[2],
            Token::Reference(Reference {
                target: RefTarget::Rows(..),
                ..
            })
        ));
        assert_eq!(tokens[5], Token::Number(1500.0));
        assert_eq!(tokens[6], Token::Operator(Operator::Percent));
    }

    #[test]
    fn test_comparison_operators() {
        let tokens = kinds("A1<>B1");
        assert_eq!(tokens[1], Token::Operator(Operator::Ne));
        let tokens = kinds("A1>=1");
        assert_eq!(tokens[1], Token::Operator(Operator::Ge));
    }

    #[test]
    fn test_names_and_errors() {
        assert_eq!(kinds("Rate*2")[0], Token::Name("Rate"));
        assert!(tokenize("\"open").is_err());
        assert!(tokenize("{1,2}").is_err());
        assert!(tokenize("Table1[Col]").is_err());
    }
}
