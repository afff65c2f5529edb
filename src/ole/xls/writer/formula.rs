//! XLS formula tokenization (RPN parsing)
//!
//! Converts SpreadsheetML formula text (`SUM(A1:B2)*2`) into the BIFF8 parsed
//! expression: a sequence of Ptg (Parse Thing) tokens in Reverse Polish
//! Notation.
//!
//! Parsing happens in two passes. A recursive descent parser builds a small
//! expression tree from the shared formula lexer, then the tree is emitted in
//! postfix order while operand classes (reference, value, array) are assigned
//! the way Excel expects them for each function parameter.
//!
//! # Example
//!
//! ```text
//! Formula: =A1+B1*2
//! Tokens: [PtgRef(A1), PtgRef(B1), PtgInt(2), PtgMul, PtgAdd]
//! ```
//!
//! Anything BIFF8 cannot express is rejected with
//! [`XlsError::InvalidFormula`]: functions newer than Excel 2003, defined
//! names, array constants, structured references and references outside the
//! 65536 x 256 grid.

mod functions;

pub use functions::{ArgClass, FunctionInfo};

use super::super::{XlsError, XlsResult};
use super::biff::BiffString;
use crate::sheet::lexer::Spanned;
use crate::sheet::{ErrorCode, Operator, RefTarget, Reference, Token, tokenize};

/// Last row index addressable in BIFF8
const MAX_BIFF_ROW: u32 = 0xFFFF;
/// Last column index addressable in BIFF8
const MAX_BIFF_COL: u32 = 0xFF;
/// Maximum number of arguments a PtgFuncVar can carry
const MAX_ARGS: usize = 30;

/// One corner of a cell or area reference, as stored in rgce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefOperand {
    pub row: u16,
    pub col: u16,
    pub row_relative: bool,
    pub col_relative: bool,
}

impl RefOperand {
    /// Column field with the relative-row (bit 15) and relative-column (bit 14) flags.
    fn col_field(&self) -> u16 {
        let mut field = self.col & 0x00FF;
        if self.col_relative {
            field |= 0x4000;
        }
        if self.row_relative {
            field |= 0x8000;
        }
        field
    }
}

/// Ptg (Parse Thing) token types
#[derive(Debug, Clone, PartialEq)]
pub enum Ptg {
    /// Integer constant
    PtgInt(u16),
    /// Number constant
    PtgNum(f64),
    /// String constant
    PtgStr(String),
    /// Boolean constant
    PtgBool(bool),
    /// Error constant
    PtgErr(ErrorCode),
    /// Cell reference
    PtgRef(RefOperand, ArgClass),
    /// Area reference (first corner, last corner)
    PtgArea(RefOperand, RefOperand, ArgClass),
    /// Cell reference on another sheet (EXTERNSHEET index)
    PtgRef3d(u16, RefOperand, ArgClass),
    /// Area reference on another sheet (EXTERNSHEET index)
    PtgArea3d(u16, RefOperand, RefOperand, ArgClass),
    PtgAdd,
    PtgSub,
    PtgMul,
    PtgDiv,
    PtgPower,
    PtgConcat,
    PtgLT,
    PtgLE,
    PtgEQ,
    PtgGE,
    PtgGT,
    PtgNE,
    PtgUplus,
    PtgUminus,
    PtgPercent,
    /// Fixed-arity function call (function index)
    PtgFunc(u16, ArgClass),
    /// Variable-arity function call (function index, arg count)
    PtgFuncVar(u16, u8, ArgClass),
    /// Parentheses
    PtgParen,
    /// Missing argument
    PtgMissArg,
}

impl Ptg {
    /// Whether the token references another sheet through EXTERNSHEET.
    pub fn is_3d(&self) -> bool {
        matches!(self, Ptg::PtgRef3d(..) | Ptg::PtgArea3d(..))
    }
}

/// Opcode offset for an operand class, added to the reference-class opcode.
#[inline]
fn class_offset(class: ArgClass) -> u8 {
    match class {
        ArgClass::Reference => 0x00,
        ArgClass::Value => 0x20,
        ArgClass::Array => 0x40,
    }
}

/// Expression tree produced by the parser.
#[derive(Debug)]
enum Node {
    Constant(Ptg),
    Reference {
        ixti: Option<u16>,
        first: RefOperand,
        last: Option<RefOperand>,
    },
    Unary(Ptg, Box<Node>),
    Binary(Ptg, Box<Node>, Box<Node>),
    Paren(Box<Node>),
    Call(&'static FunctionInfo, Vec<Node>),
    MissingArg,
}

/// Operand class requested by the enclosing expression.
#[derive(Debug, Clone, Copy)]
struct ClassContext {
    desired: ArgClass,
    force_array: bool,
}

impl ClassContext {
    const ROOT: Self = Self {
        desired: ArgClass::Value,
        force_array: false,
    };

    fn operand_class(self) -> ArgClass {
        match (self.force_array, self.desired) {
            (true, ArgClass::Reference) => ArgClass::Reference,
            (true, _) => ArgClass::Array,
            (false, class) => class,
        }
    }

    /// Operators and parentheses consume values, never references.
    fn through_operator(self) -> Self {
        Self {
            desired: match self.desired {
                ArgClass::Reference => ArgClass::Value,
                other => other,
            },
            force_array: self.force_array,
        }
    }

    /// Class of a function token and whether its arguments are forced to arrays.
    fn function_class(self, ret: ArgClass) -> (ArgClass, bool) {
        use ArgClass::{Array, Reference, Value};

        if self.force_array {
            return match ret {
                Reference if self.desired == Reference => (Reference, false),
                Reference | Array => (Array, false),
                Value => (Array, true),
            };
        }
        if ret == self.desired {
            return (ret, false);
        }
        match (self.desired, ret) {
            (Value, _) => (Value, false),
            (Array, Reference) => (Reference, false),
            (Array, _) => (Array, true),
            (Reference, other) => (other, false),
        }
    }
}

/// Formula tokenizer
///
/// Sheet names registered with [`FormulaTokenizer::with_sheets`] resolve
/// `Sheet!A1` references to 3D tokens whose EXTERNSHEET index equals the
/// sheet's position in the workbook.
#[derive(Debug, Clone, Default)]
pub struct FormulaTokenizer {
    sheets: Vec<String>,
}

impl FormulaTokenizer {
    /// Create a tokenizer that knows no sheets
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tokenizer resolving sheet-qualified references against `sheets`
    pub fn with_sheets<S: AsRef<str>>(sheets: &[S]) -> Self {
        Self {
            sheets: sheets.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    /// Tokenize a formula string into Ptg tokens in RPN order
    ///
    /// # Arguments
    ///
    /// * `formula` - Formula text, with or without a leading `=`
    pub fn tokenize(&self, formula: &str) -> XlsResult<Vec<Ptg>> {
        let tokens = tokenize(formula)?;
        let mut parser = Parser {
            tokenizer: self,
            formula,
            tokens,
            pos: 0,
        };

        if parser.tokens.is_empty() {
            return Err(parser.fail("empty formula"));
        }
        let tree = parser.comparison()?;
        if parser.pos < parser.tokens.len() {
            return Err(parser.fail("unexpected trailing input"));
        }

        let mut output = Vec::with_capacity(parser.tokens.len());
        emit(tree, ClassContext::ROOT, &mut output);
        Ok(output)
    }

    fn sheet_index(&self, name: &str) -> Option<u16> {
        self.sheets
            .iter()
            .position(|s| sheet_names_match(s, name))
            .and_then(|i| u16::try_from(i).ok())
    }
}

/// Sheet names compare case-insensitively in Excel.
pub(crate) fn sheet_names_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

struct Parser<'t, 'a> {
    tokenizer: &'t FormulaTokenizer,
    formula: &'a str,
    tokens: Vec<Spanned<'a>>,
    pos: usize,
}

impl<'a> Parser<'_, 'a> {
    fn fail(&self, reason: impl std::fmt::Display) -> XlsError {
        XlsError::InvalidFormula(format!("{}: {}", self.formula, reason))
    }

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_operator(&self) -> Option<Operator> {
        match self.peek() {
            Some(Token::Operator(op)) => Some(*op),
            _ => None,
        }
    }

    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).map(|t| t.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Parse one left-associative precedence level.
    fn binary_level(
        &mut self,
        operators: &[Operator],
        operand: fn(&mut Self) -> XlsResult<Node>,
    ) -> XlsResult<Node> {
        let mut left = operand(self)?;
        while let Some(op) = self.peek_operator().filter(|op| operators.contains(op)) {
            self.pos += 1;
            let right = operand(self)?;
            left = Node::Binary(binary_ptg(op), Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn comparison(&mut self) -> XlsResult<Node> {
        use Operator::{Eq, Ge, Gt, Le, Lt, Ne};
        self.binary_level(&[Eq, Ne, Lt, Le, Gt, Ge], Self::concat)
    }

    fn concat(&mut self) -> XlsResult<Node> {
        self.binary_level(&[Operator::Concat], Self::additive)
    }

    fn additive(&mut self) -> XlsResult<Node> {
        self.binary_level(&[Operator::Add, Operator::Sub], Self::multiplicative)
    }

    fn multiplicative(&mut self) -> XlsResult<Node> {
        self.binary_level(&[Operator::Mul, Operator::Div], Self::power)
    }

    fn power(&mut self) -> XlsResult<Node> {
        self.binary_level(&[Operator::Pow], Self::unary)
    }

    fn unary(&mut self) -> XlsResult<Node> {
        let ptg = match self.peek_operator() {
            Some(Operator::Add) => Ptg::PtgUplus,
            Some(Operator::Sub) => Ptg::PtgUminus,
            _ => return self.postfix(),
        };
        self.pos += 1;
        let operand = self.unary()?;
        Ok(Node::Unary(ptg, Box::new(operand)))
    }

    fn postfix(&mut self) -> XlsResult<Node> {
        let mut node = self.primary()?;
        while self.peek_operator() == Some(Operator::Percent) {
            self.pos += 1;
            node = Node::Unary(Ptg::PtgPercent, Box::new(node));
        }
        Ok(node)
    }

    fn primary(&mut self) -> XlsResult<Node> {
        let Some(token) = self.next() else {
            return Err(self.fail("unexpected end of formula"));
        };

        match token {
            Token::Number(value) => Ok(Node::Constant(number_ptg(value))),
            Token::Text(text) => {
                if text.encode_utf16().count() > 255 {
                    return Err(self.fail("string constant longer than 255 characters"));
                }
                Ok(Node::Constant(Ptg::PtgStr(text)))
            },
            Token::Bool(value) => Ok(Node::Constant(Ptg::PtgBool(value))),
            Token::Error(literal) => ErrorCode::from_text(literal)
                .map(|code| Node::Constant(Ptg::PtgErr(code)))
                .ok_or_else(|| self.fail(format_args!("unsupported error literal {literal}"))),
            Token::Reference(reference) => self.reference(&reference),
            Token::Function(name) => self.call(name),
            Token::LParen => {
                let inner = self.comparison()?;
                match self.next() {
                    Some(Token::RParen) => Ok(Node::Paren(Box::new(inner))),
                    _ => Err(self.fail("missing closing parenthesis")),
                }
            },
            Token::Name(name) => Err(self.fail(format_args!("defined name {name} is not supported"))),
            other => Err(self.fail(format_args!("unexpected token {other:?}"))),
        }
    }

    fn call(&mut self, name: &str) -> XlsResult<Node> {
        let info = functions::lookup(name)
            .ok_or_else(|| self.fail(format_args!("function {name} is not available in BIFF8")))?;

        if self.next() != Some(Token::LParen) {
            return Err(self.fail(format_args!("expected '(' after {name}")));
        }

        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
        } else {
            loop {
                if matches!(self.peek(), Some(Token::Comma | Token::RParen)) {
                    args.push(Node::MissingArg);
                } else {
                    args.push(self.comparison()?);
                }
                match self.next() {
                    Some(Token::Comma) => continue,
                    Some(Token::RParen) => break,
                    _ => return Err(self.fail(format_args!("unterminated call to {name}"))),
                }
            }
        }

        let argc = args.len();
        if argc < usize::from(info.min_args) || argc > usize::from(info.max_args) || argc > MAX_ARGS {
            return Err(self.fail(format_args!(
                "{name} takes {}..={} arguments, got {argc}",
                info.min_args, info.max_args
            )));
        }
        Ok(Node::Call(info, args))
    }

    fn reference(&self, reference: &Reference) -> XlsResult<Node> {
        let ixti = match &reference.sheet {
            Some(sheet) => Some(
                self.tokenizer
                    .sheet_index(sheet)
                    .ok_or_else(|| self.fail(format_args!("unknown sheet {sheet}")))?,
            ),
            None => None,
        };

        let out_of_grid = || self.fail(format_args!("{} is outside the 65536x256 grid", reference.target));
        let (first, last) = biff_corners(reference.target).ok_or_else(out_of_grid)?;
        Ok(Node::Reference { ixti, first, last })
    }
}

/// Convert a reference target to BIFF8 corners, normalizing reversed areas.
fn biff_corners(target: RefTarget) -> Option<(RefOperand, Option<RefOperand>)> {
    let row = |index: u32| u16::try_from(index).ok().filter(|_| index <= MAX_BIFF_ROW);
    let col = |index: u32| u16::try_from(index).ok().filter(|_| index <= MAX_BIFF_COL);

    // (index, relative) pairs for rows and columns of both corners
    let (rows, cols) = match target {
        RefTarget::Cell(c) => {
            return Some((
                RefOperand {
                    row: row(c.row)?,
                    col: col(c.col)?,
                    row_relative: !c.row_abs,
                    col_relative: !c.col_abs,
                },
                None,
            ));
        },
        RefTarget::Area(a, b) => (
            [(row(a.row)?, !a.row_abs), (row(b.row)?, !b.row_abs)],
            [(col(a.col)?, !a.col_abs), (col(b.col)?, !b.col_abs)],
        ),
        RefTarget::Columns(a, b) => (
            [(0, false), (MAX_BIFF_ROW as u16, false)],
            [(col(a.index)?, !a.absolute), (col(b.index)?, !b.absolute)],
        ),
        RefTarget::Rows(a, b) => (
            [(row(a.index)?, !a.absolute), (row(b.index)?, !b.absolute)],
            [(0, false), (MAX_BIFF_COL as u16, false)],
        ),
    };

    let [r1, r2] = if rows[0].0 > rows[1].0 { [rows[1], rows[0]] } else { rows };
    let [c1, c2] = if cols[0].0 > cols[1].0 { [cols[1], cols[0]] } else { cols };

    Some((
        RefOperand {
            row: r1.0,
            col: c1.0,
            row_relative: r1.1,
            col_relative: c1.1,
        },
        Some(RefOperand {
            row: r2.0,
            col: c2.0,
            row_relative: r2.1,
            col_relative: c2.1,
        }),
    ))
}

fn number_ptg(value: f64) -> Ptg {
    if value.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(&value) {
        Ptg::PtgInt(value as u16)
    } else {
        Ptg::PtgNum(value)
    }
}

fn binary_ptg(op: Operator) -> Ptg {
    match op {
        Operator::Add => Ptg::PtgAdd,
        Operator::Sub => Ptg::PtgSub,
        Operator::Mul => Ptg::PtgMul,
        Operator::Div => Ptg::PtgDiv,
        Operator::Pow => Ptg::PtgPower,
        Operator::Concat => Ptg::PtgConcat,
        Operator::Eq => Ptg::PtgEQ,
        Operator::Ne => Ptg::PtgNE,
        Operator::Lt => Ptg::PtgLT,
        Operator::Le => Ptg::PtgLE,
        Operator::Gt => Ptg::PtgGT,
        Operator::Ge => Ptg::PtgGE,
        Operator::Percent => Ptg::PtgPercent,
    }
}

/// Emit the tree in postfix order, assigning operand classes on the way down.
fn emit(node: Node, ctx: ClassContext, out: &mut Vec<Ptg>) {
    match node {
        Node::Constant(ptg) => out.push(ptg),
        Node::MissingArg => out.push(Ptg::PtgMissArg),
        Node::Reference { ixti, first, last } => {
            let class = ctx.operand_class();
            out.push(match (ixti, last) {
                (None, None) => Ptg::PtgRef(first, class),
                (None, Some(last)) => Ptg::PtgArea(first, last, class),
                (Some(ixti), None) => Ptg::PtgRef3d(ixti, first, class),
                (Some(ixti), Some(last)) => Ptg::PtgArea3d(ixti, first, last, class),
            });
        },
        Node::Unary(ptg, operand) => {
            emit(*operand, ctx.through_operator(), out);
            out.push(ptg);
        },
        Node::Binary(ptg, left, right) => {
            let operand_ctx = ctx.through_operator();
            emit(*left, operand_ctx, out);
            emit(*right, operand_ctx, out);
            out.push(ptg);
        },
        Node::Paren(inner) => {
            emit(*inner, ctx.through_operator(), out);
            out.push(Ptg::PtgParen);
        },
        Node::Call(info, args) => {
            let (class, force_array) = ctx.function_class(info.ret);
            let argc = args.len();
            for (position, arg) in args.into_iter().enumerate() {
                let arg_ctx = ClassContext {
                    desired: info.param_class(position),
                    force_array,
                };
                emit(arg, arg_ctx, out);
            }
            out.push(if info.is_fixed() {
                Ptg::PtgFunc(info.index, class)
            } else {
                Ptg::PtgFuncVar(info.index, argc as u8, class)
            });
        },
    }
}

/// Encode Ptg tokens to binary format for BIFF8
pub fn encode_ptg_tokens(tokens: &[Ptg]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(tokens.len() * 4);

    for token in tokens {
        match token {
            Ptg::PtgInt(val) => {
                bytes.push(0x1E);
                bytes.extend_from_slice(&val.to_le_bytes());
            },
            Ptg::PtgNum(val) => {
                bytes.push(0x1F);
                bytes.extend_from_slice(&val.to_le_bytes());
            },
            Ptg::PtgStr(s) => {
                bytes.push(0x17);
                BiffString::new(s).truncated(255).push_short(&mut bytes);
            },
            Ptg::PtgBool(val) => {
                bytes.push(0x1D);
                bytes.push(u8::from(*val));
            },
            Ptg::PtgErr(code) => {
                bytes.push(0x1C);
                bytes.push(code.code());
            },
            Ptg::PtgRef(cell, class) => {
                bytes.push(0x24 + class_offset(*class));
                push_cell(&mut bytes, cell);
            },
            Ptg::PtgArea(first, last, class) => {
                bytes.push(0x25 + class_offset(*class));
                push_area(&mut bytes, first, last);
            },
            Ptg::PtgRef3d(ixti, cell, class) => {
                bytes.push(0x3A + class_offset(*class));
                bytes.extend_from_slice(&ixti.to_le_bytes());
                push_cell(&mut bytes, cell);
            },
            Ptg::PtgArea3d(ixti, first, last, class) => {
                bytes.push(0x3B + class_offset(*class));
                bytes.extend_from_slice(&ixti.to_le_bytes());
                push_area(&mut bytes, first, last);
            },
            Ptg::PtgAdd => bytes.push(0x03),
            Ptg::PtgSub => bytes.push(0x04),
            Ptg::PtgMul => bytes.push(0x05),
            Ptg::PtgDiv => bytes.push(0x06),
            Ptg::PtgPower => bytes.push(0x07),
            Ptg::PtgConcat => bytes.push(0x08),
            Ptg::PtgLT => bytes.push(0x09),
            Ptg::PtgLE => bytes.push(0x0A),
            Ptg::PtgEQ => bytes.push(0x0B),
            Ptg::PtgGE => bytes.push(0x0C),
            Ptg::PtgGT => bytes.push(0x0D),
            Ptg::PtgNE => bytes.push(0x0E),
            Ptg::PtgUplus => bytes.push(0x12),
            Ptg::PtgUminus => bytes.push(0x13),
            Ptg::PtgPercent => bytes.push(0x14),
            Ptg::PtgFunc(index, class) => {
                bytes.push(0x21 + class_offset(*class));
                bytes.extend_from_slice(&index.to_le_bytes());
            },
            Ptg::PtgFuncVar(index, argc, class) => {
                bytes.push(0x22 + class_offset(*class));
                bytes.push(*argc);
                bytes.extend_from_slice(&index.to_le_bytes());
            },
            Ptg::PtgParen => bytes.push(0x15),
            Ptg::PtgMissArg => bytes.push(0x16),
        }
    }

    bytes
}

fn push_cell(bytes: &mut Vec<u8>, cell: &RefOperand) {
    bytes.extend_from_slice(&cell.row.to_le_bytes());
    bytes.extend_from_slice(&cell.col_field().to_le_bytes());
}

fn push_area(bytes: &mut Vec<u8>, first: &RefOperand, last: &RefOperand) {
    bytes.extend_from_slice(&first.row.to_le_bytes());
    bytes.extend_from_slice(&last.row.to_le_bytes());
    bytes.extend_from_slice(&first.col_field().to_le_bytes());
    bytes.extend_from_slice(&last.col_field().to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgce(formula: &str) -> Vec<u8> {
        let tokenizer = FormulaTokenizer::with_sheets(&["Data", "Summary"]);
        encode_ptg_tokens(&tokenizer.tokenize(formula).unwrap())
    }

    fn rejects(formula: &str) {
        let tokenizer = FormulaTokenizer::with_sheets(&["Data"]);
        let err = tokenizer.tokenize(formula).unwrap_err();
        assert!(matches!(err, XlsError::InvalidFormula(_)), "{formula}: {err:?}");
    }

    #[test]
    fn test_tokenize_precedence() {
        let tokenizer = FormulaTokenizer::new();
        let tokens = tokenizer.tokenize("=A1+B1*2").unwrap();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[2], Ptg::PtgInt(2));
        assert_eq!(tokens[3], Ptg::PtgMul);
        assert_eq!(tokens[4], Ptg::PtgAdd);

        assert_eq!(
            rgce("A1+B1*2"),
            vec![
                0x44, 0, 0, 0x00, 0xC0, // A1, value class, relative
                0x44, 0, 0, 0x01, 0xC0, // B1
                0x1E, 2, 0, 0x05, 0x03,
            ]
        );
    }

    #[test]
    fn test_left_associative_and_unary() {
        let tokenizer = FormulaTokenizer::new();
        assert_eq!(
            tokenizer.tokenize("10-4-3").unwrap(),
            vec![
                Ptg::PtgInt(10),
                Ptg::PtgInt(4),
                Ptg::PtgSub,
                Ptg::PtgInt(3),
                Ptg::PtgSub
            ]
        );
        assert_eq!(
            tokenizer.tokenize("-2^2").unwrap(),
            vec![Ptg::PtgInt(2), Ptg::PtgUminus, Ptg::PtgInt(2), Ptg::PtgPower]
        );
        assert_eq!(
            tokenizer.tokenize("50%").unwrap(),
            vec![Ptg::PtgInt(50), Ptg::PtgPercent]
        );
        assert_eq!(
            tokenizer.tokenize("(1+2)*3").unwrap(),
            vec![
                Ptg::PtgInt(1),
                Ptg::PtgInt(2),
                Ptg::PtgAdd,
                Ptg::PtgParen,
                Ptg::PtgInt(3),
                Ptg::PtgMul
            ]
        );
    }

    #[test]
    fn test_constants() {
        assert_eq!(rgce("1.5")[0], 0x1F);
        assert_eq!(&rgce("1.5")[1..], &1.5f64.to_le_bytes());
        assert_eq!(rgce("70000")[0], 0x1F);
        assert_eq!(rgce("\"ab\""), vec![0x17, 2, 0, b'a', b'b']);
        assert_eq!(rgce("TRUE"), vec![0x1D, 1]);
        assert_eq!(rgce("#DIV/0!"), vec![0x1C, 0x07]);
    }

    #[test]
    fn test_sum_area_is_reference_class() {
        assert_eq!(
            rgce("SUM(A1:B2)"),
            vec![
                0x25, 0, 0, 1, 0, 0x00, 0xC0, 0x01, 0xC0, // area, reference class
                0x42, 1, 4, 0, // FuncVar SUM, 1 arg
            ]
        );
    }

    #[test]
    fn test_fixed_arity_function() {
        assert_eq!(
            rgce("ROUND($C$3,2)"),
            vec![0x44, 2, 0, 2, 0x00, 0x1E, 2, 0, 0x41, 27, 0]
        );
        assert_eq!(rgce("PI()"), vec![0x41, 19, 0]);
    }

    #[test]
    fn test_missing_argument() {
        assert_eq!(
            rgce("IF(A1,,1)"),
            vec![0x44, 0, 0, 0, 0xC0, 0x16, 0x1E, 1, 0, 0x42, 3, 1, 0]
        );
    }

    #[test]
    fn test_reference_returning_function_in_reference_context() {
        let bytes = rgce("SUM(INDEX(A1:B2,1,1))");
        // INDEX is written with reference class under SUM
        assert_eq!(bytes[0], 0x25);
        assert_eq!(&bytes[15..19], &[0x22, 3, 29, 0]);
        assert_eq!(&bytes[19..], &[0x42, 1, 4, 0]);
    }

    #[test]
    fn test_operator_operands_are_values() {
        let bytes = rgce("SUM(A1+1)");
        assert_eq!(bytes[0], 0x44);
    }

    #[test]
    fn test_three_d_references() {
        let tokenizer = FormulaTokenizer::with_sheets(&["Data", "Summary"]);
        let tokens = tokenizer.tokenize("'summary'!B2+Data!A1:A3").unwrap();
        assert!(tokens.iter().any(Ptg::is_3d));
        let bytes = encode_ptg_tokens(&tokens);
        assert_eq!(&bytes[0..7], &[0x5A, 1, 0, 1, 0, 0x01, 0xC0]);
        assert_eq!(bytes[7], 0x5B);
        assert_eq!(&bytes[8..10], &[0, 0]);
    }

    #[test]
    fn test_whole_columns_and_rows() {
        assert_eq!(
            rgce("SUM(B:A)"),
            vec![0x25, 0, 0, 0xFF, 0xFF, 0x00, 0x40, 0x01, 0x40, 0x42, 1, 4, 0]
        );
        assert_eq!(
            rgce("SUM($2:3)"),
            vec![0x25, 1, 0, 2, 0, 0x00, 0x00, 0xFF, 0x80, 0x42, 1, 4, 0]
        );
    }

    #[test]
    fn test_reversed_area_is_normalized() {
        assert_eq!(
            &rgce("B2:A1")[..9],
            &[0x45, 0, 0, 1, 0, 0x00, 0xC0, 0x01, 0xC0]
        );
    }

    #[test]
    fn test_unsupported_formulas() {
        rejects("XLOOKUP(A1,B:B,C:C)");
        rejects("_xlfn.CONCAT(A1,B1)");
        rejects("SUM({1,2})");
        rejects("Table1[Col]");
        rejects("A1048576");
        rejects("SUM(IV1:IW1)");
        rejects("Missing!A1");
        rejects("myName*2");
        rejects("ROUND(1)");
        rejects("SUM(A1");
        rejects("1 2");
        rejects("#GETTING_DATA");
        rejects("");
    }
}
