//! Shared-formula expansion.
//!
//! A shared formula is stored once on its master cell and applied to every
//! other cell of its range by moving the relative references. This module
//! rewrites the reference tokens of the master text and leaves everything
//! else (spacing, function names, literals) untouched.

use super::lexer::{LexError, Token, tokenize};

/// Text written in place of a reference moved off the grid.
const REF_ERROR: &str = "#REF!";

/// Move every relative reference in `formula` by the given deltas.
///
/// Absolute parts (`$A`, `$1`) stay put. A reference pushed outside the
/// worksheet becomes `#REF!`, keeping its sheet prefix.
pub fn shift_formula(formula: &str, row_delta: i64, col_delta: i64) -> Result<String, LexError> {
    if row_delta == 0 && col_delta == 0 {
        return Ok(formula.to_string());
    }

    let tokens = tokenize(formula)?;
    let mut out = String::with_capacity(formula.len() + 8);
    let mut last = 0;

    for spanned in tokens {
        let Token::Reference(reference) = spanned.token else {
            continue;
        };
        let body_start = spanned.span.start + reference.prefix_len;

        out.push_str(&formula[last..body_start]);
        match reference.target.offset(row_delta, col_delta) {
            Some(moved) => out.push_str(&moved.to_string()),
            None => out.push_str(REF_ERROR),
        }
        last = spanned.span.end;
    }

    out.push_str(&formula[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_shift_relative_only() {
        assert_eq!(shift_formula("A1*2", 1, 0).unwrap(), "A2*2");
        assert_eq!(shift_formula("$A1+A$1", 2, 3).unwrap(), "$A3+D$1");
        assert_eq!(shift_formula("SUM($A$1:B2)", 4, 1).unwrap(), "SUM($A$1:C6)");
    }

    #[test]
    fn test_shift_keeps_text_and_prefixes() {
        assert_eq!(
            shift_formula("'My Data'!B2 & \"A1\"", 1, 0).unwrap(),
            "'My Data'!B3 & \"A1\""
        );
        assert_eq!(shift_formula("Other!A:A", 0, 2).unwrap(), "Other!C:C");
        assert_eq!(shift_formula("SUM(1:1)", 3, 0).unwrap(), "SUM(4:4)");
    }

    #[test]
    fn test_shift_off_grid() {
        assert_eq!(shift_formula("A1+1", -1, 0).unwrap(), "#REF!+1");
        assert_eq!(shift_formula("Data!A1", 0, -1).unwrap(), "Data!#REF!");
    }

    #[test]
    fn test_shift_zero_is_identity() {
        assert_eq!(shift_formula("=a1 + 1", 0, 0).unwrap(), "=a1 + 1");
    }

    proptest! {
        #[test]
        fn shift_there_and_back(row in 0u32..1000, col in 0u32..200, dr in 0i64..500, dc in 0i64..100) {
            let cell = super::super::reference::CellRef::new(row, col).to_string();
            let formula = format!("{}+1", cell);
            let moved = shift_formula(&formula, dr, dc).unwrap();
            let back = shift_formula(&moved, -dr, -dc).unwrap();
            prop_assert_eq!(back, formula);
        }
    }
}
