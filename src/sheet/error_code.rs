//! Cell error values.

use std::fmt;

/// The seven error values a BIFF8 cell can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// `#NULL!`
    Null,
    /// `#DIV/0!`
    Div0,
    /// `#VALUE!`
    Value,
    /// `#REF!`
    Ref,
    /// `#NAME?`
    Name,
    /// `#NUM!`
    Num,
    /// `#N/A`
    NotAvailable,
}

impl ErrorCode {
    /// Parse the textual form (`#DIV/0!`), case-insensitive.
    pub fn from_text(text: &str) -> Option<Self> {
        let code = match text.trim().to_ascii_uppercase().as_str() {
            "#NULL!" => ErrorCode::Null,
            "#DIV/0!" => ErrorCode::Div0,
            "#VALUE!" => ErrorCode::Value,
            "#REF!" => ErrorCode::Ref,
            "#NAME?" => ErrorCode::Name,
            "#NUM!" => ErrorCode::Num,
            "#N/A" => ErrorCode::NotAvailable,
            _ => return None,
        };
        Some(code)
    }

    /// BIFF8 error byte.
    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            ErrorCode::Null => 0x00,
            ErrorCode::Div0 => 0x07,
            ErrorCode::Value => 0x0F,
            ErrorCode::Ref => 0x17,
            ErrorCode::Name => 0x1D,
            ErrorCode::Num => 0x24,
            ErrorCode::NotAvailable => 0x2A,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Null => "#NULL!",
            ErrorCode::Div0 => "#DIV/0!",
            ErrorCode::Value => "#VALUE!",
            ErrorCode::Ref => "#REF!",
            ErrorCode::Name => "#NAME?",
            ErrorCode::Num => "#NUM!",
            ErrorCode::NotAvailable => "#N/A",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorCode::from_text("#DIV/0!"), Some(ErrorCode::Div0));
        assert_eq!(ErrorCode::from_text("#n/a"), Some(ErrorCode::NotAvailable));
        assert_eq!(ErrorCode::from_text("#SPILL!"), None);
        assert_eq!(ErrorCode::Ref.code(), 0x17);
        assert_eq!(ErrorCode::NotAvailable.code(), 0x2A);
        assert_eq!(ErrorCode::Name.to_string(), "#NAME?");
    }
}
