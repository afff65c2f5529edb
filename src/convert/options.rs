use std::path::PathBuf;

/// Configuration options for a conversion run.
///
/// # Examples
///
/// ```rust
/// use xlsdown::convert::ConvertOptions;
///
/// let options = ConvertOptions::new()
///     .with_output("out/legacy.xls")
///     .with_strict_formulas(true);
/// assert!(options.copy_comments);
/// ```
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Output path; derived from the input path when `None`
    pub output: Option<PathBuf>,
    /// Fail on formulas BIFF8 cannot express instead of keeping their cached value
    pub strict_formulas: bool,
    /// Whether to copy cell comments
    pub copy_comments: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            output: None,
            strict_formulas: false,
            copy_comments: true,
        }
    }
}

impl ConvertOptions {
    /// Create a new `ConvertOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the result to `path` instead of `<stem>.xls` next to the input.
    #[inline]
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    #[inline]
    pub fn with_strict_formulas(mut self, strict: bool) -> Self {
        self.strict_formulas = strict;
        self
    }

    #[inline]
    pub fn with_comments(mut self, copy: bool) -> Self {
        self.copy_comments = copy;
        self
    }
}
