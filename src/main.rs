//! Command-line front end: converts one `.xlsx` file into a `.xls` file.
//!
//! ```sh
//! xlsdown report.xlsx
//! xlsdown report.xlsx -o legacy/report.xls --strict-formulas
//! RUST_LOG=xlsdown=debug xlsdown report.xlsx
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use xlsdown::{ConvertOptions, WorkbookTranscoder};

/// Convert an Excel 2007+ workbook into an Excel 97-2003 workbook
#[derive(Parser, Debug)]
#[command(name = "xlsdown", version)]
struct Args {
    /// Workbook to convert (.xlsx)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file; defaults to the input path with a .xls extension
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Fail on formulas the XLS format cannot express instead of keeping their cached value
    #[arg(long)]
    strict_formulas: bool,

    /// Do not copy cell comments
    #[arg(long)]
    no_comments: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "xlsdown=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut options = ConvertOptions::new()
        .with_strict_formulas(args.strict_formulas)
        .with_comments(!args.no_comments);
    if let Some(output) = args.output {
        options = options.with_output(output);
    }

    let result = WorkbookTranscoder::with_options(&args.input, options)
        .and_then(|transcoder| transcoder.convert().map(|report| (transcoder, report)));
    match result {
        Ok((transcoder, report)) => {
            println!("{} -> {}: {}", args.input.display(), transcoder.output().display(), report);
        },
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        },
    }
}
