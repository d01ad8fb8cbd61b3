//! Output formatting
//!
//! - `text`: console lines (default)
//! - `json`: machine-readable report

pub mod json;
pub mod text;

use crate::config::OutputFormat;
use crate::coordinator::FinalResult;
use crate::Result;

/// Print a result in the selected format
pub fn print_result(result: &FinalResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => text::print_results(result),
        OutputFormat::Json => json::print_json(result)?,
    }
    Ok(())
}
