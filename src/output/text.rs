//! Human-readable text output

use crate::config::Mode;
use crate::coordinator::FinalResult;
use crate::reducer::ReducedValue;
use std::time::Duration;

/// Print the run result to stdout
pub fn print_results(result: &FinalResult) {
    println!("{}", format_results(result));
}

/// Console lines for a result (no trailing newline)
///
/// ```text
/// [Single Machine] Result: 332833500, Time: 0.0001 seconds
///
/// [Distributed] First 5 primes: [2, 3, 5, 7, 11]
/// Time: 0.0012 seconds
/// ```
pub fn format_results(result: &FinalResult) -> String {
    let label = mode_label(result.mode);
    let time = format_seconds(result.elapsed);

    match result.value {
        ReducedValue::Sum(sum) => {
            format!("{} Result: {}, Time: {} seconds", label, sum, time)
        }
        ReducedValue::Primes(ref primes) => {
            format!(
                "{} First {} primes: {}\nTime: {} seconds",
                label,
                result.total_work,
                format_list(primes),
                time
            )
        }
    }
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Single => "[Single Machine]",
        Mode::Distributed => "[Distributed]",
    }
}

/// Seconds with four decimals
fn format_seconds(d: Duration) -> String {
    format!("{:.4}", d.as_secs_f64())
}

fn format_list(values: &[u64]) -> String {
    let items: Vec<String> = values.iter().map(u64::to_string).collect();
    format!("[{}]", items.join(", "))
}
