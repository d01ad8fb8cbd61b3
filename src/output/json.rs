//! JSON output formatting
//!
//! One object per run, written to stdout:
//!
//! ```json
//! {
//!   "workload": "squares",
//!   "mode": "distributed",
//!   "amount": 1000,
//!   "workers": 4,
//!   "result": { "sum": "332833500" },
//!   "elapsed": { "micros": 812, "seconds": 0.000812 }
//! }
//! ```
//!
//! Sums are strings because they may exceed what JSON consumers can hold in
//! a double.

use crate::config::Mode;
use crate::coordinator::FinalResult;
use crate::reducer::ReducedValue;
use crate::worker::Workload;
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Duration with both microseconds and seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonDuration {
    pub micros: u64,
    pub seconds: f64,
}

impl JsonDuration {
    pub fn from_duration(d: Duration) -> Self {
        Self {
            micros: d.as_micros() as u64,
            seconds: d.as_secs_f64(),
        }
    }
}

/// Run report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonReport {
    pub workload: Workload,
    pub mode: Mode,
    pub amount: u64,
    pub workers: usize,
    pub result: ReducedValue,
    pub elapsed: JsonDuration,
}

impl From<&FinalResult> for JsonReport {
    fn from(result: &FinalResult) -> Self {
        Self {
            workload: result.workload,
            mode: result.mode,
            amount: result.total_work,
            workers: result.worker_count,
            result: result.value.clone(),
            elapsed: JsonDuration::from_duration(result.elapsed),
        }
    }
}

/// Pretty-printed JSON for a result
pub fn to_json(result: &FinalResult) -> Result<String> {
    serde_json::to_string_pretty(&JsonReport::from(result))
        .context("Failed to serialize JSON report")
}

/// Print the run result to stdout as JSON
pub fn print_json(result: &FinalResult) -> Result<()> {
    println!("{}", to_json(result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_report() {
        let result = FinalResult {
            mode: Mode::Distributed,
            workload: Workload::Squares,
            total_work: 10,
            worker_count: 3,
            value: ReducedValue::Sum(285),
            elapsed: Duration::from_millis(5),
        };

        let value: serde_json::Value = serde_json::from_str(&to_json(&result).unwrap()).unwrap();
        assert_eq!(value["workload"], "squares");
        assert_eq!(value["mode"], "distributed");
        assert_eq!(value["amount"], 10);
        assert_eq!(value["workers"], 3);
        assert_eq!(value["result"]["sum"], "285");
        assert_eq!(value["elapsed"]["micros"], 5000);
    }

    #[test]
    fn test_primes_report() {
        let result = FinalResult {
            mode: Mode::Single,
            workload: Workload::Primes,
            total_work: 3,
            worker_count: 1,
            value: ReducedValue::Primes(vec![2, 3, 5]),
            elapsed: Duration::ZERO,
        };

        let value: serde_json::Value = serde_json::from_str(&to_json(&result).unwrap()).unwrap();
        assert_eq!(value["result"]["primes"], serde_json::json!([2, 3, 5]));
    }
}
