//! Result reduction
//!
//! The reducer collects one [`PartialResult`] per worker, keyed by worker id,
//! and folds them into a [`ReducedValue`] once every worker has reported.
//!
//! - **Sum**: checked addition, independent of arrival order
//! - **Primes**: concatenation followed by an ascending sort, so the output is
//!   sorted even when partials arrive out of rank order
//!
//! # Example
//!
//! ```
//! use rangefold::reducer::{ReducedValue, Reducer};
//! use rangefold::worker::{PartialResult, Workload};
//!
//! let mut reducer = Reducer::new(Workload::Primes, 2);
//! reducer.add_partial(1, PartialResult::Primes(vec![7, 11])).unwrap();
//! reducer.add_partial(0, PartialResult::Primes(vec![2, 3, 5])).unwrap();
//!
//! assert_eq!(reducer.reduce().unwrap(), ReducedValue::Primes(vec![2, 3, 5, 7, 11]));
//! ```

use crate::error::RunError;
use crate::worker::{PartialResult, Workload};
use serde::Serialize;
use std::collections::BTreeMap;

/// Final reduced value of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReducedValue {
    /// Sum of squares; serialized as a decimal string since it may exceed 2^64
    Sum(#[serde(serialize_with = "serialize_u128_string")] u128),
    /// First N primes, ascending
    Primes(Vec<u64>),
}

fn serialize_u128_string<S: serde::Serializer>(value: &u128, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

impl From<PartialResult> for ReducedValue {
    fn from(partial: PartialResult) -> Self {
        match partial {
            PartialResult::Sum(sum) => ReducedValue::Sum(sum),
            PartialResult::Primes(mut primes) => {
                primes.sort_unstable();
                ReducedValue::Primes(primes)
            }
        }
    }
}

/// Barrier-side collector of partial results
///
/// Accepts exactly one partial per worker id in `0..expected`. Reduction is
/// refused until the set is complete.
#[derive(Debug)]
pub struct Reducer {
    workload: Workload,
    expected: usize,
    partials: BTreeMap<usize, PartialResult>,
}

impl Reducer {
    pub fn new(workload: Workload, expected: usize) -> Self {
        Self {
            workload,
            expected,
            partials: BTreeMap::new(),
        }
    }

    /// Record the partial result of one worker
    ///
    /// # Errors
    ///
    /// `WorkerFailure` if the id is out of range, already reported, or the
    /// partial belongs to another workload.
    pub fn add_partial(&mut self, worker_id: usize, partial: PartialResult) -> Result<(), RunError> {
        if worker_id >= self.expected {
            return Err(RunError::worker(
                worker_id,
                format!("unknown worker id (run has {} workers)", self.expected),
            ));
        }
        if partial.workload() != self.workload {
            return Err(RunError::worker(
                worker_id,
                format!(
                    "reported a {} partial for a {} run",
                    partial.workload(),
                    self.workload
                ),
            ));
        }
        if self.partials.contains_key(&worker_id) {
            return Err(RunError::worker(worker_id, "reported twice"));
        }
        self.partials.insert(worker_id, partial);
        Ok(())
    }

    pub fn num_received(&self) -> usize {
        self.partials.len()
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn is_complete(&self) -> bool {
        self.partials.len() == self.expected
    }

    /// Worker ids that have not reported yet, ascending
    pub fn missing(&self) -> Vec<usize> {
        (0..self.expected)
            .filter(|id| !self.partials.contains_key(id))
            .collect()
    }

    /// Fold all partials into the final value
    ///
    /// # Errors
    ///
    /// `WorkerFailure` naming the first missing worker when incomplete,
    /// `Overflow` when the sum does not fit.
    pub fn reduce(self) -> Result<ReducedValue, RunError> {
        if let Some(&first_missing) = self.missing().first() {
            return Err(RunError::worker(first_missing, "no partial result collected"));
        }

        let partials = self.partials.into_values();
        match self.workload {
            Workload::Squares => reduce_sum(partials.filter_map(|p| match p {
                PartialResult::Sum(sum) => Some(sum),
                PartialResult::Primes(_) => None,
            }))
            .map(ReducedValue::Sum),
            Workload::Primes => Ok(ReducedValue::Primes(reduce_primes(partials.filter_map(
                |p| match p {
                    PartialResult::Primes(primes) => Some(primes),
                    PartialResult::Sum(_) => None,
                },
            )))),
        }
    }
}

/// Add up partial sums
pub fn reduce_sum(partials: impl IntoIterator<Item = u128>) -> Result<u128, RunError> {
    partials.into_iter().try_fold(0u128, |acc, sum| {
        acc.checked_add(sum)
            .ok_or_else(|| RunError::Overflow("reduced sum exceeds u128".to_string()))
    })
}

/// Concatenate prime lists and sort ascending
pub fn reduce_primes(partials: impl IntoIterator<Item = Vec<u64>>) -> Vec<u64> {
    let mut all: Vec<u64> = partials.into_iter().flatten().collect();
    all.sort_unstable();
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reducer_new() {
        let reducer = Reducer::new(Workload::Squares, 3);
        assert_eq!(reducer.num_received(), 0);
        assert_eq!(reducer.expected(), 3);
        assert!(!reducer.is_complete());
        assert_eq!(reducer.missing(), vec![0, 1, 2]);
    }

    #[test]
    fn test_sum_order_independent() {
        let partials = [(0, 5u128), (1, 7), (2, 11)];

        let mut forward = Reducer::new(Workload::Squares, 3);
        for (id, sum) in partials {
            forward.add_partial(id, PartialResult::Sum(sum)).unwrap();
        }

        let mut backward = Reducer::new(Workload::Squares, 3);
        for (id, sum) in partials.into_iter().rev() {
            backward.add_partial(id, PartialResult::Sum(sum)).unwrap();
        }

        assert_eq!(forward.reduce().unwrap(), ReducedValue::Sum(23));
        assert_eq!(backward.reduce().unwrap(), ReducedValue::Sum(23));
    }

    #[test]
    fn test_primes_sorted_after_out_of_order_arrival() {
        let mut reducer = Reducer::new(Workload::Primes, 3);
        reducer.add_partial(2, PartialResult::Primes(vec![17, 19, 23, 29])).unwrap();
        reducer.add_partial(0, PartialResult::Primes(vec![2, 3, 5])).unwrap();
        reducer.add_partial(1, PartialResult::Primes(vec![7, 11, 13])).unwrap();

        assert_eq!(
            reducer.reduce().unwrap(),
            ReducedValue::Primes(vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29])
        );
    }

    #[test]
    fn test_neutral_partials_count_toward_completion() {
        let mut reducer = Reducer::new(Workload::Squares, 3);
        reducer.add_partial(0, Workload::Squares.neutral()).unwrap();
        reducer.add_partial(1, Workload::Squares.neutral()).unwrap();
        assert!(!reducer.is_complete());
        reducer.add_partial(2, PartialResult::Sum(5)).unwrap();
        assert!(reducer.is_complete());
        assert_eq!(reducer.reduce().unwrap(), ReducedValue::Sum(5));
    }

    #[test]
    fn test_incomplete_reduce_fails() {
        let mut reducer = Reducer::new(Workload::Squares, 2);
        reducer.add_partial(0, PartialResult::Sum(1)).unwrap();
        assert_eq!(reducer.missing(), vec![1]);
        assert!(matches!(
            reducer.reduce(),
            Err(RunError::WorkerFailure { worker_id: 1, .. })
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut reducer = Reducer::new(Workload::Squares, 2);
        reducer.add_partial(0, PartialResult::Sum(1)).unwrap();
        assert!(reducer.add_partial(0, PartialResult::Sum(1)).is_err());
        assert_eq!(reducer.num_received(), 1);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut reducer = Reducer::new(Workload::Primes, 2);
        assert!(reducer.add_partial(2, PartialResult::Primes(vec![])).is_err());
    }

    #[test]
    fn test_mismatched_workload_rejected() {
        let mut reducer = Reducer::new(Workload::Primes, 1);
        assert!(matches!(
            reducer.add_partial(0, PartialResult::Sum(4)),
            Err(RunError::WorkerFailure { worker_id: 0, .. })
        ));
    }

    #[test]
    fn test_reduce_sum_overflow() {
        assert!(matches!(
            reduce_sum([u128::MAX, 1]),
            Err(RunError::Overflow(_))
        ));
        assert_eq!(reduce_sum(Vec::new()).unwrap(), 0);
    }

    #[test]
    fn test_reduce_primes_empty() {
        assert!(reduce_primes(vec![vec![], vec![]]).is_empty());
    }

    #[test]
    fn test_reduced_value_json() {
        let big = ReducedValue::Sum(u128::from(u64::MAX) * 4);
        assert_eq!(
            serde_json::to_string(&big).unwrap(),
            "{\"sum\":\"73786976294838206460\"}"
        );
        let primes = ReducedValue::Primes(vec![2, 3]);
        assert_eq!(serde_json::to_string(&primes).unwrap(), "{\"primes\":[2,3]}");
    }
}
