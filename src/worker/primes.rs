//! Prime extraction by discovery rank
//!
//! The primes workload is partitioned over the *rank* of each prime (2 has
//! rank 0, 3 has rank 1, ...), not over a numeric range. Which integers must
//! be scanned to reach rank `r` is unknown up front, so every worker scans
//! from 2 and counts primes until its own upper rank is reached.
//!
//! Workers owning later ranks therefore repeat the primality tests of every
//! earlier worker. The output is identical to a single sequential scan.

use crate::error::RunError;

/// Trial division up to `floor(sqrt(n))`
///
/// 0 and 1 are not prime.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut divisor = 2u64;
    // divisor <= n / divisor  <=>  divisor² <= n, without overflowing
    while divisor <= n / divisor {
        if n % divisor == 0 {
            return false;
        }
        divisor += 1;
    }
    true
}

/// Primes whose 0-based discovery rank lies in `[rank_start, rank_end)`
///
/// Scans candidates from 2 upward, stopping once `rank_end` primes have been
/// seen. The result is ascending.
///
/// # Errors
///
/// `InvalidConfig` if `rank_start > rank_end`.
///
/// # Example
///
/// ```
/// use rangefold::worker::primes::extract_prime_range;
///
/// assert_eq!(extract_prime_range(3, 6).unwrap(), vec![7, 11, 13]);
/// ```
pub fn extract_prime_range(rank_start: u64, rank_end: u64) -> Result<Vec<u64>, RunError> {
    if rank_start > rank_end {
        return Err(RunError::invalid(format!(
            "rank start {} exceeds rank end {}",
            rank_start, rank_end
        )));
    }

    let wanted = (rank_end - rank_start).min(1 << 20) as usize;
    let mut primes = Vec::with_capacity(wanted);
    let mut rank = 0u64;
    let mut candidate = 2u64;

    while rank < rank_end {
        if is_prime(candidate) {
            if rank >= rank_start {
                primes.push(candidate);
            }
            rank += 1;
        }
        candidate = candidate
            .checked_add(1)
            .ok_or_else(|| RunError::Overflow(format!("prime of rank {} exceeds u64", rank)))?;
    }

    Ok(primes)
}

/// The first `n` primes
pub fn generate_first_n_primes(n: u64) -> Result<Vec<u64>, RunError> {
    extract_prime_range(0, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::partition;

    #[test]
    fn test_is_prime() {
        let primes: Vec<u64> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(!is_prime(49));
        assert!(is_prime(7919));
    }

    #[test]
    fn test_is_prime_near_u64_max() {
        // 2^64 - 1 = 3 · 5 · 17 · 257 · 641 · 65537 · 6700417
        assert!(!is_prime(u64::MAX));
        assert!(!is_prime(u64::MAX - 1));
    }

    #[test]
    fn test_first_n_primes() {
        assert_eq!(generate_first_n_primes(0).unwrap(), Vec::<u64>::new());
        assert_eq!(generate_first_n_primes(1).unwrap(), vec![2]);
        assert_eq!(
            generate_first_n_primes(10).unwrap(),
            vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]
        );
    }

    #[test]
    fn test_extract_matches_first_n() {
        for n in [0u64, 1, 2, 25, 100] {
            assert_eq!(extract_prime_range(0, n).unwrap(), generate_first_n_primes(n).unwrap());
        }
    }

    #[test]
    fn test_extract_middle_ranks() {
        assert_eq!(extract_prime_range(6, 10).unwrap(), vec![17, 19, 23, 29]);
        assert_eq!(extract_prime_range(99, 100).unwrap(), vec![541]);
    }

    #[test]
    fn test_extract_empty_range() {
        assert!(extract_prime_range(7, 7).unwrap().is_empty());
    }

    #[test]
    fn test_extract_inverted_range_rejected() {
        assert!(matches!(
            extract_prime_range(5, 3),
            Err(RunError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_partitioned_ranks_reassemble() {
        for n in [10u64, 17, 100] {
            let expected = generate_first_n_primes(n).unwrap();
            for workers in 1..=7 {
                let mut all: Vec<u64> = partition(n, workers)
                    .unwrap()
                    .into_iter()
                    .flat_map(|r| extract_prime_range(r.start, r.end).unwrap())
                    .collect();
                all.sort_unstable();
                assert_eq!(all, expected, "n = {}, workers = {}", n, workers);
            }
        }
    }

    #[test]
    fn test_ten_over_three_workers() {
        let ranges = partition(10, 3).unwrap();
        let chunks: Vec<Vec<u64>> = ranges
            .iter()
            .map(|r| extract_prime_range(r.start, r.end).unwrap())
            .collect();
        assert_eq!(chunks[0], vec![2, 3, 5]);
        assert_eq!(chunks[1], vec![7, 11, 13]);
        assert_eq!(chunks[2], vec![17, 19, 23, 29]);
    }
}
