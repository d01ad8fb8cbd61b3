//! Configuration validation

use super::*;
use crate::partition::MAX_WORKERS;

/// Reject negative amounts
pub fn validate_amount(amount: i64) -> Result<u64, RunError> {
    u64::try_from(amount)
        .map_err(|_| RunError::invalid(format!("amount must be non-negative, got {}", amount)))
}

/// Require between one and [`MAX_WORKERS`] workers
pub fn validate_worker_count(worker_count: usize) -> Result<(), RunError> {
    if worker_count == 0 {
        return Err(RunError::invalid("workers must be at least 1"));
    }
    if worker_count > MAX_WORKERS {
        return Err(RunError::invalid(format!(
            "workers must be at most {}, got {}",
            MAX_WORKERS, worker_count
        )));
    }
    Ok(())
}

/// Require a non-zero bounded wait
pub fn validate_timeout(timeout: Duration) -> Result<(), RunError> {
    if timeout.is_zero() {
        return Err(RunError::invalid("timeout must be greater than zero"));
    }
    Ok(())
}

/// Validate file-backed settings
pub fn validate_settings(settings: &Settings) -> Result<(), RunError> {
    validate_worker_count(settings.workers)?;
    validate_timeout(settings.timeout())?;

    for addr in &settings.host_list {
        validate_host(addr)?;
    }

    Ok(())
}

/// A node address must look like `host:port`
fn validate_host(addr: &str) -> Result<(), RunError> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| RunError::invalid(format!("node address '{}' is missing a port", addr)))?;

    if host.is_empty() {
        return Err(RunError::invalid(format!("node address '{}' has an empty host", addr)));
    }
    port.parse::<u16>()
        .map_err(|_| RunError::invalid(format!("node address '{}' has an invalid port", addr)))?;

    Ok(())
}
