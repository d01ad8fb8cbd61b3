//! primes - the first `amount` prime numbers

use rangefold::app;
use rangefold::worker::Workload;
use std::process::ExitCode;

fn main() -> ExitCode {
    app::run_workload(Workload::Primes)
}
