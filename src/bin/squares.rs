//! squares - sum of squares over [0, amount)

use rangefold::app;
use rangefold::worker::Workload;
use std::process::ExitCode;

fn main() -> ExitCode {
    app::run_workload(Workload::Squares)
}
