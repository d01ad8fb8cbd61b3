//! rangefold-node - remote worker service for distributed runs

use rangefold::app;
use std::process::ExitCode;

fn main() -> ExitCode {
    app::run_node()
}
