//! About command handler.

use std::process::ExitCode;

use crate::output::ABOUT_TEXT;

pub fn run_about_command() -> ExitCode {
    println!("{ABOUT_TEXT}");
    ExitCode::SUCCESS
}
