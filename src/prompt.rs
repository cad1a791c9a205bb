//! Operator prompt for the MFA token code.

use std::io::{self, Write};

use crate::request::non_empty;

pub trait CodePrompt {
    /// Blocks until the operator enters a code for `serial`.
    fn read_code(&self, serial: &str) -> io::Result<String>;
}

/// Reads the code from standard input.
pub struct StdinPrompt;

impl CodePrompt for StdinPrompt {
    fn read_code(&self, _serial: &str) -> io::Result<String> {
        print!("Enter token value: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }
}

/// Asks for a code only when an MFA serial is in play and none was supplied.
///
/// # Arguments
/// * `prompt` - Source of the operator's code
/// * `serial` - Resolved MFA serial, if any
/// * `existing_code` - Code given on the command line, if any
///
/// # Returns
/// * `Ok(Some(code))` - The supplied code, or the one just entered
/// * `Ok(None)` - No code supplied and no serial to prompt for
///
/// # Errors
/// Returns the I/O error if reading the operator's input fails.
pub fn maybe_prompt_for_code(
    prompt: &dyn CodePrompt,
    serial: Option<&str>,
    existing_code: Option<&str>,
) -> io::Result<Option<String>> {
    match (non_empty(serial), non_empty(existing_code)) {
        (Some(serial), None) => prompt.read_code(serial).map(Some),
        (_, code) => Ok(code.map(str::to_string)),
    }
}
