//! Output rendering: pretty JSON on stdout.

use std::io::{self, Write};

use serde::Serialize;
use unifictl_api::{Data, Outcome};

use crate::error::CliError;

/// Pretty-print any serializable value, followed by a newline.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    let mut out = io::stdout().lock();
    writeln!(out, "{rendered}")?;
    Ok(())
}

/// Print `data` from an accepted reply, or turn a rejection into an error.
pub fn print_outcome(operation: &str, outcome: Outcome<Data>) -> Result<(), CliError> {
    match outcome {
        Outcome::Accepted(data) => print_json(&data),
        Outcome::Rejected { message } => Err(CliError::rejected(operation, message)),
    }
}

/// Report a boolean-convention command.
pub fn print_accepted(operation: &str, accepted: bool) -> Result<(), CliError> {
    if accepted {
        print_json(&serde_json::json!({ "operation": operation, "accepted": true }))
    } else {
        Err(CliError::rejected(operation, None))
    }
}
