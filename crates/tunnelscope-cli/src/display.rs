//! Display utilities for CLI output formatting

use colored::Colorize;
use tunnelscope::CredentialStatus;

/// Display a confirmation line
pub fn display_success(message: &str) {
    println!("{} {message}", "✓".bright_green());
}

/// Display an error on stderr
pub fn display_error(message: &str) {
    eprintln!("{} {message}", "Error:".bright_red());
}

/// Display the resolved TCP endpoint.
///
/// `plain` prints the bare `host:port` so the output can be piped.
pub fn display_endpoint(endpoint: &str, plain: bool) {
    if plain {
        println!("{endpoint}");
    } else {
        println!("{} {}", "TCP URL:".bright_cyan(), endpoint.bold());
    }
}

/// Display the credential state
pub fn display_status(status: CredentialStatus, input_locked: bool) {
    let label = match status {
        CredentialStatus::Stored => status.to_string().bright_green(),
        CredentialStatus::Validating => status.to_string().bright_yellow(),
        CredentialStatus::Absent => status.to_string().dimmed(),
    };

    let lock = if input_locked { "locked" } else { "editable" };
    println!("{} {label} ({lock})", "API Key:".bright_cyan());
}
