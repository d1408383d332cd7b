//! Keystore password lookup.

use dialoguer::{theme::ColorfulTheme, Password};
use std::io::{self, IsTerminal};

use crate::error::{CliError, CliResult};

/// Environment variable holding the keystore password.
pub const PASSWORD_ENV: &str = "PAYCH_PASSWORD";

/// Check if we're running in an interactive terminal.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal()
}

/// Prompt for a password (hidden input).
pub fn password(prompt: &str) -> io::Result<String> {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact()
        .map_err(|e| io::Error::other(e.to_string()))
}

/// Prompt for a new password with confirmation.
pub fn password_with_confirm(prompt: &str) -> io::Result<String> {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(|e| io::Error::other(e.to_string()))
}

/// Resolve the keystore password.
///
/// Order: `PAYCH_PASSWORD`, then a hidden prompt when stdin is a terminal.
/// `confirm` asks twice, for passwords that will encrypt a new key.
pub fn keystore_password(confirm: bool) -> CliResult<String> {
    resolve_password(std::env::var(PASSWORD_ENV).ok(), is_interactive(), || {
        if confirm {
            password_with_confirm("Keystore password")
        } else {
            password("Keystore password")
        }
    })
}

fn resolve_password(
    from_env: Option<String>,
    interactive: bool,
    ask: impl FnOnce() -> io::Result<String>,
) -> CliResult<String> {
    if let Some(password) = from_env {
        return Ok(password);
    }
    if interactive {
        return Ok(ask()?);
    }
    Err(CliError::PasswordRequired)
}
