//! CLI command implementations

pub mod decrypt;
pub mod encrypt;
pub mod inspect;
mod progress;
mod sink;

pub use progress::BarProgress;
pub use sink::FileSink;

use std::path::Path;

use colored::Colorize;

use crate::crypto::{Credential, SecureBytes};
use crate::error::{AegisError, Result};
use crate::stream::{BatchReport, CancelToken};

/// Minimum password length for new containers
pub const MIN_PASSWORD_LEN: usize = 8;

/// Validate a new password and its confirmation
pub fn check_new_password(password: &str, confirm: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AegisError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    if password != confirm {
        return Err(AegisError::PasswordMismatch);
    }
    Ok(())
}

/// Prompt for a new password with confirmation
pub fn prompt_new_password() -> Result<String> {
    println!("{}", "Choose a password".cyan().bold());
    println!("Minimum length: {} characters\n", MIN_PASSWORD_LEN);

    loop {
        let password = rpassword::prompt_password("Password: ")?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            println!("{} {}", "Error:".red(), AegisError::PasswordTooShort(MIN_PASSWORD_LEN));
            continue;
        }

        let confirm = rpassword::prompt_password("Confirm password: ")?;
        match check_new_password(&password, &confirm) {
            Ok(()) => return Ok(password),
            Err(e) => println!("{} {}", "Error:".red(), e),
        }
    }
}

/// Prompt for an existing password
pub fn prompt_password() -> Result<String> {
    let password = rpassword::prompt_password("Password: ")?;
    Ok(password)
}

/// Password plus the keyfile at `keyfile`, if any
pub fn load_credential(password: String, keyfile: Option<&Path>) -> Result<Credential> {
    let credential = Credential::new(password);
    match keyfile {
        Some(path) => {
            let bytes = SecureBytes::new(std::fs::read(path)?);
            tracing::debug!(keyfile = %path.display(), "keyfile loaded");
            Ok(credential.with_keyfile(bytes))
        }
        None => Ok(credential),
    }
}

/// Collect the credential, and only then arm cancellation.
///
/// Until `arm` runs, Ctrl-C keeps its default meaning and ends a prompt.
pub fn credential_then_cancel<C, A>(collect: C, arm: A) -> Result<(Credential, CancelToken)>
where
    C: FnOnce() -> Result<Credential>,
    A: FnOnce() -> CancelToken,
{
    let credential = collect()?;
    Ok((credential, arm()))
}

/// Token cancelled by the first Ctrl-C
pub fn cancel_on_ctrl_c() -> CancelToken {
    let token = CancelToken::new();
    let signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            signal.cancel();
        }
    });
    token
}

/// Print one line per file and a summary
pub fn print_report(report: &BatchReport) {
    for outcome in &report.outcomes {
        let input = outcome.input.display();
        match (&outcome.result, &outcome.output) {
            (Ok(bytes), Some(output)) => {
                println!("{} {} -> {} ({} bytes)", "ok".green().bold(), input, output, bytes)
            }
            (Ok(_), None) => println!("{} {}", "ok".green().bold(), input),
            (Err(e), _) => println!("{} {}: {}", "failed".red().bold(), input, e),
        }
    }

    if report.cancelled {
        println!("{}", "Cancelled; remaining files were not processed.".yellow());
    }
    println!(
        "{} succeeded, {} failed",
        report.succeeded().to_string().green(),
        report.failed().to_string().red()
    );
}
