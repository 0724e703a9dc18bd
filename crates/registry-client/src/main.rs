//! Interactive account creation against a running registration server.
//!
//! The password is sent in plaintext over the request; the server does the
//! hashing with whatever algorithm it is configured for.

use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Result, bail};
use dialoguer::Password;
use reqwest::StatusCode;
use tracing::debug;

use registry_types::json::encode_flat_object;
use registry_types::models::MAX_USERNAME_LEN;

const DEFAULT_REGISTER_URL: &str = "http://127.0.0.1:8585/register";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "registry_client=warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let url = std::env::var("REGISTRY_URL").unwrap_or_else(|_| DEFAULT_REGISTER_URL.into());

    let credentials = if io::stdin().is_terminal() {
        prompt_interactive(&mut io::stdin().lock())
    } else {
        prompt_credentials(&mut io::stdin().lock())
    };
    let (username, password) = match credentials {
        Ok(creds) => creds,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };

    debug!(%url, %username, "Sending registration");
    match call_register(&url, &username, &password).await {
        Ok((status, body)) => ExitCode::from(report(status, &username, &body)),
        Err(e) => {
            eprintln!("Failed to reach registration endpoint at {}: {}", url, e);
            ExitCode::from(2)
        }
    }
}

/// Terminal input: the password is read without echo.
fn prompt_interactive(input: &mut impl BufRead) -> Result<(String, String)> {
    let username = prompt(input, "Enter username: ")?.trim().to_string();
    check_username(&username)?;

    let password = Password::new().with_prompt("Enter password").interact()?;
    check_password(&password)?;
    Ok((username, password))
}

/// Piped input: username and password on consecutive lines.
fn prompt_credentials(input: &mut impl BufRead) -> Result<(String, String)> {
    let username = prompt(input, "Enter username: ")?.trim().to_string();
    check_username(&username)?;

    let password = prompt(input, "Enter password: ")?;
    let password = password.trim_end_matches(['\r', '\n']).to_string();
    check_password(&password)?;
    Ok((username, password))
}

fn check_username(username: &str) -> Result<()> {
    if username.is_empty() {
        bail!("Username cannot be empty.");
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        bail!("Username must be at most {} characters.", MAX_USERNAME_LEN);
    }
    if username.contains(',') {
        bail!("Username cannot contain commas.");
    }
    Ok(())
}

fn check_password(password: &str) -> Result<()> {
    if password.is_empty() {
        bail!("Password cannot be empty.");
    }
    // The server's flat-object decoder splits fields on commas
    if password.contains(',') {
        bail!("Password cannot contain commas.");
    }
    Ok(())
}

/// Request body in the form the server's flat-object decoder reads back
/// exactly.
fn register_body(username: &str, password: &str) -> String {
    encode_flat_object([("username", username), ("password", password)])
}

fn prompt(input: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line)
}

async fn call_register(url: &str, username: &str, password: &str) -> reqwest::Result<(StatusCode, String)> {
    let response = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(register_body(username, password))
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;
    Ok((status, text))
}

/// Print the outcome and return the process exit code.
fn report(status: StatusCode, username: &str, body: &str) -> u8 {
    match status {
        StatusCode::CREATED => {
            println!("Account \"{}\" created successfully.", username);
            0
        }
        StatusCode::CONFLICT => {
            eprintln!("Username already exists.");
            1
        }
        StatusCode::BAD_REQUEST => {
            eprintln!("Invalid request: {}", body);
            1
        }
        other => {
            eprintln!("Registration failed ({}): {}", other.as_u16(), body);
            3
        }
    }
}
