//! Account commands: sign-in, registration, sign-out and the current identity.

use std::io::{self, IsTerminal};

use anyhow::anyhow;
use kintai_session::Credential;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::cli::{ConfirmArgs, EmailArgs, LoginArgs, OutputFormat, SignupArgs};
use crate::client::{AppContext, CliError, CliResult, classify_client_error};
use crate::output::render_session;
use crate::page::require_session;

static EMAIL_PATTERN: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"));

pub(crate) async fn handle_login(ctx: &AppContext, args: LoginArgs) -> CliResult<()> {
    let email = require_email(&args.email)?;
    let password = resolve_password(args.password)?;

    let token = ctx
        .identity
        .initiate_auth(email, &password)
        .await
        .map_err(classify_client_error)?;
    let credential = Credential::new(token)
        .ok_or_else(|| CliError::failure(anyhow!("identity service issued an empty token")))?;
    ctx.slot()
        .persist(&credential)
        .map_err(|err| CliError::failure(anyhow!("failed to store access token: {err}")))?;

    info!("signed in");
    println!("signed in as {email}");
    Ok(())
}

pub(crate) async fn handle_signup(ctx: &AppContext, args: SignupArgs) -> CliResult<()> {
    let email = require_email(&args.email)?;
    if !is_valid_email(email)? {
        return Err(CliError::validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    let password = resolve_password(args.password)?;

    let outcome = ctx
        .identity
        .sign_up(email, &password)
        .await
        .map_err(classify_client_error)?;

    if outcome.user_confirmed {
        println!("account {email} is ready; run `kintai login --email {email}`");
    } else {
        println!("confirmation code sent to {email}");
        println!("next: kintai confirm --email {email} --code <code>");
    }
    Ok(())
}

pub(crate) async fn handle_confirm(ctx: &AppContext, args: ConfirmArgs) -> CliResult<()> {
    let email = require_email(&args.email)?;
    let code = args.code.trim();
    if code.is_empty() {
        return Err(CliError::validation("confirmation code is required"));
    }

    ctx.identity
        .confirm_sign_up(email, code)
        .await
        .map_err(classify_client_error)?;
    println!("account {email} confirmed; run `kintai login --email {email}`");
    Ok(())
}

pub(crate) async fn handle_resend_code(ctx: &AppContext, args: EmailArgs) -> CliResult<()> {
    let email = require_email(&args.email)?;
    let destination = ctx
        .identity
        .resend_confirmation_code(email)
        .await
        .map_err(classify_client_error)?;
    match destination {
        Some(destination) => println!("confirmation code sent to {destination}"),
        None => println!("confirmation code sent"),
    }
    Ok(())
}

pub(crate) fn handle_logout(ctx: &AppContext) -> CliResult<()> {
    ctx.slot()
        .discard()
        .map_err(|err| CliError::failure(anyhow!("failed to remove access token: {err}")))?;
    info!("signed out");
    println!("signed out");
    Ok(())
}

pub(crate) async fn handle_whoami(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let session = require_session(ctx).await?;
    render_session(&session, format)
}

fn require_email(email: &str) -> CliResult<&str> {
    let email = email.trim();
    if email.is_empty() {
        Err(CliError::validation("email is required"))
    } else {
        Ok(email)
    }
}

fn is_valid_email(email: &str) -> CliResult<bool> {
    EMAIL_PATTERN
        .as_ref()
        .map(|pattern| pattern.is_match(email))
        .map_err(|err| CliError::failure(anyhow!("invalid email pattern: {err}")))
}

fn resolve_password(password: Option<String>) -> CliResult<String> {
    if let Some(password) = password.filter(|value| !value.is_empty()) {
        return Ok(password);
    }

    if io::stdin().is_terminal() {
        let password = rpassword::prompt_password("Password: ").map_err(|err| {
            CliError::failure(anyhow!("failed to read password from stdin: {err}"))
        })?;
        if password.is_empty() {
            return Err(CliError::validation("password cannot be empty"));
        }
        Ok(password)
    } else {
        Err(CliError::validation(
            "password required; pass --password or set KINTAI_PASSWORD when not on a terminal",
        ))
    }
}
