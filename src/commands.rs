//! Dispatch from parsed commands to the issuance workflow.

use std::{fmt, io::Write};

use anyhow::Result;

use crate::{
    cli::{AssumeRoleArgs, Commands, IssueArgs},
    credentials::Credentials,
    issuer::{IssueError, Issuer},
    sink::{Delivery, SessionLauncher, deliver},
};

/// How a command ended when it did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Issued,
    NotSupported(&'static str),
    /// The service rejected the request; carries its message.
    IssuanceFailed(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issued => Ok(()),
            Self::NotSupported(command) => write!(f, "{command}: not implemented"),
            Self::IssuanceFailed(message) => f.write_str(message),
        }
    }
}

impl From<&IssueArgs> for Delivery {
    fn from(args: &IssueArgs) -> Self {
        Self {
            hide: args.hide,
            shell: args.shell,
        }
    }
}

/// Runs `command` through the issuer and delivers the result.
///
/// # Returns
/// * `Ok(Outcome::Issued)` - Credentials were issued and delivered
/// * `Ok(Outcome::NotSupported(_))` - The command is declared but not implemented
/// * `Ok(Outcome::IssuanceFailed(_))` - The service rejected the request; the
///   message is reported but the command does not fail
///
/// # Errors
/// Validation failures, prompt read failures and shell launch failures.
pub async fn execute(
    command: Commands,
    issuer: &Issuer<'_>,
    launcher: &dyn SessionLauncher,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let (issued, args) = match command {
        Commands::GetSessionToken(args) => {
            let issued = issuer
                .issue_session_token(
                    args.duration_seconds,
                    args.serial_number.as_deref(),
                    args.token_code.as_deref(),
                )
                .await;
            (issued, args)
        }
        Commands::AssumeRole(AssumeRoleArgs {
            role_arn,
            role_session_name,
            issue: args,
        }) => {
            let issued = issuer
                .issue_assumed_role_credentials(
                    role_arn.as_deref(),
                    role_session_name.as_deref(),
                    args.duration_seconds,
                    args.serial_number.as_deref(),
                    args.token_code.as_deref(),
                )
                .await;
            (issued, args)
        }
        Commands::AssumeRoleWithSaml => return Ok(Outcome::NotSupported("assume-role-with-saml")),
        Commands::AssumeRoleWithWebIdentity => {
            return Ok(Outcome::NotSupported("assume-role-with-web-identity"));
        }
        Commands::GetFederationToken => return Ok(Outcome::NotSupported("get-federation-token")),
    };

    dispose(issued, Delivery::from(&args), launcher, out)
}

fn dispose(
    issued: Result<Credentials, IssueError>,
    delivery: Delivery,
    launcher: &dyn SessionLauncher,
    out: &mut dyn Write,
) -> Result<Outcome> {
    match issued {
        Ok(credentials) => {
            deliver(&credentials, delivery, out, launcher)?;
            Ok(Outcome::Issued)
        }
        Err(IssueError::Remote(message)) => Ok(Outcome::IssuanceFailed(message)),
        Err(e) => Err(e.into()),
    }
}
