//! Temporary credential issuance.
//!
//! Both request shapes follow the same sequence: default the duration,
//! resolve the MFA serial when the caller gave none, prompt for a code when a
//! serial is in play, then send the request with the serial and code attached
//! only as a pair.

use std::io;

use log::info;
use thiserror::Error;

use crate::{
    client::TokenService,
    credentials::Credentials,
    mfa::SerialResolver,
    prompt::{CodePrompt, maybe_prompt_for_code},
    request::{IssuanceRequest, MfaParams, non_empty},
};

/// Missing assume-role inputs, detected before any remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("--role-arn and --role-session-name must be specified")]
    MissingRoleArnAndSessionName,
    #[error("--role-arn must be specified")]
    MissingRoleArn,
    #[error("--role-session-name must be specified")]
    MissingSessionName,
}

#[derive(Debug, Error)]
pub enum IssueError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to read token code")]
    Prompt(#[source] io::Error),
    #[error("{0}")]
    Remote(String),
}

/// Issues temporary credentials with an injected service handle, MFA serial
/// resolver and code prompt. Nothing is shared between invocations.
pub struct Issuer<'a> {
    client: &'a dyn TokenService,
    resolver: &'a SerialResolver,
    prompt: &'a dyn CodePrompt,
}

impl<'a> Issuer<'a> {
    pub fn new(
        client: &'a dyn TokenService,
        resolver: &'a SerialResolver,
        prompt: &'a dyn CodePrompt,
    ) -> Self {
        Self {
            client,
            resolver,
            prompt,
        }
    }

    /// Requests a session token for the calling user.
    ///
    /// # Arguments
    /// * `duration_seconds` - Credential lifetime; `0` means the 12 hour default
    /// * `serial` - MFA device serial; resolved through the [`SerialResolver`]
    ///   when absent or empty
    /// * `code` - MFA token code; prompted for when a serial is in play and
    ///   this is absent or empty
    ///
    /// # Returns
    /// * `Ok(Credentials)` - Freshly issued temporary credentials
    ///
    /// # Errors
    /// * [`IssueError::Prompt`] - Reading the token code from the operator failed
    /// * [`IssueError::Remote`] - The service rejected the request
    pub async fn issue_session_token(
        &self,
        duration_seconds: i32,
        serial: Option<&str>,
        code: Option<&str>,
    ) -> Result<Credentials, IssueError> {
        let mfa = self.mfa_params(serial, code).await?;
        self.send(IssuanceRequest::session_token(duration_seconds, mfa))
            .await
    }

    /// Requests credentials for `role_arn`.
    ///
    /// Both role inputs are validated before the MFA serial is resolved, so a
    /// validation failure never reaches the service or the prompt.
    ///
    /// # Arguments
    /// * `role_arn` - ARN of the role to assume (required)
    /// * `session_name` - Identifier for the role session (required)
    /// * `duration_seconds` - Credential lifetime; `0` means the 1 hour default
    /// * `serial` / `code` - As for [`Issuer::issue_session_token`]
    ///
    /// # Errors
    /// * [`IssueError::Validation`] - `role_arn` or `session_name` is missing
    /// * [`IssueError::Prompt`] - Reading the token code from the operator failed
    /// * [`IssueError::Remote`] - The service rejected the request
    pub async fn issue_assumed_role_credentials(
        &self,
        role_arn: Option<&str>,
        session_name: Option<&str>,
        duration_seconds: i32,
        serial: Option<&str>,
        code: Option<&str>,
    ) -> Result<Credentials, IssueError> {
        let (role_arn, session_name) = validate_role(role_arn, session_name)?;
        let mfa = self.mfa_params(serial, code).await?;
        self.send(IssuanceRequest::assume_role(
            role_arn,
            session_name,
            duration_seconds,
            mfa,
        ))
        .await
    }

    async fn mfa_params(
        &self,
        serial: Option<&str>,
        code: Option<&str>,
    ) -> Result<Option<MfaParams>, IssueError> {
        let serial = match non_empty(serial) {
            Some(serial) => Some(serial.to_string()),
            None => self.resolver.resolve_serial(self.client).await,
        };
        let code = maybe_prompt_for_code(self.prompt, serial.as_deref(), code)
            .map_err(IssueError::Prompt)?;
        Ok(MfaParams::pair(serial.as_deref(), code.as_deref()))
    }

    async fn send(&self, request: IssuanceRequest) -> Result<Credentials, IssueError> {
        match request.mfa() {
            Some(mfa) => info!(
                "Fetching credentials - Duration: {}s, MFA device: {}",
                request.duration_seconds(),
                mfa.serial
            ),
            None => info!(
                "Fetching credentials - Duration: {}s, no MFA",
                request.duration_seconds()
            ),
        }
        let credentials = self
            .client
            .issue(&request)
            .await
            .map_err(|e| IssueError::Remote(format!("{e:#}")))?;
        info!("Success! Credentials expire at: {}", credentials.expiration_timestamp());
        Ok(credentials)
    }
}

fn validate_role<'s>(
    role_arn: Option<&'s str>,
    session_name: Option<&'s str>,
) -> Result<(&'s str, &'s str), ValidationError> {
    match (non_empty(role_arn), non_empty(session_name)) {
        (Some(role_arn), Some(session_name)) => Ok((role_arn, session_name)),
        (None, None) => Err(ValidationError::MissingRoleArnAndSessionName),
        (None, Some(_)) => Err(ValidationError::MissingRoleArn),
        (Some(_), None) => Err(ValidationError::MissingSessionName),
    }
}
