//! Remote token service boundary.
//!
//! The workflow only needs three calls: `ListMFADevices` from IAM and
//! `GetSessionToken` / `AssumeRole` from STS. They sit behind [`TokenService`]
//! so the handle is built once in `main` and passed down explicitly.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use aws_config::Region;
use log::{debug, info};

use crate::{credentials::Credentials, request::IssuanceRequest};

/// A registered MFA device as reported by IAM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfaDevice {
    pub serial_number: String,
}

#[async_trait]
pub trait TokenService: Send + Sync {
    /// MFA devices of the calling user, in the order the service returns them.
    async fn list_mfa_devices(&self) -> Result<Vec<MfaDevice>>;

    /// Sends the request and returns the issued credentials.
    ///
    /// # Arguments
    /// * `request` - Session token or assume-role request. Its MFA serial and
    ///   code are sent only together.
    ///
    /// # Errors
    /// Returns the service's error, rendered with its code and message, or
    /// an error when the response carries no credentials.
    async fn issue(&self, request: &IssuanceRequest) -> Result<Credentials>;
}

/// [`TokenService`] backed by the AWS SDK clients.
pub struct AwsTokenService {
    iam: aws_sdk_iam::Client,
    sts: aws_sdk_sts::Client,
}

impl AwsTokenService {
    /// Loads SDK configuration from the ambient credential chain.
    pub async fn from_env(profile: Option<&str>, region: Option<&str>) -> Self {
        let mut loader = aws_config::from_env();
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let config = loader.load().await;
        debug!("Loaded AWS config - Region: {:?}", config.region());

        Self::new(
            aws_sdk_iam::Client::new(&config),
            aws_sdk_sts::Client::new(&config),
        )
    }

    pub fn new(iam: aws_sdk_iam::Client, sts: aws_sdk_sts::Client) -> Self {
        Self { iam, sts }
    }
}

#[async_trait]
impl TokenService for AwsTokenService {
    async fn list_mfa_devices(&self) -> Result<Vec<MfaDevice>> {
        let output = self
            .iam
            .list_mfa_devices()
            .send()
            .await
            .map_err(|e| anyhow!("{}", aws_sdk_iam::error::DisplayErrorContext(&e)))?;

        Ok(output
            .mfa_devices()
            .iter()
            .map(|device| MfaDevice {
                serial_number: device.serial_number().to_string(),
            })
            .collect())
    }

    async fn issue(&self, request: &IssuanceRequest) -> Result<Credentials> {
        let serial = request.mfa().map(|mfa| mfa.serial.clone());
        let code = request.mfa().map(|mfa| mfa.code.clone());

        let credentials = match request {
            IssuanceRequest::SessionToken { duration_seconds, .. } => {
                info!("Calling GetSessionToken - Duration: {duration_seconds}s");
                self.sts
                    .get_session_token()
                    .duration_seconds(*duration_seconds)
                    .set_serial_number(serial)
                    .set_token_code(code)
                    .send()
                    .await
                    .map_err(|e| anyhow!("{}", aws_sdk_sts::error::DisplayErrorContext(&e)))?
                    .credentials()
                    .map(Credentials::from)
            }
            IssuanceRequest::AssumeRole {
                role_arn,
                session_name,
                duration_seconds,
                ..
            } => {
                info!("Calling AssumeRole - Role: {role_arn}, Duration: {duration_seconds}s");
                self.sts
                    .assume_role()
                    .role_arn(role_arn)
                    .role_session_name(session_name)
                    .duration_seconds(*duration_seconds)
                    .set_serial_number(serial)
                    .set_token_code(code)
                    .send()
                    .await
                    .map_err(|e| anyhow!("{}", aws_sdk_sts::error::DisplayErrorContext(&e)))?
                    .credentials()
                    .map(Credentials::from)
            }
        };

        credentials.context("No credentials returned")
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_iam::operation::list_mfa_devices::ListMfaDevicesOutput;
    use aws_sdk_sts::{
        operation::{
            assume_role::AssumeRoleOutput, get_session_token::GetSessionTokenOutput,
        },
        types,
    };
    use aws_smithy_mocks::{Rule, mock, mock_client};
    use aws_smithy_types::DateTime;

    use super::*;
    use crate::request::MfaParams;

    fn sdk_credentials() -> types::Credentials {
        types::Credentials::builder()
            .access_key_id("ASIAEXAMPLE")
            .secret_access_key("secret")
            .session_token("token")
            .expiration(DateTime::from_secs(1_700_000_000))
            .build()
            .unwrap()
    }

    fn devices_rule(serials: &'static [&'static str]) -> Rule {
        mock!(aws_sdk_iam::Client::list_mfa_devices).then_output(move || {
            ListMfaDevicesOutput::builder()
                .set_mfa_devices(Some(
                    serials
                        .iter()
                        .map(|serial| {
                            aws_sdk_iam::types::MfaDevice::builder()
                                .user_name("operator")
                                .serial_number(*serial)
                                .enable_date(DateTime::from_secs(0))
                                .build()
                                .unwrap()
                        })
                        .collect(),
                ))
                .build()
                .unwrap()
        })
    }

    fn service(sts_rule: &Rule) -> AwsTokenService {
        let iam_rule = devices_rule(&[]);
        AwsTokenService::new(
            mock_client!(aws_sdk_iam, [&iam_rule]),
            mock_client!(aws_sdk_sts, [sts_rule]),
        )
    }

    #[tokio::test]
    async fn test_session_token_sends_mfa_pair_and_duration() {
        let rule = mock!(aws_sdk_sts::Client::get_session_token)
            .match_requests(|req| {
                req.serial_number() == Some("AAA")
                    && req.token_code() == Some("123456")
                    && req.duration_seconds() == Some(43_200)
            })
            .then_output(|| {
                GetSessionTokenOutput::builder()
                    .credentials(sdk_credentials())
                    .build()
            });

        let request = IssuanceRequest::session_token(
            0,
            Some(MfaParams {
                serial: "AAA".to_string(),
                code: "123456".to_string(),
            }),
        );
        let creds = service(&rule).issue(&request).await.unwrap();

        assert_eq!(rule.num_calls(), 1);
        assert_eq!(creds.access_key_id, "ASIAEXAMPLE");
        assert_eq!(creds.session_token, "token");
    }

    #[tokio::test]
    async fn test_session_token_without_mfa_sends_no_mfa_fields() {
        let rule = mock!(aws_sdk_sts::Client::get_session_token)
            .match_requests(|req| {
                req.serial_number().is_none()
                    && req.token_code().is_none()
                    && req.duration_seconds() == Some(900)
            })
            .then_output(|| {
                GetSessionTokenOutput::builder()
                    .credentials(sdk_credentials())
                    .build()
            });

        service(&rule)
            .issue(&IssuanceRequest::session_token(900, None))
            .await
            .unwrap();

        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_assume_role_sends_role_and_session_name() {
        let rule = mock!(aws_sdk_sts::Client::assume_role)
            .match_requests(|req| {
                req.role_arn() == Some("arn:aws:iam::123456789012:role/admin")
                    && req.role_session_name() == Some("ops")
                    && req.duration_seconds() == Some(3_600)
                    && req.serial_number() == Some("AAA")
                    && req.token_code() == Some("123456")
            })
            .then_output(|| {
                AssumeRoleOutput::builder()
                    .credentials(sdk_credentials())
                    .build()
            });

        let request = IssuanceRequest::assume_role(
            "arn:aws:iam::123456789012:role/admin",
            "ops",
            0,
            MfaParams::pair(Some("AAA"), Some("123456")),
        );
        let creds = service(&rule).issue(&request).await.unwrap();

        assert_eq!(rule.num_calls(), 1);
        assert_eq!(creds.secret_access_key, "secret");
    }

    #[tokio::test]
    async fn test_missing_credentials_in_response_is_error() {
        let rule = mock!(aws_sdk_sts::Client::get_session_token)
            .then_output(|| GetSessionTokenOutput::builder().build());

        let err = service(&rule)
            .issue(&IssuanceRequest::session_token(0, None))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "No credentials returned");
    }

    #[tokio::test]
    async fn test_list_mfa_devices_keeps_service_order() {
        let iam_rule = devices_rule(&["arn:aws:iam::1:mfa/a", "arn:aws:iam::1:mfa/b"]);
        let sts_rule = mock!(aws_sdk_sts::Client::get_session_token)
            .then_output(|| GetSessionTokenOutput::builder().build());
        let service = AwsTokenService::new(
            mock_client!(aws_sdk_iam, [&iam_rule]),
            mock_client!(aws_sdk_sts, [&sts_rule]),
        );

        let devices = service.list_mfa_devices().await.unwrap();

        assert_eq!(
            devices,
            vec![
                MfaDevice {
                    serial_number: "arn:aws:iam::1:mfa/a".to_string(),
                },
                MfaDevice {
                    serial_number: "arn:aws:iam::1:mfa/b".to_string(),
                },
            ]
        );
    }
}
