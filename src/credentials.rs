use std::fmt;

use aws_sdk_sts::types;
use aws_smithy_types::{DateTime, date_time::Format};

/// Temporary credentials issued by STS.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime,
}

impl Credentials {
    /// Expiration rendered as an RFC 3339 timestamp.
    pub fn expiration_timestamp(&self) -> String {
        self.expiration
            .fmt(Format::DateTime)
            .unwrap_or_else(|_| self.expiration.secs().to_string())
    }
}

impl From<&types::Credentials> for Credentials {
    fn from(creds: &types::Credentials) -> Self {
        Self {
            access_key_id: creds.access_key_id().to_string(),
            secret_access_key: creds.secret_access_key().to_string(),
            session_token: creds.session_token().to_string(),
            expiration: *creds.expiration(),
        }
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\n===========\nCREDENTIALS\n===========\nAccessKeyId: {}\nSecretAccessKey: {}\nSessionToken: {}\nExpiration: {}",
            self.access_key_id,
            self.secret_access_key,
            self.session_token,
            self.expiration_timestamp(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_renders_credential_block() {
        let creds = Credentials {
            access_key_id: "ASIAEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: "token".to_string(),
            expiration: DateTime::from_secs(1_700_000_000),
        };

        assert_eq!(
            creds.to_string(),
            "\n===========\nCREDENTIALS\n===========\n\
             AccessKeyId: ASIAEXAMPLE\n\
             SecretAccessKey: secret\n\
             SessionToken: token\n\
             Expiration: 2023-11-14T22:13:20Z"
        );
    }

    #[test]
    fn test_from_sdk_credentials() {
        let sdk = types::Credentials::builder()
            .access_key_id("ASIAEXAMPLE")
            .secret_access_key("secret")
            .session_token("token")
            .expiration(DateTime::from_secs(1_700_000_000))
            .build()
            .unwrap();

        let creds = Credentials::from(&sdk);
        assert_eq!(creds.access_key_id, "ASIAEXAMPLE");
        assert_eq!(creds.secret_access_key, "secret");
        assert_eq!(creds.session_token, "token");
        assert_eq!(creds.expiration, DateTime::from_secs(1_700_000_000));
    }
}
