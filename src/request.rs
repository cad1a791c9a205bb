//! Request shapes sent to the token service.

/// Session token lifetime when the caller leaves the duration unset (12 hours).
pub const DEFAULT_SESSION_DURATION: i32 = 43_200;

/// Assumed role lifetime when the caller leaves the duration unset (1 hour).
pub const DEFAULT_ROLE_DURATION: i32 = 3_600;

/// MFA device serial paired with the code it currently displays.
///
/// A request holds these together or not at all, so a serial can never be
/// sent without its code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfaParams {
    pub serial: String,
    pub code: String,
}

impl MfaParams {
    /// Pairs a serial and a code, treating empty strings as absent.
    pub fn pair(serial: Option<&str>, code: Option<&str>) -> Option<Self> {
        match (non_empty(serial), non_empty(code)) {
            (Some(serial), Some(code)) => Some(Self {
                serial: serial.to_string(),
                code: code.to_string(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuanceRequest {
    SessionToken {
        duration_seconds: i32,
        mfa: Option<MfaParams>,
    },
    AssumeRole {
        role_arn: String,
        session_name: String,
        duration_seconds: i32,
        mfa: Option<MfaParams>,
    },
}

impl IssuanceRequest {
    pub fn session_token(duration_seconds: i32, mfa: Option<MfaParams>) -> Self {
        Self::SessionToken {
            duration_seconds: effective_duration(duration_seconds, DEFAULT_SESSION_DURATION),
            mfa,
        }
    }

    pub fn assume_role(
        role_arn: impl Into<String>,
        session_name: impl Into<String>,
        duration_seconds: i32,
        mfa: Option<MfaParams>,
    ) -> Self {
        Self::AssumeRole {
            role_arn: role_arn.into(),
            session_name: session_name.into(),
            duration_seconds: effective_duration(duration_seconds, DEFAULT_ROLE_DURATION),
            mfa,
        }
    }

    pub fn duration_seconds(&self) -> i32 {
        match self {
            Self::SessionToken { duration_seconds, .. } | Self::AssumeRole { duration_seconds, .. } => {
                *duration_seconds
            }
        }
    }

    pub fn mfa(&self) -> Option<&MfaParams> {
        match self {
            Self::SessionToken { mfa, .. } | Self::AssumeRole { mfa, .. } => mfa.as_ref(),
        }
    }
}

/// Zero means "unset", not a zero-second lifetime.
pub fn effective_duration(requested: i32, default: i32) -> i32 {
    if requested == 0 { default } else { requested }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_duration_uses_shape_default() {
        assert_eq!(IssuanceRequest::session_token(0, None).duration_seconds(), 43_200);
        assert_eq!(
            IssuanceRequest::assume_role("arn", "name", 0, None).duration_seconds(),
            3_600
        );
    }

    #[test]
    fn test_explicit_duration_is_kept() {
        assert_eq!(IssuanceRequest::session_token(900, None).duration_seconds(), 900);
        assert_eq!(
            IssuanceRequest::assume_role("arn", "name", 7_200, None).duration_seconds(),
            7_200
        );
    }

    #[test]
    fn test_mfa_pair_requires_both_halves() {
        assert_eq!(MfaParams::pair(Some("AAA"), None), None);
        assert_eq!(MfaParams::pair(None, Some("123456")), None);
        assert_eq!(MfaParams::pair(Some("AAA"), Some("")), None);
        assert_eq!(MfaParams::pair(Some(""), Some("123456")), None);
        assert_eq!(
            MfaParams::pair(Some("AAA"), Some("123456")),
            Some(MfaParams {
                serial: "AAA".to_string(),
                code: "123456".to_string(),
            })
        );
    }
}
