//! MFA device serial resolution.
//!
//! Strategies are tried in order and the first one that yields a serial wins.
//! A strategy that cannot produce a value is "unavailable": the reason is
//! logged at debug level and the next strategy runs. Running out of
//! strategies means no MFA, which is not an error.

use std::{env, path::PathBuf};

use configparser::ini::Ini;
use log::debug;

use crate::client::TokenService;

/// Primary environment variable carrying a fallback MFA serial.
pub const MFA_DEVICE_ENV: &str = "AWS_MFA_DEVICE";

/// Secondary alias for [`MFA_DEVICE_ENV`].
pub const MFA_DEVICE_ENV_ALIAS: &str = "MFA_DEVICE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialStrategy {
    /// First device returned by `ListMFADevices`. Any further devices are
    /// ignored; accounts with several devices get whichever IAM lists first.
    RegisteredDevice,
    /// Value of an environment variable.
    Environment(&'static str),
    /// `mfa_serial` of a profile in the shared AWS config file.
    ConfigProfile { path: PathBuf, profile: String },
}

impl SerialStrategy {
    async fn resolve(&self, client: &dyn TokenService) -> Option<String> {
        let serial = match self {
            Self::RegisteredDevice => match client.list_mfa_devices().await {
                Ok(devices) => {
                    let serial = devices.into_iter().next().map(|d| d.serial_number);
                    if serial.is_none() {
                        debug!("No MFA devices registered for the caller");
                    }
                    serial
                }
                Err(e) => {
                    debug!("Listing MFA devices failed: {e:#}");
                    None
                }
            },
            Self::Environment(name) => match env::var(name) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("{name} not usable: {e}");
                    None
                }
            },
            Self::ConfigProfile { path, profile } => {
                let mut ini = Ini::new_cs();
                if let Err(e) = ini.load(path) {
                    debug!("Could not read {}: {e}", path.display());
                    return None;
                }
                let section = if profile == "default" {
                    profile.clone()
                } else {
                    format!("profile {profile}")
                };
                let serial = ini.get(&section, "mfa_serial");
                if serial.is_none() {
                    debug!("No mfa_serial in [{section}] of {}", path.display());
                }
                serial
            }
        };
        serial.filter(|serial| !serial.is_empty())
    }
}

/// Ordered chain of [`SerialStrategy`] values.
#[derive(Debug, Clone)]
pub struct SerialResolver {
    strategies: Vec<SerialStrategy>,
}

impl SerialResolver {
    pub fn new(strategies: Vec<SerialStrategy>) -> Self {
        Self { strategies }
    }

    /// Registered device, then [`MFA_DEVICE_ENV`], then [`MFA_DEVICE_ENV_ALIAS`].
    pub fn default_chain() -> Self {
        Self::new(vec![
            SerialStrategy::RegisteredDevice,
            SerialStrategy::Environment(MFA_DEVICE_ENV),
            SerialStrategy::Environment(MFA_DEVICE_ENV_ALIAS),
        ])
    }

    /// Appends a lookup of `mfa_serial` for `profile` in the shared AWS
    /// config file, after every other strategy.
    ///
    /// Only used when the operator opts in with `--mfa-serial-from-config`.
    /// Leaves the chain unchanged when the file location cannot be
    /// determined.
    pub fn with_config_profile(mut self, profile: Option<&str>) -> Self {
        if let Some(path) = shared_config_path() {
            self.strategies.push(SerialStrategy::ConfigProfile {
                path,
                profile: profile.unwrap_or("default").to_string(),
            });
        }
        self
    }

    /// Resolves the MFA device serial to present with the request.
    ///
    /// Each strategy is tried in order and the first non-empty serial wins.
    /// Strategy failures (denied `ListMFADevices`, no devices, unset
    /// variables, unreadable config) are logged at debug level and never
    /// surface to the caller.
    ///
    /// # Arguments
    /// * `client` - Service handle used by [`SerialStrategy::RegisteredDevice`]
    ///
    /// # Returns
    /// * `Some(serial)` - The first serial any strategy produced
    /// * `None` - No MFA is available; the request goes out without MFA
    pub async fn resolve_serial(&self, client: &dyn TokenService) -> Option<String> {
        for strategy in &self.strategies {
            if let Some(serial) = strategy.resolve(client).await {
                debug!("Resolved MFA serial via {strategy:?}");
                return Some(serial);
            }
        }
        debug!("No MFA serial available");
        None
    }
}

/// `$AWS_CONFIG_FILE`, else `~/.aws/config`.
fn shared_config_path() -> Option<PathBuf> {
    env::var_os("AWS_CONFIG_FILE")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|d| d.join(".aws").join("config")))
}
