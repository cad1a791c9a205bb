//! Disposal of issued credentials: display, shell launch, both or neither.

use std::{env, io::Write, os::unix::process::CommandExt, process::Command};

use anyhow::{Context, Result, bail};
use log::info;

use crate::credentials::Credentials;

/// Environment variables set for a launched session.
pub type EnvOverlay = Vec<(&'static str, String)>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub hide: bool,
    pub shell: bool,
}

pub trait SessionLauncher {
    /// Starts a replacement interactive session with `overlay` applied on top
    /// of the current environment. Implementations that replace the process
    /// only return on failure.
    fn launch(&self, overlay: EnvOverlay) -> Result<()>;
}

/// Replaces the current process with the operator's `$SHELL`.
pub struct ShellLauncher;

impl SessionLauncher for ShellLauncher {
    fn launch(&self, overlay: EnvOverlay) -> Result<()> {
        let shell = env::var("SHELL").context("SHELL is not set")?;
        if shell.is_empty() {
            bail!("SHELL is empty");
        }
        info!("Replacing process with {shell}");

        let err = Command::new(&shell).envs(overlay).exec();
        Err(err).with_context(|| format!("Failed to start shell {shell}"))
    }
}

/// Variables a launched session needs to use `credentials`: access key id,
/// secret key and session token.
pub fn env_overlay(credentials: &Credentials) -> EnvOverlay {
    vec![
        ("AWS_ACCESS_KEY_ID", credentials.access_key_id.clone()),
        ("AWS_SECRET_ACCESS_KEY", credentials.secret_access_key.clone()),
        ("AWS_SESSION_TOKEN", credentials.session_token.clone()),
    ]
}

/// Disposes of freshly issued credentials.
///
/// The two flags are independent: the credential block is written unless
/// `hide` is set, and the shell is launched when `shell` is set. With
/// neither, the credentials are dropped.
///
/// # Arguments
/// * `credentials` - Credentials returned by the service
/// * `delivery` - The operator's `--hide` / `--shell` choices
/// * `out` - Destination of the credential block (stdout in production)
/// * `launcher` - Starts the replacement session
///
/// # Errors
/// Fails when writing to `out` fails or the launcher cannot start the
/// session. With [`ShellLauncher`] a successful launch never returns.
pub fn deliver(
    credentials: &Credentials,
    delivery: Delivery,
    out: &mut dyn Write,
    launcher: &dyn SessionLauncher,
) -> Result<()> {
    if !delivery.hide {
        writeln!(out, "{credentials}")?;
    }
    if delivery.shell {
        // Everything written must reach the terminal before the image is replaced.
        writeln!(out, "\nLaunching new shell with temporary credentials...")?;
        out.flush()?;
        launcher.launch(env_overlay(credentials))?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::RefCell;

    use super::*;

    /// Records overlays instead of replacing the process.
    #[derive(Default)]
    pub struct RecordingLauncher {
        pub launches: RefCell<Vec<EnvOverlay>>,
    }

    impl SessionLauncher for RecordingLauncher {
        fn launch(&self, overlay: EnvOverlay) -> Result<()> {
            self.launches.borrow_mut().push(overlay);
            Ok(())
        }
    }
}
