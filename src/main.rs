//! Security Token Service CLI
//!
//! Issues temporary AWS credentials, either a plain session token for the
//! calling user or credentials for an assumed role.
//!
//! The program performs the following operations:
//! 1. Parses command-line arguments and initializes logging
//! 2. Loads the AWS SDK configuration from the ambient credential chain
//! 3. Resolves the MFA device serial when none was given
//! 4. Prompts for the MFA token code when a device is in play
//! 5. Requests temporary credentials from STS
//! 6. Prints them and/or launches a shell with them in its environment

use std::{io, process::ExitCode};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

mod cli;
mod client;
mod commands;
mod credentials;
mod issuer;
mod mfa;
mod prompt;
mod request;
mod sink;

use cli::Cli;
use client::AwsTokenService;
use commands::Outcome;
use issuer::Issuer;
use mfa::SerialResolver;
use prompt::StdinPrompt;
use sink::ShellLauncher;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(Outcome::Issued) => ExitCode::SUCCESS,
        // Rejected issuances and unsupported commands are reported, not failed.
        Ok(outcome) => {
            println!("{outcome}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr. `-v` raises the level; `RUST_LOG` overrides it.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

async fn run(cli: Cli) -> Result<Outcome> {
    let Cli {
        profile,
        region,
        mfa_serial_from_config,
        command,
        ..
    } = cli;

    let client = AwsTokenService::from_env(profile.as_deref(), region.as_deref()).await;
    let mut resolver = SerialResolver::default_chain();
    if mfa_serial_from_config {
        resolver = resolver.with_config_profile(profile.as_deref());
    }
    let issuer = Issuer::new(&client, &resolver, &StdinPrompt);

    commands::execute(command, &issuer, &ShellLauncher, &mut io::stdout()).await
}
