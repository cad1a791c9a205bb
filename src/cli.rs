//! Command-line interface definitions.

use clap::{ArgAction, Args, Parser, Subcommand};

/// Security Token Service.
///
/// Issues temporary AWS credentials for the calling user or an assumed role,
/// prompting for an MFA code when a device is configured. Credentials are
/// printed and/or injected into a new shell.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Named profile used to load long-term credentials
    #[arg(short, long, global = true, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Region for the STS endpoint
    #[arg(long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Also look up `mfa_serial` for the profile in the shared AWS config file
    /// when no device is registered and no MFA variable is set
    #[arg(long, global = true)]
    pub mfa_serial_from_config: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Return temporary credentials for an assumed role
    #[command(visible_alias = "ar")]
    AssumeRole(AssumeRoleArgs),

    /// Not yet implemented
    #[command(visible_alias = "arws")]
    AssumeRoleWithSaml,

    /// Not yet implemented
    #[command(visible_alias = "arwwi")]
    AssumeRoleWithWebIdentity,

    /// Not yet implemented
    #[command(visible_alias = "gft")]
    GetFederationToken,

    /// Return temporary credentials for a user
    #[command(visible_alias = "gst")]
    GetSessionToken(IssueArgs),
}

#[derive(Debug, Clone, Args)]
pub struct AssumeRoleArgs {
    /// ARN of the role being assumed
    #[arg(long)]
    pub role_arn: Option<String>,

    /// Identifier for the assumed role session
    #[arg(long)]
    pub role_session_name: Option<String>,

    #[command(flatten)]
    pub issue: IssueArgs,
}

#[derive(Debug, Clone, Default, Args)]
pub struct IssueArgs {
    /// How long the temporary credentials should remain valid (0 = default)
    #[arg(long, default_value_t = 0)]
    pub duration_seconds: i32,

    /// The MFA device identifier
    #[arg(long)]
    pub serial_number: Option<String>,

    /// The output generated by the MFA device
    #[arg(long)]
    pub token_code: Option<String>,

    /// Hide credentials
    #[arg(long)]
    pub hide: bool,

    /// Fork to a shell with credentials set in environment
    #[arg(short, long)]
    pub shell: bool,
}
