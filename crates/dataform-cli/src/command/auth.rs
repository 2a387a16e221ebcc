use std::io::stdout;

use async_trait::async_trait;
use clap::{Args, Subcommand};
use crossterm::execute;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

use crate::config::save_token;

use super::{GlobalArgs, RunCommand};

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    Login(LoginCommand),
}

#[async_trait]
impl RunCommand for AuthCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        match self {
            AuthCommand::Login(cmd) => cmd.run(args).await,
        }
    }
}

/// Stores an OAuth2 access token for the active profile. Token minting is out
/// of scope; obtain one with e.g. `gcloud auth print-access-token`.
#[derive(Args, Debug)]
pub struct LoginCommand {
    #[clap(long, env = "GOOGLE_OAUTH_ACCESS_TOKEN", hide_env_values = true)]
    token: String,
}

#[async_trait]
impl RunCommand for LoginCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        save_token(&args.profile, &self.token)?;

        execute!(
            stdout(),
            SetForegroundColor(Color::Green),
            Print(format!("✅ Token saved for profile `{}`\n", args.profile)),
            ResetColor
        )?;

        Ok(())
    }
}
