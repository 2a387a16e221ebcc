use async_trait::async_trait;
use clap::{Args, Subcommand};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

use crate::config::{has_profile, load_all, DataformConfig};

use super::{GlobalArgs, RunCommand};

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Add(ProfileAddCommand),
    List(ProfileListCommand),
}

#[async_trait]
impl RunCommand for ProfileCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        match self {
            ProfileCommand::Add(cmd) => cmd.run(args).await,
            ProfileCommand::List(cmd) => cmd.run(args).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ProfileAddCommand {
    /// Profile name.
    name: String,

    /// Google Cloud project ID.
    #[clap(long)]
    project: String,

    /// Dataform location, e.g. `us-east1`.
    #[clap(long)]
    location: String,

    /// Default repository for commands that take one.
    #[clap(long)]
    repository: Option<String>,
}

#[async_trait]
impl RunCommand for ProfileAddCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        if has_profile(&self.name, args.config.clone().map(Into::into)).unwrap_or(false) {
            anyhow::bail!("Profile `{}` already exists", self.name);
        }

        let config = DataformConfig::new(
            self.name.clone(),
            self.project.clone(),
            self.location.clone(),
            self.repository.clone(),
        );
        config.append()?;

        println!("Profile `{}` added", self.name);

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ProfileListCommand {}

#[async_trait]
impl RunCommand for ProfileListCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        let configs = load_all(args.config.clone().map(Into::into))?;

        let mut table = Table::new();
        table.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS);
        table.set_header(vec!["Profile", "Project", "Location", "Repository"]);

        for profile in configs.profiles {
            table.add_row(vec![
                profile.name,
                profile.project,
                profile.location,
                profile.repository.unwrap_or_default(),
            ]);
        }

        println!("{table}");

        Ok(())
    }
}
