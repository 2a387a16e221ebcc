use async_trait::async_trait;
use clap::{Args, Subcommand};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

use super::{build_client, repository_name, GlobalArgs, RunCommand};

#[derive(Subcommand, Debug)]
pub enum RepoCommand {
    List(RepoListCommand),
    Get(RepoGetCommand),
}

#[async_trait]
impl RunCommand for RepoCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        match self {
            RepoCommand::List(cmd) => cmd.run(args).await,
            RepoCommand::Get(cmd) => cmd.run(args).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct RepoListCommand {}

#[async_trait]
impl RunCommand for RepoListCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        let (_, client) = build_client(args)?;
        let repositories = client.list_repositories().await?;

        let mut table = Table::new();
        table.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS);
        table.set_header(vec!["Name", "Display name"]);

        for repository in repositories {
            table.add_row(vec![repository.name, repository.display_name.unwrap_or_default()]);
        }

        println!("{table}");

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct RepoGetCommand {
    #[clap(long)]
    repository: Option<String>,
}

#[async_trait]
impl RunCommand for RepoGetCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        let (config, client) = build_client(args)?;
        let repository = repository_name(self.repository.as_deref(), &config)?;
        let repository = client.get_repository(&repository).await?;

        println!("{}", serde_json::to_string_pretty(&repository)?);

        Ok(())
    }
}
