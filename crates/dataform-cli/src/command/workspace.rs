use std::io::stdout;

use async_trait::async_trait;
use clap::{Args, Subcommand};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use crossterm::execute;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

use super::{build_client, repository_name, GlobalArgs, RunCommand};

#[derive(Subcommand, Debug)]
pub enum WorkspaceCommand {
    List(WorkspaceListCommand),
    Get(WorkspaceGetCommand),
    Create(WorkspaceCreateCommand),
    Delete(WorkspaceDeleteCommand),
}

#[async_trait]
impl RunCommand for WorkspaceCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        match self {
            WorkspaceCommand::List(cmd) => cmd.run(args).await,
            WorkspaceCommand::Get(cmd) => cmd.run(args).await,
            WorkspaceCommand::Create(cmd) => cmd.run(args).await,
            WorkspaceCommand::Delete(cmd) => cmd.run(args).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct WorkspaceListCommand {
    #[clap(long)]
    repository: Option<String>,
}

#[async_trait]
impl RunCommand for WorkspaceListCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        let (config, client) = build_client(args)?;
        let repository = repository_name(self.repository.as_deref(), &config)?;
        let workspaces = client.list_workspaces(&repository).await?;

        let mut table = Table::new();
        table.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS);
        table.set_header(vec!["Workspace"]);

        for workspace in workspaces {
            table.add_row(vec![workspace.name]);
        }

        println!("{table}");

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct WorkspaceGetCommand {
    #[clap(long)]
    repository: Option<String>,

    /// Workspace name (the last path segment, not the full resource path).
    name: String,
}

#[async_trait]
impl RunCommand for WorkspaceGetCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        let (config, client) = build_client(args)?;
        let repository = repository_name(self.repository.as_deref(), &config)?;
        let workspace = client.get_workspace(&repository, &self.name).await?;

        println!("{}", serde_json::to_string_pretty(&workspace)?);

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct WorkspaceCreateCommand {
    #[clap(long)]
    repository: Option<String>,

    name: String,
}

#[async_trait]
impl RunCommand for WorkspaceCreateCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        let (config, client) = build_client(args)?;
        let repository = repository_name(self.repository.as_deref(), &config)?;
        let workspace = client.create_workspace(&repository, &self.name).await?;

        execute!(
            stdout(),
            SetForegroundColor(Color::Green),
            Print(format!("✅ Workspace ready: {}\n", workspace.name)),
            ResetColor
        )?;

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct WorkspaceDeleteCommand {
    #[clap(long)]
    repository: Option<String>,

    name: String,
}

#[async_trait]
impl RunCommand for WorkspaceDeleteCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        let (config, client) = build_client(args)?;
        let repository = repository_name(self.repository.as_deref(), &config)?;
        client.delete_workspace(&repository, &self.name).await?;

        println!("Workspace `{}` deleted (or already absent)", self.name);

        Ok(())
    }
}
