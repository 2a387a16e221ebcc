use std::path::PathBuf;

use async_trait::async_trait;
use clap::{Args, Subcommand};

use super::{build_client, repository_name, GlobalArgs, RunCommand};

#[derive(Subcommand, Debug)]
pub enum FileCommand {
    Write(FileWriteCommand),
    Read(FileReadCommand),
    Remove(FileRemoveCommand),
}

#[async_trait]
impl RunCommand for FileCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        match self {
            FileCommand::Write(cmd) => cmd.run(args).await,
            FileCommand::Read(cmd) => cmd.run(args).await,
            FileCommand::Remove(cmd) => cmd.run(args).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct FileWriteCommand {
    #[clap(long)]
    repository: Option<String>,

    #[clap(long)]
    workspace: String,

    /// Path of the file inside the workspace.
    #[clap(long)]
    path: String,

    /// Local file whose contents are uploaded.
    #[clap(long, conflicts_with = "contents")]
    source: Option<PathBuf>,

    /// Literal contents to upload instead of a local file.
    #[clap(long)]
    contents: Option<String>,
}

#[async_trait]
impl RunCommand for FileWriteCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        let (config, client) = build_client(args)?;
        let repository = repository_name(self.repository.as_deref(), &config)?;

        let contents: Vec<u8> = match (&self.source, &self.contents) {
            (Some(source), None) => std::fs::read(source)?,
            (None, Some(contents)) => contents.clone().into_bytes(),
            _ => anyhow::bail!("Pass exactly one of --source or --contents"),
        };

        client.write_file(&repository, &self.workspace, &self.path, contents).await?;

        println!("Wrote {}", self.path);

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct FileReadCommand {
    #[clap(long)]
    repository: Option<String>,

    #[clap(long)]
    workspace: String,

    #[clap(long)]
    path: String,

    /// Write the contents to a local file instead of stdout.
    #[clap(long)]
    output: Option<PathBuf>,
}

#[async_trait]
impl RunCommand for FileReadCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        let (config, client) = build_client(args)?;
        let repository = repository_name(self.repository.as_deref(), &config)?;
        let contents = client.read_file(&repository, &self.workspace, &self.path).await?;

        match &self.output {
            Some(output) => std::fs::write(output, contents)?,
            None => print!("{}", String::from_utf8_lossy(&contents)),
        }

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct FileRemoveCommand {
    #[clap(long)]
    repository: Option<String>,

    #[clap(long)]
    workspace: String,

    #[clap(long)]
    path: String,
}

#[async_trait]
impl RunCommand for FileRemoveCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        let (config, client) = build_client(args)?;
        let repository = repository_name(self.repository.as_deref(), &config)?;
        client.remove_file(&repository, &self.workspace, &self.path).await?;

        println!("Removed {}", self.path);

        Ok(())
    }
}
