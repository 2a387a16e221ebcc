use async_trait::async_trait;
use clap::{Args, Subcommand};
use dataform_client::CommitAuthor;

use super::{build_client, repository_name, GlobalArgs, RunCommand};

#[derive(Subcommand, Debug)]
pub enum GitCommand {
    Pull(GitPullCommand),
    Push(GitPushCommand),
    Reset(GitResetCommand),
}

#[async_trait]
impl RunCommand for GitCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        match self {
            GitCommand::Pull(cmd) => cmd.run(args).await,
            GitCommand::Push(cmd) => cmd.run(args).await,
            GitCommand::Reset(cmd) => cmd.run(args).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct GitPullCommand {
    #[clap(long)]
    repository: Option<String>,

    #[clap(long)]
    workspace: String,

    /// Author name recorded on any merge commit.
    #[clap(long)]
    author_name: String,

    /// Author email recorded on any merge commit.
    #[clap(long)]
    author_email: String,

    /// Remote branch to pull from. Defaults to the workspace's branch.
    #[clap(long, default_value = "")]
    remote_branch: String,
}

#[async_trait]
impl RunCommand for GitPullCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        let (config, client) = build_client(args)?;
        let repository = repository_name(self.repository.as_deref(), &config)?;
        let author = CommitAuthor { name: self.author_name.clone(), email_address: self.author_email.clone() };

        client.pull_git_commits(&repository, &self.workspace, &author, &self.remote_branch).await?;

        println!("Pulled commits into workspace `{}`", self.workspace);

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct GitPushCommand {
    #[clap(long)]
    repository: Option<String>,

    #[clap(long)]
    workspace: String,

    /// Remote branch to push to. Defaults to the workspace's branch.
    #[clap(long, default_value = "")]
    remote_branch: String,
}

#[async_trait]
impl RunCommand for GitPushCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        let (config, client) = build_client(args)?;
        let repository = repository_name(self.repository.as_deref(), &config)?;

        client.push_git_commits(&repository, &self.workspace, &self.remote_branch).await?;

        println!("Pushed commits from workspace `{}`", self.workspace);

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct GitResetCommand {
    #[clap(long)]
    repository: Option<String>,

    #[clap(long)]
    workspace: String,

    /// Limit the reset to these paths. Repeatable; empty means everything.
    #[clap(long = "path")]
    paths: Vec<String>,

    /// Also remove untracked files.
    #[clap(long)]
    clean: bool,
}

#[async_trait]
impl RunCommand for GitResetCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        let (config, client) = build_client(args)?;
        let repository = repository_name(self.repository.as_deref(), &config)?;

        client.reset_workspace_changes(&repository, &self.workspace, &self.paths, self.clean).await?;

        println!("Reset changes in workspace `{}`", self.workspace);

        Ok(())
    }
}
