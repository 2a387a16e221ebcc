use actions::ActionsCommand;
use async_trait::async_trait;
use auth::AuthCommand;
use clap::{command, Args, Parser, Subcommand};
use compile::CompileCommand;
use dataform_client::DataformClient;
use file::FileCommand;
use git::GitCommand;
use invoke::InvokeCommand;
use profile::ProfileCommand;
use repo::RepoCommand;
use run::RunWorkflowCommand;
use workspace::WorkspaceCommand;

use crate::config::{load_token, DataformConfig};

pub mod actions;
pub mod auth;
pub mod compile;
pub mod file;
pub mod git;
pub mod invoke;
pub mod profile;
pub mod repo;
pub mod run;
pub mod workspace;

#[async_trait]
pub trait RunCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()>;
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Profile to use from the configuration file.
    #[clap(long, global = true, default_value = "default", env = "DATAFORM_PROFILE")]
    pub profile: String,

    /// Path to an alternative configuration file.
    #[clap(long, global = true)]
    pub config: Option<String>,
}

#[derive(Parser, Debug)]
#[command(term_width = 0, version, name = "dataform")]
pub struct Cli {
    #[clap(flatten)]
    args: GlobalArgs,

    #[clap(subcommand)]
    command: Command,
}

impl Cli {
    pub async fn run(&self) -> anyhow::Result<()> {
        self.command.run(&self.args).await
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store the access token used to reach the Dataform API.
    #[clap(subcommand)]
    Auth(AuthCommand),
    /// Manage configuration profiles.
    #[clap(subcommand)]
    Profile(ProfileCommand),
    /// List and inspect repositories.
    #[clap(subcommand)]
    Repo(RepoCommand),
    /// Manage workspaces within a repository.
    #[clap(subcommand)]
    Workspace(WorkspaceCommand),
    /// Read and write files in a workspace.
    #[clap(subcommand)]
    File(FileCommand),
    /// Compile the repository from a workspace or a git commitish.
    Compile(CompileCommand),
    /// Launch a workflow invocation for an existing compilation result.
    Invoke(InvokeCommand),
    /// Compile and invoke in one step.
    Run(RunWorkflowCommand),
    /// List the compiled actions of a compilation result.
    Actions(ActionsCommand),
    /// Git operations on a workspace.
    #[clap(subcommand)]
    Git(GitCommand),
}

#[async_trait]
impl RunCommand for Command {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        match self {
            Command::Auth(cmd) => cmd.run(args).await,
            Command::Profile(cmd) => cmd.run(args).await,
            Command::Repo(cmd) => cmd.run(args).await,
            Command::Workspace(cmd) => cmd.run(args).await,
            Command::File(cmd) => cmd.run(args).await,
            Command::Compile(cmd) => cmd.run(args).await,
            Command::Invoke(cmd) => cmd.run(args).await,
            Command::Run(cmd) => cmd.run(args).await,
            Command::Actions(cmd) => cmd.run(args).await,
            Command::Git(cmd) => cmd.run(args).await,
        }
    }
}

pub(crate) fn build_client(args: &GlobalArgs) -> anyhow::Result<(DataformConfig, DataformClient)> {
    tracing::debug!("using profile `{}`", args.profile);
    let config = DataformConfig::load(args.profile.as_str(), args.config.clone().map(Into::into))?;
    let token = load_token(&args.profile)?;
    let client = DataformClient::new(config.project.clone(), config.location.clone(), token)?;

    Ok((config, client))
}

/// Resolves the repository to operate on: an explicit flag wins, otherwise the
/// profile's default repository.
pub(crate) fn repository_name(flag: Option<&str>, config: &DataformConfig) -> anyhow::Result<String> {
    flag.map(str::to_owned).or_else(|| config.repository.clone()).ok_or_else(|| {
        anyhow::anyhow!("No repository given. Pass --repository or set one on the profile.")
    })
}

#[cfg(test)]
mod test {
    use clap::CommandFactory as _;

    use crate::config::DataformConfig;

    #[test]
    fn cli_definition_is_consistent() {
        super::Cli::command().debug_assert();
    }

    #[test]
    fn explicit_repository_flag_wins_over_profile_default() {
        let config = DataformConfig::new(
            "default".to_owned(),
            "acme".to_owned(),
            "us-east1".to_owned(),
            Some("main".to_owned()),
        );

        assert_eq!(super::repository_name(Some("other"), &config).unwrap(), "other");
        assert_eq!(super::repository_name(None, &config).unwrap(), "main");
    }

    #[test]
    fn missing_repository_is_an_error() {
        let config = DataformConfig::new("default".to_owned(), "acme".to_owned(), "us-east1".to_owned(), None);

        assert!(super::repository_name(None, &config).is_err());
    }
}
