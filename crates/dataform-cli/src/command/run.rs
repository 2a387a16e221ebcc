use std::io::stdout;

use async_trait::async_trait;
use clap::Args;
use crossterm::execute;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use dataform_client::CompilationSource;

use super::compile::{CompilationConfigArgs, SourceArgs};
use super::invoke::SelectionArgs;
use super::{build_client, repository_name, GlobalArgs, RunCommand};

/// Compiles the repository and immediately launches a workflow invocation for
/// the result.
#[derive(Args, Debug)]
pub struct RunWorkflowCommand {
    #[clap(long)]
    repository: Option<String>,

    #[clap(flatten)]
    source: SourceArgs,

    #[clap(flatten)]
    config: CompilationConfigArgs,

    #[clap(flatten)]
    selection: SelectionArgs,
}

#[async_trait]
impl RunCommand for RunWorkflowCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        let (config, client) = build_client(args)?;
        let repository = repository_name(self.repository.as_deref(), &config)?;

        let source = match (&self.source.workspace, &self.source.git_commitish) {
            (Some(workspace), None) => CompilationSource::Workspace(workspace.clone()),
            (None, Some(git_commitish)) => CompilationSource::GitCommitish(git_commitish.clone()),
            _ => CompilationSource::RepositoryDefault,
        };

        let run = client
            .run_remote(&repository, source, self.config.to_config(), self.selection.to_config())
            .await?;

        execute!(
            stdout(),
            SetForegroundColor(Color::Green),
            Print(format!("✅ Workflow invocation {} started\n", run.id)),
            ResetColor,
            Print(format!("{}\n", run.url)),
        )?;

        Ok(())
    }
}
