use async_trait::async_trait;
use clap::Args;
use dataform_client::{InvocationConfig, Target};

use super::{build_client, repository_name, GlobalArgs, RunCommand};

/// Action selection flags. Targets and tags pass through to the remote
/// service unvalidated; conflicting selections fail remotely.
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Include actions with this tag. Repeatable.
    #[clap(long = "tag")]
    pub tags: Vec<String>,

    /// Include this action, as `name`, `schema.name`, or `database.schema.name`.
    /// Repeatable.
    #[clap(long = "target", value_parser = parse_target)]
    pub targets: Vec<Target>,

    /// Also run transitive dependencies of the selected actions.
    #[clap(long)]
    pub include_dependencies: bool,

    /// Also run transitive dependents of the selected actions.
    #[clap(long)]
    pub include_dependents: bool,

    /// Rebuild incremental tables from scratch.
    #[clap(long)]
    pub full_refresh: bool,

    /// Service account to run the invocation as.
    #[clap(long)]
    pub service_account: Option<String>,
}

impl SelectionArgs {
    pub fn to_config(&self) -> InvocationConfig {
        InvocationConfig {
            included_targets: self.targets.clone(),
            included_tags: self.tags.clone(),
            transitive_dependencies_included: self.include_dependencies,
            transitive_dependents_included: self.include_dependents,
            fully_refresh_incremental_tables_enabled: self.full_refresh,
            service_account: self.service_account.clone(),
        }
    }
}

fn parse_target(raw: &str) -> Result<Target, String> {
    let mut parts = raw.rsplit('.');
    let name = parts.next().filter(|p| !p.is_empty()).ok_or_else(|| format!("`{raw}` has no action name"))?;
    let schema = parts.next();
    let database = parts.next();
    if parts.next().is_some() {
        return Err(format!("`{raw}` has too many `.`-separated segments"));
    }

    Ok(Target {
        database: database.map(str::to_owned),
        schema: schema.map(str::to_owned),
        name: Some(name.to_owned()),
    })
}

#[derive(Args, Debug)]
pub struct InvokeCommand {
    #[clap(long)]
    repository: Option<String>,

    /// Fully qualified compilation result name to invoke.
    #[clap(long)]
    compilation_result: String,

    #[clap(flatten)]
    selection: SelectionArgs,
}

#[async_trait]
impl RunCommand for InvokeCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        let (config, client) = build_client(args)?;
        let repository = repository_name(self.repository.as_deref(), &config)?;

        let invocation = client
            .create_workflow_invocation(&repository, &self.compilation_result, self.selection.to_config())
            .await?;

        if let Some(name) = &invocation.name {
            println!("{name}");
            if let Some(id) = name.rsplit('/').next() {
                println!("{}", client.workflow_invocation_url(&repository, id));
            }
        }

        Ok(())
    }
}
