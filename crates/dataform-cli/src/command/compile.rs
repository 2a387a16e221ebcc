use async_trait::async_trait;
use clap::Args;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use dataform_client::{CodeCompilationConfig, CompilationResult};

use super::{build_client, repository_name, GlobalArgs, RunCommand};

/// Compilation source flags. Workspace and git commitish are mutually
/// exclusive; with neither, the remote service compiles its default branch.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Compile the current contents of this workspace.
    #[clap(long, conflicts_with = "git_commitish")]
    pub workspace: Option<String>,

    /// Compile this git commitish (branch, tag, or commit SHA).
    #[clap(long)]
    pub git_commitish: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CompilationConfigArgs {
    /// Default database (Google Cloud project ID).
    #[clap(long)]
    pub default_database: Option<String>,

    /// Default schema (BigQuery dataset ID).
    #[clap(long)]
    pub default_schema: Option<String>,

    /// Default BigQuery location.
    #[clap(long)]
    pub default_location: Option<String>,

    /// Default schema for assertions.
    #[clap(long)]
    pub assertion_schema: Option<String>,

    /// User-defined compilation variable, `key=value`. Repeatable.
    #[clap(long = "var", value_parser = parse_key_val)]
    pub vars: Vec<(String, String)>,

    #[clap(long)]
    pub database_suffix: Option<String>,

    #[clap(long)]
    pub schema_suffix: Option<String>,

    #[clap(long)]
    pub table_prefix: Option<String>,

    #[clap(long)]
    pub builtin_assertion_name_prefix: Option<String>,
}

impl CompilationConfigArgs {
    pub fn to_config(&self) -> CodeCompilationConfig {
        CodeCompilationConfig {
            default_database: self.default_database.clone(),
            default_schema: self.default_schema.clone(),
            default_location: self.default_location.clone(),
            assertion_schema: self.assertion_schema.clone(),
            vars: self.vars.iter().cloned().collect(),
            database_suffix: self.database_suffix.clone(),
            schema_suffix: self.schema_suffix.clone(),
            table_prefix: self.table_prefix.clone(),
            builtin_assertion_name_prefix: self.builtin_assertion_name_prefix.clone(),
        }
    }
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .ok_or_else(|| format!("`{raw}` is not of the form key=value"))
}

fn print_compilation_errors(result: &CompilationResult) -> anyhow::Result<()> {
    if result.compilation_errors.is_empty() {
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS);
    table.set_header(vec!["File", "Error"]);

    for error in &result.compilation_errors {
        table.add_row(vec![error.path.clone().unwrap_or_default(), error.message.clone()]);
    }

    println!("{table}");

    anyhow::bail!("compilation produced {} error(s)", result.compilation_errors.len())
}

#[derive(Args, Debug)]
pub struct CompileCommand {
    #[clap(long)]
    repository: Option<String>,

    #[clap(flatten)]
    source: SourceArgs,

    #[clap(flatten)]
    config: CompilationConfigArgs,
}

#[async_trait]
impl RunCommand for CompileCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        let (config, client) = build_client(args)?;
        let repository = repository_name(self.repository.as_deref(), &config)?;

        let result = client
            .create_compilation_result(
                &repository,
                self.source.git_commitish.as_deref(),
                self.source.workspace.as_deref(),
                self.config.to_config(),
            )
            .await?;

        if let Some(name) = &result.name {
            println!("{name}");
        }
        print_compilation_errors(&result)?;

        Ok(())
    }
}
