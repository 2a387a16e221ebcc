use async_trait::async_trait;
use clap::Args;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use dataform_client::Target;

use super::{build_client, GlobalArgs, RunCommand};

/// Lists the compiled actions of a compilation result.
#[derive(Args, Debug)]
pub struct ActionsCommand {
    /// Fully qualified compilation result name.
    #[clap(long)]
    compilation_result: String,
}

fn render_target(target: &Option<Target>) -> String {
    match target {
        Some(target) => [target.database.as_deref(), target.schema.as_deref(), target.name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("."),
        None => String::new(),
    }
}

#[async_trait]
impl RunCommand for ActionsCommand {
    async fn run(&self, args: &GlobalArgs) -> anyhow::Result<()> {
        let (_, client) = build_client(args)?;
        let actions = client.query_compilation_result_actions(&self.compilation_result).await?;

        let mut table = Table::new();
        table.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS);
        table.set_header(vec!["Target", "File"]);

        for action in actions {
            table.add_row(vec![render_target(&action.target), action.file_path.unwrap_or_default()]);
        }

        println!("{table}");

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use dataform_client::Target;

    #[test]
    fn target_renders_dotted_and_skips_missing_segments() {
        let target = Target {
            database: Some("acme".to_owned()),
            schema: Some("staging".to_owned()),
            name: Some("orders".to_owned()),
        };
        assert_eq!(super::render_target(&Some(target)), "acme.staging.orders");

        let partial = Target { database: None, schema: Some("staging".to_owned()), name: Some("orders".to_owned()) };
        assert_eq!(super::render_target(&Some(partial)), "staging.orders");

        assert_eq!(super::render_target(&None), "");
    }
}
