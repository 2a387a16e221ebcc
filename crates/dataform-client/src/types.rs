//! Wire types of the Dataform administrative API.
//!
//! Field names are camelCase on the wire and must match the published schema
//! exactly (`codeCompilationConfig.defaultDatabase`, `invocationConfig.includedTags`).
//! Unset optional fields are omitted from requests so the remote service applies
//! its own defaults.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Repository {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Workspace {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeCompilationConfig {
    /// The default database (Google Cloud project ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_database: Option<String>,
    /// The default schema (BigQuery dataset ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_schema: Option<String>,
    /// The default BigQuery location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_location: Option<String>,
    /// The default schema for assertions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_schema: Option<String>,
    /// User-defined variables made available to project code during compilation.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub vars: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builtin_assertion_name_prefix: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Compilation source: a literal git commit-ish. Mutually exclusive with `workspace`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_commitish: Option<String>,
    /// Compilation source: a fully qualified workspace path. Mutually exclusive
    /// with `git_commitish`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_compilation_config: Option<CodeCompilationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_git_commit_sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataform_core_version: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub compilation_errors: Vec<CompilationError>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilationError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_target: Option<Target>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Target {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InvocationConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included_targets: Vec<Target>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included_tags: Vec<String>,
    pub transitive_dependencies_included: bool,
    pub transitive_dependents_included: bool,
    pub fully_refresh_incremental_tables_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowInvocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub compilation_result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation_config: Option<InvocationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<WorkflowInvocationState>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowInvocationState {
    #[serde(rename = "STATE_UNSPECIFIED")]
    Unspecified,
    Running,
    Succeeded,
    Cancelled,
    Failed,
    Canceling,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilationResultAction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_target: Option<Target>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// Author attribution for git commits pulled into a workspace.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CommitAuthor {
    pub name: String,
    pub email_address: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ListRepositoriesResponse {
    pub repositories: Vec<Repository>,
    pub next_page_token: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ListWorkspacesResponse {
    pub workspaces: Vec<Workspace>,
    pub next_page_token: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryCompilationResultActionsResponse {
    pub compilation_result_actions: Vec<CompilationResultAction>,
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn code_compilation_config_serializes_camel_case_field_names() {
        let config = CodeCompilationConfig {
            default_database: Some("db".to_owned()),
            default_schema: Some("dataform".to_owned()),
            table_prefix: Some("AA".to_owned()),
            builtin_assertion_name_prefix: Some("chk".to_owned()),
            ..Default::default()
        };

        let json = serde_json::to_value(&config).expect("config should serialize");
        assert_eq!(json["defaultDatabase"], "db");
        assert_eq!(json["defaultSchema"], "dataform");
        assert_eq!(json["tablePrefix"], "AA");
        assert_eq!(json["builtinAssertionNamePrefix"], "chk");
    }

    #[test]
    fn unset_config_fields_are_omitted_from_requests() {
        let json = serde_json::to_value(CodeCompilationConfig::default()).expect("config should serialize");
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn invocation_config_serializes_camel_case_field_names() {
        let config = InvocationConfig {
            included_tags: vec!["nested".to_owned()],
            fully_refresh_incremental_tables_enabled: true,
            ..Default::default()
        };

        let json = serde_json::to_value(&config).expect("config should serialize");
        assert_eq!(json["includedTags"], serde_json::json!(["nested"]));
        assert_eq!(json["transitiveDependenciesIncluded"], false);
        assert_eq!(json["transitiveDependentsIncluded"], false);
        assert_eq!(json["fullyRefreshIncrementalTablesEnabled"], true);
        assert!(json.get("includedTargets").is_none());
        assert!(json.get("serviceAccount").is_none());
    }

    #[test]
    fn compilation_result_omits_unset_source_fields() {
        let result = CompilationResult {
            code_compilation_config: Some(CodeCompilationConfig::default()),
            ..Default::default()
        };

        let json = serde_json::to_value(&result).expect("result should serialize");
        assert!(json.get("workspace").is_none());
        assert!(json.get("gitCommitish").is_none());
    }

    #[test]
    fn workflow_invocation_state_deserializes_screaming_snake_case() {
        let invocation: WorkflowInvocation = serde_json::from_value(serde_json::json!({
            "name": "projects/p/locations/l/repositories/r/workflowInvocations/inv",
            "compilationResult": "projects/p/locations/l/repositories/r/compilationResults/c",
            "state": "RUNNING",
        }))
        .expect("invocation should deserialize");

        assert_eq!(invocation.state, Some(WorkflowInvocationState::Running));
    }

    #[test]
    fn list_response_tolerates_missing_fields() {
        let response: ListRepositoriesResponse =
            serde_json::from_value(serde_json::json!({})).expect("empty listing should deserialize");
        assert!(response.repositories.is_empty());
        assert!(response.next_page_token.is_none());
    }
}
