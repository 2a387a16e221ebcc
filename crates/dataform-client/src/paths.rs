//! Resource path grammar of the Dataform administrative API.
//!
//! Paths are built by pure string formatting. Identifier legality is not
//! validated here; malformed names fail remotely with a structured error.

pub fn location(project: &str, location: &str) -> String {
    format!("projects/{project}/locations/{location}")
}

pub fn repository(project: &str, location: &str, repository: &str) -> String {
    format!("projects/{project}/locations/{location}/repositories/{repository}")
}

pub fn workspace(project: &str, location: &str, repository: &str, workspace: &str) -> String {
    format!("projects/{project}/locations/{location}/repositories/{repository}/workspaces/{workspace}")
}

/// Console deep link for a workflow invocation. No network call is involved.
pub fn workflow_invocation_url(project: &str, location: &str, repository: &str, invocation_id: &str) -> String {
    format!(
        "https://console.cloud.google.com/bigquery/dataform/locations/{location}/repositories/{repository}/workflows/{invocation_id}?project={project}"
    )
}
