//! Remote procedure boundary of the Dataform administrative API.
//!
//! [`DataformRpc`] carries one method per remote request message so the client
//! logic above it can be exercised against a mock. [`HttpDataformRpc`] is the
//! REST implementation.

use async_trait::async_trait;
use base64::engine::{general_purpose::STANDARD, Engine as _};
#[cfg(test)]
use mockall::automock;
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::types::{
    CommitAuthor, CompilationResult, ListRepositoriesResponse, ListWorkspacesResponse,
    QueryCompilationResultActionsResponse, Repository, Workspace, WorkflowInvocation,
};

pub const DEFAULT_ENDPOINT: &str = "https://dataform.googleapis.com/v1beta1/";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait DataformRpc {
    async fn list_repositories(&self, parent: &str, page_token: &str) -> Result<ListRepositoriesResponse>;
    async fn get_repository(&self, name: &str) -> Result<Repository>;
    async fn list_workspaces(&self, parent: &str, page_token: &str) -> Result<ListWorkspacesResponse>;
    async fn get_workspace(&self, name: &str) -> Result<Workspace>;
    async fn create_workspace(&self, parent: &str, workspace_id: &str) -> Result<Workspace>;
    async fn delete_workspace(&self, name: &str) -> Result<()>;
    async fn write_file(&self, workspace: &str, path: &str, contents: &[u8]) -> Result<()>;
    async fn read_file(&self, workspace: &str, path: &str) -> Result<Vec<u8>>;
    async fn remove_file(&self, workspace: &str, path: &str) -> Result<()>;
    async fn create_compilation_result(
        &self,
        parent: &str,
        compilation_result: &CompilationResult,
    ) -> Result<CompilationResult>;
    async fn query_compilation_result_actions(
        &self,
        name: &str,
        page_token: &str,
    ) -> Result<QueryCompilationResultActionsResponse>;
    async fn create_workflow_invocation(
        &self,
        parent: &str,
        workflow_invocation: &WorkflowInvocation,
    ) -> Result<WorkflowInvocation>;
    async fn pull_git_commits(&self, name: &str, author: &CommitAuthor, remote_branch: &str) -> Result<()>;
    async fn push_git_commits(&self, name: &str, remote_branch: &str) -> Result<()>;
    async fn reset_workspace_changes(&self, name: &str, paths: &[String], clean: bool) -> Result<()>;
}

/// REST transport. Holds a bearer access token issued by the caller's
/// credential machinery; token minting and refresh are out of scope.
pub struct HttpDataformRpc {
    http: reqwest::Client,
    base_url: Url,
    access_token: String,
}

impl HttpDataformRpc {
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Ok(Self::with_endpoint(Url::parse(DEFAULT_ENDPOINT)?, access_token))
    }

    /// Points the transport at a non-default endpoint, e.g. a regional one.
    pub fn with_endpoint(base_url: Url, access_token: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url, access_token: access_token.into() }
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url, resource: &str) -> Result<T> {
        let response = self.http.get(url).bearer_auth(&self.access_token).send().await?;
        Ok(checked(response, resource).await?.json::<T>().await?)
    }

    async fn post_json<B: Serialize + Sync, T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
        resource: &str,
    ) -> Result<T> {
        let response = self.http.post(url).bearer_auth(&self.access_token).json(body).send().await?;
        Ok(checked(response, resource).await?.json::<T>().await?)
    }

    async fn post_empty<B: Serialize + Sync>(&self, url: Url, body: &B, resource: &str) -> Result<()> {
        let response = self.http.post(url).bearer_auth(&self.access_token).json(body).send().await?;
        checked(response, resource).await?;
        Ok(())
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
struct StatusBody {
    code: u16,
    message: String,
    status: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ErrorBody {
    error: StatusBody,
}

/// Maps the service's structured error body onto the error taxonomy. Falls
/// back to the HTTP status code when the body is missing or unparsable.
fn classify(http_status: StatusCode, body: StatusBody, resource: &str) -> Error {
    if body.status == "ALREADY_EXISTS" || http_status == StatusCode::CONFLICT {
        return Error::AlreadyExists { resource: resource.to_owned() };
    }
    if body.status == "NOT_FOUND" || http_status == StatusCode::NOT_FOUND {
        return Error::NotFound { resource: resource.to_owned() };
    }
    Error::Api {
        code: if body.code != 0 { body.code } else { http_status.as_u16() },
        status: if body.status.is_empty() { http_status.to_string() } else { body.status },
        message: body.message,
    }
}

async fn checked(response: Response, resource: &str) -> Result<Response> {
    let http_status = response.status();
    if http_status.is_success() {
        return Ok(response);
    }
    let body = response.json::<ErrorBody>().await.map(|b| b.error).unwrap_or_default();
    Err(classify(http_status, body, resource))
}

// Proto3 semantics: an empty page token means the first page.
fn paged(mut url: Url, page_token: &str) -> Url {
    if !page_token.is_empty() {
        url.query_pairs_mut().append_pair("pageToken", page_token);
    }
    url
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WriteFileRequest {
    path: String,
    contents: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ReadFileResponse {
    file_contents: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoveFileRequest {
    path: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PullGitCommitsRequest<'a> {
    author: &'a CommitAuthor,
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_branch: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PushGitCommitsRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_branch: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetWorkspaceChangesRequest<'a> {
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    paths: &'a [String],
    clean: bool,
}

#[async_trait]
impl DataformRpc for HttpDataformRpc {
    async fn list_repositories(&self, parent: &str, page_token: &str) -> Result<ListRepositoriesResponse> {
        let url = paged(self.url(&format!("{parent}/repositories"))?, page_token);
        self.get_json(url, parent).await
    }

    async fn get_repository(&self, name: &str) -> Result<Repository> {
        self.get_json(self.url(name)?, name).await
    }

    async fn list_workspaces(&self, parent: &str, page_token: &str) -> Result<ListWorkspacesResponse> {
        let url = paged(self.url(&format!("{parent}/workspaces"))?, page_token);
        self.get_json(url, parent).await
    }

    async fn get_workspace(&self, name: &str) -> Result<Workspace> {
        self.get_json(self.url(name)?, name).await
    }

    async fn create_workspace(&self, parent: &str, workspace_id: &str) -> Result<Workspace> {
        let mut url = self.url(&format!("{parent}/workspaces"))?;
        url.query_pairs_mut().append_pair("workspaceId", workspace_id);
        self.post_json(url, &serde_json::json!({}), &format!("{parent}/workspaces/{workspace_id}")).await
    }

    async fn delete_workspace(&self, name: &str) -> Result<()> {
        let response = self.http.delete(self.url(name)?).bearer_auth(&self.access_token).send().await?;
        checked(response, name).await?;
        Ok(())
    }

    async fn write_file(&self, workspace: &str, path: &str, contents: &[u8]) -> Result<()> {
        let request = WriteFileRequest { path: path.to_owned(), contents: STANDARD.encode(contents) };
        self.post_empty(self.url(&format!("{workspace}:writeFile"))?, &request, workspace).await
    }

    async fn read_file(&self, workspace: &str, path: &str) -> Result<Vec<u8>> {
        let mut url = self.url(&format!("{workspace}:readFile"))?;
        url.query_pairs_mut().append_pair("path", path);
        let response: ReadFileResponse = self.get_json(url, workspace).await?;
        Ok(STANDARD.decode(response.file_contents)?)
    }

    async fn remove_file(&self, workspace: &str, path: &str) -> Result<()> {
        let request = RemoveFileRequest { path: path.to_owned() };
        self.post_empty(self.url(&format!("{workspace}:removeFile"))?, &request, workspace).await
    }

    async fn create_compilation_result(
        &self,
        parent: &str,
        compilation_result: &CompilationResult,
    ) -> Result<CompilationResult> {
        let url = self.url(&format!("{parent}/compilationResults"))?;
        self.post_json(url, compilation_result, parent).await
    }

    async fn query_compilation_result_actions(
        &self,
        name: &str,
        page_token: &str,
    ) -> Result<QueryCompilationResultActionsResponse> {
        let url = paged(self.url(&format!("{name}:query"))?, page_token);
        self.get_json(url, name).await
    }

    async fn create_workflow_invocation(
        &self,
        parent: &str,
        workflow_invocation: &WorkflowInvocation,
    ) -> Result<WorkflowInvocation> {
        let url = self.url(&format!("{parent}/workflowInvocations"))?;
        self.post_json(url, workflow_invocation, parent).await
    }

    async fn pull_git_commits(&self, name: &str, author: &CommitAuthor, remote_branch: &str) -> Result<()> {
        let request =
            PullGitCommitsRequest { author, remote_branch: (!remote_branch.is_empty()).then_some(remote_branch) };
        self.post_empty(self.url(&format!("{name}:pull"))?, &request, name).await
    }

    async fn push_git_commits(&self, name: &str, remote_branch: &str) -> Result<()> {
        let request = PushGitCommitsRequest { remote_branch: (!remote_branch.is_empty()).then_some(remote_branch) };
        self.post_empty(self.url(&format!("{name}:push"))?, &request, name).await
    }

    async fn reset_workspace_changes(&self, name: &str, paths: &[String], clean: bool) -> Result<()> {
        let request = ResetWorkspaceChangesRequest { paths, clean };
        self.post_empty(self.url(&format!("{name}:reset"))?, &request, name).await
    }
}
