//! Administrative client for a Dataform repository hierarchy.

use tracing::{error, info};

use crate::error::{Error, Result};
use crate::paths;
use crate::rpc::{DataformRpc, HttpDataformRpc};
use crate::types::{
    CodeCompilationConfig, CommitAuthor, CompilationResult, CompilationResultAction, InvocationConfig, Repository,
    Workspace, WorkflowInvocation,
};

/// Source selection for a compilation request. A compilation reads either the
/// current contents of a workspace or a literal git commit-ish; with
/// [`CompilationSource::RepositoryDefault`] neither field is sent and the remote
/// service resolves its own default (typically the default branch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilationSource {
    Workspace(String),
    GitCommitish(String),
    RepositoryDefault,
}

/// A workflow invocation launched through [`DataformClient::run_remote`],
/// together with its console deep link.
#[derive(Debug, Clone)]
pub struct WorkflowRun {
    pub invocation: WorkflowInvocation,
    pub id: String,
    pub url: String,
}

/// Thin client over the Dataform administrative API. Holds nothing but the two
/// identifying strings and the RPC handle, so it is stateless per call and safe
/// to share across tasks.
pub struct DataformClient<R = HttpDataformRpc> {
    project_id: String,
    location: String,
    rpc: R,
}

impl DataformClient<HttpDataformRpc> {
    pub fn new(project_id: impl Into<String>, location: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        Ok(Self::with_rpc(project_id, location, HttpDataformRpc::new(access_token)?))
    }
}

impl<R: DataformRpc + Sync> DataformClient<R> {
    pub fn with_rpc(project_id: impl Into<String>, location: impl Into<String>, rpc: R) -> Self {
        Self { project_id: project_id.into(), location: location.into(), rpc }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn location_path(&self) -> String {
        paths::location(&self.project_id, &self.location)
    }

    fn repository_path(&self, repository: &str) -> String {
        paths::repository(&self.project_id, &self.location, repository)
    }

    fn workspace_path(&self, repository: &str, workspace: &str) -> String {
        paths::workspace(&self.project_id, &self.location, repository, workspace)
    }

    /// Lists all repositories under the project/location, following page
    /// tokens until the listing is exhausted.
    pub async fn list_repositories(&self) -> Result<Vec<Repository>> {
        let parent = self.location_path();
        let mut repositories = Vec::new();
        let mut page_token = String::new();
        loop {
            let page = self.rpc.list_repositories(&parent, &page_token).await?;
            repositories.extend(page.repositories);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = token,
                _ => break,
            }
        }
        Ok(repositories)
    }

    /// Fetches one repository. Absence propagates as [`Error::NotFound`].
    pub async fn get_repository(&self, repository: &str) -> Result<Repository> {
        self.rpc.get_repository(&self.repository_path(repository)).await
    }

    pub async fn list_workspaces(&self, repository: &str) -> Result<Vec<Workspace>> {
        let parent = self.repository_path(repository);
        let mut workspaces = Vec::new();
        let mut page_token = String::new();
        loop {
            let page = self.rpc.list_workspaces(&parent, &page_token).await?;
            workspaces.extend(page.workspaces);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = token,
                _ => break,
            }
        }
        Ok(workspaces)
    }

    /// Fetches one workspace. Absence propagates as [`Error::NotFound`].
    pub async fn get_workspace(&self, repository: &str, workspace: &str) -> Result<Workspace> {
        self.rpc.get_workspace(&self.workspace_path(repository, workspace)).await
    }

    /// Idempotent create: when the remote service reports the workspace already
    /// exists the conflict is logged and the existing workspace is fetched and
    /// returned instead. Any other failure is logged and returned. Two callers
    /// racing to provision the same name both observe success.
    pub async fn create_workspace(&self, repository: &str, workspace: &str) -> Result<Workspace> {
        let parent = self.repository_path(repository);
        match self.rpc.create_workspace(&parent, workspace).await {
            Ok(created) => {
                info!("workspace(name: {parent}/workspaces/{workspace}) created.");
                Ok(created)
            }
            Err(Error::AlreadyExists { .. }) => {
                info!("workspace {parent}/workspaces/{workspace} already exists. fetching it instead.");
                self.get_workspace(repository, workspace).await
            }
            Err(e) => {
                error!(error = %e, "failed to create workspace {parent}/workspaces/{workspace}.");
                Err(e)
            }
        }
    }

    /// Idempotent delete: a workspace that is already gone counts as success
    /// and is only logged. Any other failure is logged and returned.
    pub async fn delete_workspace(&self, repository: &str, workspace: &str) -> Result<()> {
        let name = self.workspace_path(repository, workspace);
        match self.rpc.delete_workspace(&name).await {
            Ok(()) => {
                info!("workspace(name: {name}) deleted.");
                Ok(())
            }
            Err(Error::NotFound { .. }) => {
                info!("workspace {name} not found. nothing to delete.");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "failed to delete workspace {name}.");
                Err(e)
            }
        }
    }

    /// Writes a file's full contents into a workspace, overwriting any previous
    /// version. Strings arrive UTF-8 encoded; byte input passes through unchanged.
    pub async fn write_file(
        &self,
        repository: &str,
        workspace: &str,
        path: &str,
        contents: impl Into<Vec<u8>> + Send,
    ) -> Result<()> {
        let name = self.workspace_path(repository, workspace);
        let contents = contents.into();
        self.rpc.write_file(&name, path, &contents).await.map_err(|e| {
            error!(error = %e, "failed to write {path} to workspace {name}.");
            e
        })
    }

    pub async fn read_file(&self, repository: &str, workspace: &str, path: &str) -> Result<Vec<u8>> {
        self.rpc.read_file(&self.workspace_path(repository, workspace), path).await
    }

    pub async fn remove_file(&self, repository: &str, workspace: &str, path: &str) -> Result<()> {
        let name = self.workspace_path(repository, workspace);
        self.rpc.remove_file(&name, path).await.map_err(|e| {
            error!(error = %e, "failed to remove {path} from workspace {name}.");
            e
        })
    }

    /// Requests compilation of the repository from the given source.
    ///
    /// Supplying both `git_commitish` and `workspace` is a usage error and
    /// fails with [`Error::ConflictingCompilationSources`] before any remote
    /// call is made. With only `workspace` set the compilation source is the
    /// resolved workspace path; with only `git_commitish` the literal reference
    /// string. With neither, no source field is sent and the remote service
    /// applies its own default. Config fields pass through with no client-side
    /// defaults.
    pub async fn create_compilation_result(
        &self,
        repository: &str,
        git_commitish: Option<&str>,
        workspace: Option<&str>,
        code_compilation_config: CodeCompilationConfig,
    ) -> Result<CompilationResult> {
        if git_commitish.is_some() && workspace.is_some() {
            error!("compilation result can only be created from one of workspace or git commitish.");
            return Err(Error::ConflictingCompilationSources);
        }

        let mut compilation_result = CompilationResult {
            code_compilation_config: Some(code_compilation_config),
            ..Default::default()
        };
        if let Some(workspace) = workspace {
            compilation_result.workspace = Some(self.workspace_path(repository, workspace));
        } else if let Some(git_commitish) = git_commitish {
            compilation_result.git_commitish = Some(git_commitish.to_owned());
        }

        let parent = self.repository_path(repository);
        self.rpc.create_compilation_result(&parent, &compilation_result).await.map_err(|e| {
            error!(error = %e, "failed to create compilation result under {parent}.");
            e
        })
    }

    /// Fetches the compiled actions of a compilation result, following page
    /// tokens until the listing is exhausted.
    pub async fn query_compilation_result_actions(
        &self,
        compilation_result_name: &str,
    ) -> Result<Vec<CompilationResultAction>> {
        let mut actions = Vec::new();
        let mut page_token = String::new();
        loop {
            let page = self.rpc.query_compilation_result_actions(compilation_result_name, &page_token).await?;
            actions.extend(page.compilation_result_actions);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = token,
                _ => break,
            }
        }
        Ok(actions)
    }

    /// Launches a workflow invocation for a compilation result. The invocation
    /// config passes through unvalidated; consistency checks are remote-side.
    pub async fn create_workflow_invocation(
        &self,
        repository: &str,
        compilation_result_name: &str,
        invocation_config: InvocationConfig,
    ) -> Result<WorkflowInvocation> {
        let parent = self.repository_path(repository);
        let workflow_invocation = WorkflowInvocation {
            compilation_result: compilation_result_name.to_owned(),
            invocation_config: Some(invocation_config),
            ..Default::default()
        };
        self.rpc.create_workflow_invocation(&parent, &workflow_invocation).await.map_err(|e| {
            error!(error = %e, "failed to create workflow invocation under {parent}.");
            e
        })
    }

    /// Console deep link for a workflow invocation. Pure formatting.
    pub fn workflow_invocation_url(&self, repository: &str, invocation_id: &str) -> String {
        paths::workflow_invocation_url(&self.project_id, &self.location, repository, invocation_id)
    }

    /// Pulls commits from the remote branch into the workspace. An empty
    /// `remote_branch` lets the remote service pick the workspace's default.
    pub async fn pull_git_commits(
        &self,
        repository: &str,
        workspace: &str,
        author: &CommitAuthor,
        remote_branch: &str,
    ) -> Result<()> {
        self.rpc.pull_git_commits(&self.workspace_path(repository, workspace), author, remote_branch).await
    }

    pub async fn push_git_commits(&self, repository: &str, workspace: &str, remote_branch: &str) -> Result<()> {
        self.rpc.push_git_commits(&self.workspace_path(repository, workspace), remote_branch).await
    }

    /// Discards uncommitted changes in a workspace, limited to `paths` when
    /// non-empty. With `clean` set, untracked files are removed as well.
    pub async fn reset_workspace_changes(
        &self,
        repository: &str,
        workspace: &str,
        paths: &[String],
        clean: bool,
    ) -> Result<()> {
        self.rpc.reset_workspace_changes(&self.workspace_path(repository, workspace), paths, clean).await
    }

    /// Compiles the repository from `source` and immediately launches a
    /// workflow invocation for the result.
    pub async fn run_remote(
        &self,
        repository: &str,
        source: CompilationSource,
        code_compilation_config: CodeCompilationConfig,
        invocation_config: InvocationConfig,
    ) -> Result<WorkflowRun> {
        let (git_commitish, workspace) = match &source {
            CompilationSource::Workspace(workspace) => (None, Some(workspace.as_str())),
            CompilationSource::GitCommitish(git_commitish) => (Some(git_commitish.as_str()), None),
            CompilationSource::RepositoryDefault => (None, None),
        };
        let compilation_result =
            self.create_compilation_result(repository, git_commitish, workspace, code_compilation_config).await?;
        let compilation_result_name = compilation_result.name.ok_or(Error::MissingResponseField("name"))?;

        let invocation =
            self.create_workflow_invocation(repository, &compilation_result_name, invocation_config).await?;
        let id = invocation
            .name
            .as_deref()
            .and_then(|name| name.rsplit('/').next())
            .map(str::to_owned)
            .ok_or(Error::MissingResponseField("name"))?;
        let url = self.workflow_invocation_url(repository, &id);

        Ok(WorkflowRun { invocation, id, url })
    }
}

#[cfg(test)]
mod test {
    use super::{CompilationSource, DataformClient};
    use crate::error::Error;
    use crate::rpc::MockDataformRpc;
    use crate::types::{
        CodeCompilationConfig, CompilationResult, InvocationConfig, ListRepositoriesResponse, ListWorkspacesResponse,
        Repository, Workspace, WorkflowInvocation,
    };

    const WORKSPACE_PATH: &str = "projects/acme/locations/us-east1/repositories/main/workspaces/dev";
    const REPOSITORY_PATH: &str = "projects/acme/locations/us-east1/repositories/main";

    fn client(rpc: MockDataformRpc) -> DataformClient<MockDataformRpc> {
        DataformClient::with_rpc("acme", "us-east1", rpc)
    }

    #[tokio::test]
    async fn when_creating_workspace_succeeds_then_created_workspace_is_returned() {
        let mut rpc = MockDataformRpc::new();
        rpc.expect_create_workspace()
            .withf(|parent, workspace_id| parent == REPOSITORY_PATH && workspace_id == "dev")
            .times(1)
            .returning(|_, _| Ok(Workspace { name: WORKSPACE_PATH.to_owned() }));

        let workspace = client(rpc).create_workspace("main", "dev").await.expect("create should succeed");

        assert_eq!(workspace.name, WORKSPACE_PATH);
    }

    #[tokio::test]
    async fn when_workspace_already_exists_then_create_fetches_existing_workspace() {
        let mut rpc = MockDataformRpc::new();
        rpc.expect_create_workspace()
            .times(1)
            .returning(|parent, id| Err(Error::AlreadyExists { resource: format!("{parent}/workspaces/{id}") }));
        rpc.expect_get_workspace()
            .withf(|name| name == WORKSPACE_PATH)
            .times(1)
            .returning(|name| Ok(Workspace { name: name.to_owned() }));

        let workspace = client(rpc).create_workspace("main", "dev").await.expect("conflict should be tolerated");

        assert_eq!(workspace.name, WORKSPACE_PATH);
    }

    #[tokio::test]
    async fn when_create_workspace_fails_then_error_is_returned() {
        let mut rpc = MockDataformRpc::new();
        rpc.expect_create_workspace().times(1).returning(|_, _| {
            Err(Error::Api { code: 403, status: "PERMISSION_DENIED".to_owned(), message: "denied".to_owned() })
        });

        let result = client(rpc).create_workspace("main", "dev").await;

        assert!(matches!(result, Err(Error::Api { code: 403, .. })));
    }

    #[tokio::test]
    async fn when_workspace_is_absent_then_delete_is_treated_as_success() {
        let mut rpc = MockDataformRpc::new();
        rpc.expect_delete_workspace()
            .withf(|name| name == WORKSPACE_PATH)
            .times(1)
            .returning(|name| Err(Error::NotFound { resource: name.to_owned() }));

        let result = client(rpc).delete_workspace("main", "dev").await;

        assert!(matches!(result, Ok(())));
    }

    #[tokio::test]
    async fn when_delete_workspace_fails_then_error_is_returned() {
        let mut rpc = MockDataformRpc::new();
        rpc.expect_delete_workspace().times(1).returning(|_| {
            Err(Error::Api { code: 500, status: "INTERNAL".to_owned(), message: "boom".to_owned() })
        });

        let result = client(rpc).delete_workspace("main", "dev").await;

        assert!(matches!(result, Err(Error::Api { code: 500, .. })));
    }

    #[tokio::test]
    async fn when_both_compilation_sources_are_given_then_no_remote_call_is_made() {
        // No expectations registered: any RPC call would panic the mock.
        let rpc = MockDataformRpc::new();

        let result = client(rpc)
            .create_compilation_result("main", Some("feature-branch"), Some("dev"), CodeCompilationConfig::default())
            .await;

        assert!(matches!(result, Err(Error::ConflictingCompilationSources)));
    }

    #[tokio::test]
    async fn when_workspace_source_is_given_then_request_carries_workspace_path() {
        let mut rpc = MockDataformRpc::new();
        rpc.expect_create_compilation_result()
            .withf(|parent, result| {
                parent == REPOSITORY_PATH
                    && result.workspace.as_deref() == Some(WORKSPACE_PATH)
                    && result.git_commitish.is_none()
            })
            .times(1)
            .returning(|_, result| Ok(CompilationResult { name: Some("cr".to_owned()), ..result.clone() }));

        client(rpc)
            .create_compilation_result("main", None, Some("dev"), CodeCompilationConfig::default())
            .await
            .expect("compilation from workspace should succeed");
    }

    #[tokio::test]
    async fn when_git_commitish_is_given_then_request_carries_literal_reference() {
        let mut rpc = MockDataformRpc::new();
        rpc.expect_create_compilation_result()
            .withf(|_, result| result.git_commitish.as_deref() == Some("feature-branch") && result.workspace.is_none())
            .times(1)
            .returning(|_, result| Ok(CompilationResult { name: Some("cr".to_owned()), ..result.clone() }));

        client(rpc)
            .create_compilation_result("main", Some("feature-branch"), None, CodeCompilationConfig::default())
            .await
            .expect("compilation from git commitish should succeed");
    }

    #[tokio::test]
    async fn when_no_source_is_given_then_request_carries_neither_field() {
        let mut rpc = MockDataformRpc::new();
        rpc.expect_create_compilation_result()
            .withf(|_, result| result.workspace.is_none() && result.git_commitish.is_none())
            .times(1)
            .returning(|_, result| Ok(CompilationResult { name: Some("cr".to_owned()), ..result.clone() }));

        client(rpc)
            .create_compilation_result("main", None, None, CodeCompilationConfig::default())
            .await
            .expect("compilation from repository default should succeed");
    }

    #[tokio::test]
    async fn when_config_is_supplied_then_it_passes_through_unchanged() {
        let config = CodeCompilationConfig { table_prefix: Some("AA".to_owned()), ..Default::default() };
        let expected = config.clone();

        let mut rpc = MockDataformRpc::new();
        rpc.expect_create_compilation_result()
            .withf(move |_, result| result.code_compilation_config.as_ref() == Some(&expected))
            .times(1)
            .returning(|_, result| Ok(result.clone()));

        client(rpc)
            .create_compilation_result("main", None, Some("dev"), config)
            .await
            .expect("compilation should succeed");
    }

    #[tokio::test]
    async fn when_writing_string_contents_then_utf8_bytes_are_transmitted() {
        let mut rpc = MockDataformRpc::new();
        rpc.expect_write_file()
            .withf(|workspace, path, contents| {
                workspace == WORKSPACE_PATH
                    && path == "definitions/model.sqlx"
                    && contents == "select 'héllo'".as_bytes()
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        client(rpc)
            .write_file("main", "dev", "definitions/model.sqlx", "select 'héllo'")
            .await
            .expect("write should succeed");
    }

    #[tokio::test]
    async fn when_writing_binary_contents_then_bytes_pass_through_unchanged() {
        let payload = vec![0u8, 159, 146, 150];
        let expected = payload.clone();

        let mut rpc = MockDataformRpc::new();
        rpc.expect_write_file()
            .withf(move |_, _, contents| contents == expected)
            .times(1)
            .returning(|_, _, _| Ok(()));

        client(rpc).write_file("main", "dev", "raw.bin", payload).await.expect("write should succeed");
    }

    #[tokio::test]
    async fn when_listing_repositories_then_all_pages_are_followed() {
        let mut rpc = MockDataformRpc::new();
        rpc.expect_list_repositories()
            .withf(|parent, page_token| parent == "projects/acme/locations/us-east1" && page_token.is_empty())
            .times(1)
            .returning(|_, _| {
                Ok(ListRepositoriesResponse {
                    repositories: vec![Repository { name: "one".to_owned(), ..Default::default() }],
                    next_page_token: Some("page-2".to_owned()),
                })
            });
        rpc.expect_list_repositories()
            .withf(|_, page_token| page_token == "page-2")
            .times(1)
            .returning(|_, _| {
                Ok(ListRepositoriesResponse {
                    repositories: vec![Repository { name: "two".to_owned(), ..Default::default() }],
                    next_page_token: None,
                })
            });

        let repositories = client(rpc).list_repositories().await.expect("listing should succeed");

        assert_eq!(repositories.len(), 2);
        assert_eq!(repositories[0].name, "one");
        assert_eq!(repositories[1].name, "two");
    }

    #[tokio::test]
    async fn when_getting_workspace_then_request_uses_path_grammar() {
        let mut rpc = MockDataformRpc::new();
        rpc.expect_get_workspace()
            .withf(|name| name == WORKSPACE_PATH)
            .times(1)
            .returning(|name| Ok(Workspace { name: name.to_owned() }));

        let workspace = client(rpc).get_workspace("main", "dev").await.expect("get should succeed");

        assert_eq!(workspace.name, WORKSPACE_PATH);
    }

    #[tokio::test]
    async fn when_getting_absent_workspace_then_not_found_propagates() {
        let mut rpc = MockDataformRpc::new();
        rpc.expect_get_workspace().times(1).returning(|name| Err(Error::NotFound { resource: name.to_owned() }));

        let result = client(rpc).get_workspace("main", "gone").await;

        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn when_listing_workspaces_then_parent_is_repository_path() {
        let mut rpc = MockDataformRpc::new();
        rpc.expect_list_workspaces()
            .withf(|parent, _| parent == REPOSITORY_PATH)
            .times(1)
            .returning(|_, _| {
                Ok(ListWorkspacesResponse {
                    workspaces: vec![Workspace { name: WORKSPACE_PATH.to_owned() }],
                    next_page_token: None,
                })
            });

        let workspaces = client(rpc).list_workspaces("main").await.expect("listing should succeed");

        assert_eq!(workspaces.len(), 1);
    }

    #[tokio::test]
    async fn when_creating_workflow_invocation_then_compilation_result_is_referenced() {
        let mut rpc = MockDataformRpc::new();
        rpc.expect_create_workflow_invocation()
            .withf(|parent, invocation| {
                parent == REPOSITORY_PATH
                    && invocation.compilation_result == "projects/acme/locations/us-east1/repositories/main/compilationResults/cr1"
                    && invocation.invocation_config.as_ref().is_some_and(|c| c.included_tags == ["nested"])
            })
            .times(1)
            .returning(|parent, invocation| {
                Ok(WorkflowInvocation {
                    name: Some(format!("{parent}/workflowInvocations/inv123")),
                    ..invocation.clone()
                })
            });

        let invocation = client(rpc)
            .create_workflow_invocation(
                "main",
                "projects/acme/locations/us-east1/repositories/main/compilationResults/cr1",
                InvocationConfig { included_tags: vec!["nested".to_owned()], ..Default::default() },
            )
            .await
            .expect("invocation should be created");

        assert!(invocation.name.is_some());
    }

    #[tokio::test]
    async fn when_running_remotely_then_compile_and_invoke_are_chained() {
        let mut rpc = MockDataformRpc::new();
        rpc.expect_create_compilation_result()
            .withf(|_, result| result.workspace.as_deref() == Some(WORKSPACE_PATH))
            .times(1)
            .returning(|parent, result| {
                Ok(CompilationResult { name: Some(format!("{parent}/compilationResults/cr1")), ..result.clone() })
            });
        rpc.expect_create_workflow_invocation()
            .withf(|_, invocation| invocation.compilation_result.ends_with("/compilationResults/cr1"))
            .times(1)
            .returning(|parent, invocation| {
                Ok(WorkflowInvocation {
                    name: Some(format!("{parent}/workflowInvocations/inv123")),
                    ..invocation.clone()
                })
            });

        let run = client(rpc)
            .run_remote(
                "main",
                CompilationSource::Workspace("dev".to_owned()),
                CodeCompilationConfig::default(),
                InvocationConfig::default(),
            )
            .await
            .expect("run should succeed");

        assert_eq!(run.id, "inv123");
        assert_eq!(
            run.url,
            "https://console.cloud.google.com/bigquery/dataform/locations/us-east1/repositories/main/workflows/inv123?project=acme"
        );
    }

    #[test]
    fn workflow_invocation_url_is_pure_formatting() {
        let client = client(MockDataformRpc::new());
        assert_eq!(
            client.workflow_invocation_url("repo1", "inv123"),
            "https://console.cloud.google.com/bigquery/dataform/locations/us-east1/repositories/repo1/workflows/inv123?project=acme"
        );
    }
}
