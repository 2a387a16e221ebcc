//! Typed client for the Google Cloud Dataform administrative API.
//!
//! The crate is a thin convenience layer: [`client::DataformClient`] builds
//! resource paths from a project/location pair, enforces the
//! workspace-XOR-git-commitish invariant on compilation requests, masks the
//! benign races around workspace creation and deletion, and delegates
//! everything else to the [`rpc::DataformRpc`] boundary unchanged.

pub mod client;
pub mod error;
pub mod paths;
pub mod rpc;
pub mod types;

pub use client::{CompilationSource, DataformClient, WorkflowRun};
pub use error::{Error, Result};
pub use rpc::{DataformRpc, HttpDataformRpc, DEFAULT_ENDPOINT};
pub use types::{
    CodeCompilationConfig, CommitAuthor, CompilationError, CompilationResult, CompilationResultAction,
    InvocationConfig, Repository, Target, Workspace, WorkflowInvocation, WorkflowInvocationState,
};
