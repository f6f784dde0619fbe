//! Seams between the debug workflow and the Kubernetes API.
//!
//! The workflow only talks to [`PodApi`] and [`Attacher`], so it can be
//! driven by mocks in tests and by `kube` in production.

pub mod attach;
pub mod client;
pub mod pods;

use async_trait::async_trait;
use futures::stream::BoxStream;
use k8s_openapi::api::core::v1::Pod;

#[cfg(test)]
use mockall::automock;

use crate::errors::AppResult;
use crate::types::{PodEvent, StreamOptions};

/// Namespaced pod operations needed by the workflow.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PodApi: Send + Sync {
    /// Fetch a pod. A missing pod is `AppError::NotFound` with the server's message.
    async fn get(&self, name: &str) -> AppResult<Pod>;

    /// Strategic-merge `patch` into the pod's `ephemeralcontainers` subresource.
    async fn patch_ephemeral_containers(
        &self,
        name: &str,
        patch: &serde_json::Value,
    ) -> AppResult<()>;

    /// List-then-watch a single pod by name.
    fn watch(&self, name: &str) -> BoxStream<'static, AppResult<PodEvent>>;
}

/// Relays local stdio to a running container until the session ends.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Attacher: Send + Sync {
    async fn attach(&self, pod: &str, container: &str, opts: StreamOptions) -> AppResult<()>;
}
