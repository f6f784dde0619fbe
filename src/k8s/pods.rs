use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use http_body_util::BodyExt;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Patch, PatchParams};
use kube::client::Body;
use kube::{Api, Client, Resource};
use kube_runtime::watcher;
use serde::Deserialize;

use crate::errors::{AppError, AppResult};
use crate::k8s::PodApi;
use crate::types::PodEvent;

const EPHEMERAL_CONTAINERS: &str = "ephemeralcontainers";

pub struct KubePods {
    client: Client,
    api: Api<Pod>,
    namespace: String,
}

impl KubePods {
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client.clone(), namespace),
            client,
            namespace: namespace.to_string(),
        }
    }
}

#[async_trait]
impl PodApi for KubePods {
    async fn get(&self, name: &str) -> AppResult<Pod> {
        match self.api.get(name).await {
            Ok(pod) => Ok(pod),
            Err(kube::Error::Api(e)) if e.code == 404 => Err(AppError::NotFound(e.message)),
            Err(e) => Err(e.into()),
        }
    }

    // Sent by hand rather than through `Api::patch_subresource` because the
    // error path needs `details.name` from the server's Status body.
    async fn patch_ephemeral_containers(
        &self,
        name: &str,
        patch: &serde_json::Value,
    ) -> AppResult<()> {
        let url = Pod::url_path(&(), Some(&self.namespace));
        let request = kube::core::Request::new(url)
            .patch_subresource(
                EPHEMERAL_CONTAINERS,
                name,
                &PatchParams::default(),
                &Patch::Strategic(patch),
            )
            .map_err(kube::Error::BuildRequest)?;

        tracing::debug!(pod = %name, namespace = %self.namespace, "patching ephemeral containers");

        let response = self.client.send(request.map(Body::from)).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| AppError::Other(format!("failed to read patch response: {e}")))?
            .to_bytes();

        Err(patch_failure(status.as_u16(), &body))
    }

    fn watch(&self, name: &str) -> BoxStream<'static, AppResult<PodEvent>> {
        let config = watcher::Config::default().fields(&format!("metadata.name={name}"));

        watcher(self.api.clone(), config)
            .filter_map(|item| async move { translate(item) })
            .boxed()
    }
}

/// Subset of a `meta/v1` Status body.
#[derive(Debug, Default, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    details: Option<StatusDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct StatusDetails {
    #[serde(default)]
    name: String,
}

/// Classify a failed ephemeralcontainers patch.
///
/// A NotFound that names no resource means the subresource itself is
/// missing, i.e. the cluster does not serve ephemeral containers. This is a
/// heuristic: the API server has no dedicated code for it, so a future
/// server could change the shape and this would silently stop matching.
fn patch_failure(code: u16, body: &[u8]) -> AppError {
    let status: ApiStatus = serde_json::from_slice(body).unwrap_or_default();
    let message = if status.message.is_empty() {
        String::from_utf8_lossy(body).trim().to_string()
    } else {
        status.message
    };

    let not_found = code == 404 || status.reason == "NotFound";
    let unnamed = status.details.as_ref().map_or(true, |d| d.name.is_empty());

    if not_found && unnamed {
        return AppError::EphemeralContainersDisabled(message);
    }

    kube::Error::Api(kube::error::ErrorResponse {
        status: "Failure".to_string(),
        message,
        reason: status.reason,
        code,
    })
    .into()
}

fn translate(item: Result<watcher::Event<Pod>, watcher::Error>) -> Option<AppResult<PodEvent>> {
    match item {
        Ok(watcher::Event::Apply(pod)) | Ok(watcher::Event::InitApply(pod)) => {
            Some(Ok(PodEvent::Pod(Box::new(pod))))
        }
        Ok(watcher::Event::Delete(_)) => Some(Ok(PodEvent::Deleted)),
        Ok(watcher::Event::Init) | Ok(watcher::Event::InitDone) => None,
        // Expired resourceVersion; the watcher relists by itself.
        Err(watcher::Error::WatchError(e)) if e.code == 410 => {
            tracing::debug!(error = %e.message, "watch expired, relisting");
            None
        }
        Err(watcher::Error::WatchFailed(kube::Error::SerdeError(e))) => {
            Some(Ok(PodEvent::Other(e.to_string())))
        }
        Err(e) => Some(Err(e.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_not_found_means_ephemeral_containers_are_disabled() {
        let body = br#"{"kind":"Status","apiVersion":"v1","status":"Failure",
            "message":"the server could not find the requested resource",
            "reason":"NotFound","details":{},"code":404}"#;
        let err = patch_failure(404, body);
        assert!(matches!(
            err,
            AppError::EphemeralContainersDisabled(ref m) if m == "the server could not find the requested resource"
        ));
    }

    #[test]
    fn named_not_found_is_a_regular_api_error() {
        let body = br#"{"kind":"Status","status":"Failure","message":"pods \"web-1\" not found",
            "reason":"NotFound","details":{"name":"web-1","kind":"pods"},"code":404}"#;
        let err = patch_failure(404, body);
        assert!(matches!(err, AppError::Kube(kube::Error::Api(ref e)) if e.code == 404 && e.message.contains("web-1")));
    }

    #[test]
    fn other_failures_keep_code_and_reason() {
        let body = br#"{"kind":"Status","status":"Failure","message":"forbidden",
            "reason":"Forbidden","details":{"name":"web-1"},"code":403}"#;
        let err = patch_failure(403, body);
        assert!(matches!(err, AppError::Kube(kube::Error::Api(ref e)) if e.code == 403 && e.reason == "Forbidden"));
    }

    #[test]
    fn non_json_not_found_body_is_still_classified() {
        let err = patch_failure(404, b"404 page not found\n");
        assert!(matches!(err, AppError::EphemeralContainersDisabled(ref m) if m == "404 page not found"));
    }

    #[test]
    fn watch_events_are_tagged() {
        let pod = Pod::default();
        assert!(matches!(
            translate(Ok(watcher::Event::Apply(pod.clone()))),
            Some(Ok(PodEvent::Pod(_)))
        ));
        assert!(matches!(
            translate(Ok(watcher::Event::InitApply(pod.clone()))),
            Some(Ok(PodEvent::Pod(_)))
        ));
        assert!(matches!(
            translate(Ok(watcher::Event::Delete(pod))),
            Some(Ok(PodEvent::Deleted))
        ));
        assert!(translate(Ok(watcher::Event::Init)).is_none());
        assert!(translate(Ok(watcher::Event::InitDone)).is_none());
    }

    #[test]
    fn undecodable_objects_are_protocol_violations() {
        let serde_err = serde_json::from_str::<Pod>("[]").unwrap_err();
        let item = Err(watcher::Error::WatchFailed(kube::Error::SerdeError(serde_err)));
        assert!(matches!(translate(item), Some(Ok(PodEvent::Other(_)))));
    }
}
