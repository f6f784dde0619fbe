use futures::{pin_mut, Stream, StreamExt};
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;

use crate::errors::{AppError, AppResult};
use crate::podwatch::status::{container_phase, container_status};
use crate::types::{ContainerPhase, PodEvent};

/// Consume `events` until `container` is running or terminated and return
/// the pod snapshot that showed it.
///
/// Waiting messages are handed to `notify` unless `quiet`. A deleted pod, a
/// non-pod object or a stream error ends the wait with an error. There is no
/// timeout: the caller cancels by dropping this future.
pub async fn wait_for_container<S, F>(
    events: S,
    container: &str,
    quiet: bool,
    mut notify: F,
) -> AppResult<Pod>
where
    S: Stream<Item = AppResult<PodEvent>>,
    F: FnMut(&str),
{
    pin_mut!(events);

    while let Some(item) = events.next().await {
        let pod = match item? {
            PodEvent::Deleted => {
                tracing::debug!(container = %container, "watch received delete");
                return Err(AppError::PodDeleted(container.to_string()));
            }
            PodEvent::Other(desc) => return Err(AppError::Protocol(desc)),
            PodEvent::Pod(pod) => pod,
        };

        let Some(status) = container_status(&pod, container) else {
            continue;
        };

        let phase = container_phase(status);
        tracing::debug!(pod = %pod.name_any(), container = %container, ?phase, "container status");

        match phase {
            ContainerPhase::Running | ContainerPhase::Terminated => return Ok(*pod),
            ContainerPhase::Waiting { message: Some(msg) } if !quiet => {
                notify(&format!("container {container}: {msg}"));
            }
            ContainerPhase::Waiting { .. } => {}
        }
    }

    Err(AppError::Other(format!(
        "watch ended before container {container:?} started"
    )))
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;
    use crate::podwatch::status::tests::{pod, running, terminated, waiting, with_ephemeral};

    fn ev(statuses: Vec<k8s_openapi::api::core::v1::ContainerStatus>) -> AppResult<PodEvent> {
        Ok(PodEvent::Pod(Box::new(pod(&["app"], with_ephemeral(statuses)))))
    }

    #[tokio::test]
    async fn waits_through_absent_and_waiting_until_running() {
        let events = stream::iter(vec![
            ev(vec![]),
            ev(vec![waiting("dbg", Some("pulling image \"busybox\""))]),
            ev(vec![waiting("dbg", None)]),
            ev(vec![running("dbg")]),
        ]);

        let mut notices = Vec::new();
        let pod = wait_for_container(events, "dbg", false, |m| notices.push(m.to_string()))
            .await
            .unwrap();

        assert_eq!(notices, vec!["container dbg: pulling image \"busybox\"".to_string()]);
        let s = container_status(&pod, "dbg").unwrap();
        assert_eq!(container_phase(s), ContainerPhase::Running);
    }

    #[tokio::test]
    async fn terminated_also_ends_the_wait() {
        let events = stream::iter(vec![ev(vec![terminated("dbg")])]);
        let pod = wait_for_container(events, "dbg", false, |_| {}).await.unwrap();
        let s = container_status(&pod, "dbg").unwrap();
        assert_eq!(container_phase(s), ContainerPhase::Terminated);
    }

    #[tokio::test]
    async fn never_transitions_on_absent_status() {
        let events = stream::iter(vec![ev(vec![]), ev(vec![running("other")])]);
        let err = wait_for_container(events, "dbg", false, |_| {}).await.unwrap_err();
        assert!(matches!(err, AppError::Other(_)));
    }

    #[tokio::test]
    async fn quiet_suppresses_waiting_messages() {
        let events = stream::iter(vec![
            ev(vec![waiting("dbg", Some("pulling"))]),
            ev(vec![running("dbg")]),
        ]);
        let mut notices = 0;
        wait_for_container(events, "dbg", true, |_| notices += 1).await.unwrap();
        assert_eq!(notices, 0);
    }

    #[tokio::test]
    async fn delete_is_fatal_in_any_state() {
        let events = stream::iter(vec![
            ev(vec![waiting("dbg", Some("pulling"))]),
            Ok(PodEvent::Deleted),
            ev(vec![running("dbg")]),
        ]);
        let err = wait_for_container(events, "dbg", false, |_| {}).await.unwrap_err();
        assert!(matches!(err, AppError::PodDeleted(_)));

        let err = wait_for_container(stream::iter(vec![Ok(PodEvent::Deleted)]), "dbg", false, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PodDeleted(_)));
    }

    #[tokio::test]
    async fn non_pod_object_is_a_protocol_violation() {
        let events = stream::iter(vec![Ok(PodEvent::Other("ConfigMap".to_string()))]);
        let err = wait_for_container(events, "dbg", false, |_| {}).await.unwrap_err();
        assert!(matches!(err, AppError::Protocol(ref d) if d == "ConfigMap"));
    }

    #[tokio::test]
    async fn stream_errors_propagate() {
        let events = stream::iter(vec![Err(AppError::Other("boom".to_string()))]);
        let err = wait_for_container(events, "dbg", false, |_| {}).await.unwrap_err();
        assert!(matches!(err, AppError::Other(ref m) if m == "boom"));
    }
}
