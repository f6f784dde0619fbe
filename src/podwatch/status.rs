use k8s_openapi::api::core::v1::{ContainerStatus, Pod};

use crate::types::ContainerPhase;

/// First status named `name`, scanning init, regular, then ephemeral statuses.
pub fn container_status<'a>(pod: &'a Pod, name: &str) -> Option<&'a ContainerStatus> {
    let status = pod.status.as_ref()?;

    [
        status.init_container_statuses.as_deref(),
        status.container_statuses.as_deref(),
        status.ephemeral_container_statuses.as_deref(),
    ]
    .into_iter()
    .flatten()
    .flat_map(|statuses| statuses.iter())
    .find(|s| s.name == name)
}

pub fn container_phase(status: &ContainerStatus) -> ContainerPhase {
    let Some(state) = status.state.as_ref() else {
        return ContainerPhase::Waiting { message: None };
    };

    if state.running.is_some() {
        ContainerPhase::Running
    } else if state.terminated.is_some() {
        ContainerPhase::Terminated
    } else {
        ContainerPhase::Waiting {
            message: state
                .waiting
                .as_ref()
                .and_then(|w| w.message.clone())
                .filter(|m| !m.is_empty()),
        }
    }
}

/// Whether `spec.containers` (regular containers only) has `name`.
pub fn has_container(pod: &Pod, name: &str) -> bool {
    pod.spec
        .as_ref()
        .is_some_and(|s| s.containers.iter().any(|c| c.name == name))
}
