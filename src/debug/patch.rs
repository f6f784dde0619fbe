use k8s_openapi::api::core::v1::{Capabilities, EnvVar, EphemeralContainer, SecurityContext};

use crate::config::Target;
use crate::debug::caps::normalize_capabilities;
use crate::errors::AppResult;

/// Same default the API server applies; set explicitly so the patch is complete.
const TERMINATION_MESSAGE_READ_FILE: &str = "File";

pub fn build_ephemeral_container(target: &Target, name: &str) -> EphemeralContainer {
    let env = (!target.env.is_empty()).then(|| {
        target
            .env
            .iter()
            .map(|(k, v)| EnvVar {
                name: k.clone(),
                value: Some(v.clone()),
                ..Default::default()
            })
            .collect()
    });

    EphemeralContainer {
        name: name.to_string(),
        image: Some(target.image.clone()),
        command: Some(target.args.clone()),
        env,
        security_context: Some(SecurityContext {
            capabilities: Some(Capabilities {
                add: non_empty(normalize_capabilities(&target.cap_add)),
                drop: non_empty(normalize_capabilities(&target.cap_drop)),
            }),
            // Always sent, even when false.
            privileged: Some(target.privileged),
            ..Default::default()
        }),
        stdin: Some(target.stdin),
        tty: Some(target.tty),
        termination_message_policy: Some(TERMINATION_MESSAGE_READ_FILE.to_string()),
        target_container_name: Some(target.target_container.clone()),
        ..Default::default()
    }
}

/// Strategic merge patch for the `ephemeralcontainers` subresource.
pub fn build_patch(target: &Target, name: &str) -> AppResult<serde_json::Value> {
    let container = serde_json::to_value(build_ephemeral_container(target, name))?;
    Ok(serde_json::json!({
        "spec": {
            "ephemeralContainers": [container]
        }
    }))
}

fn non_empty(v: Vec<String>) -> Option<Vec<String>> {
    (!v.is_empty()).then_some(v)
}
