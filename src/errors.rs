use std::io;

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Bad user input. Reported as-is, without error context.
    #[error("{0}")]
    Cli(String),

    /// The server's own "not found" message.
    #[error("{0}")]
    NotFound(String),

    #[error("ephemeral containers are disabled for this cluster (error from server: {0:?}).")]
    EphemeralContainersDisabled(String),

    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    #[error("kubeconfig error: {0}")]
    Config(#[from] kube::config::InferConfigError),

    #[error("watch error: {0}")]
    Watch(#[from] kube_runtime::watcher::Error),

    #[error("watch did not return a pod: {0}")]
    Protocol(String),

    #[error("pod was deleted while waiting for container {0:?}")]
    PodDeleted(String),

    #[error("ephemeral container {0:?} terminated")]
    ContainerTerminated(String),

    #[error("interrupted")]
    Interrupted,

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Errors the user can act on directly; printed plainly instead of logged.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::Cli(_) | AppError::NotFound(_) | AppError::EphemeralContainersDisabled(_)
        )
    }
}

/// Single exit path for every failure: report once, the caller exits non-zero.
pub fn report(err: &AppError) {
    if err.is_user_facing() {
        println!("{err}");
    } else {
        tracing::error!(error = %err, details = ?err, "fatal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_input_errors_are_user_facing() {
        assert!(AppError::Cli("bad".into()).is_user_facing());
        assert!(AppError::NotFound("pods \"x\" not found".into()).is_user_facing());
        assert!(AppError::EphemeralContainersDisabled("404".into()).is_user_facing());
    }

    #[test]
    fn fatal_errors_are_logged() {
        assert!(!AppError::Protocol("ConfigMap".into()).is_user_facing());
        assert!(!AppError::PodDeleted("web-1".into()).is_user_facing());
        assert!(!AppError::Interrupted.is_user_facing());
    }

    #[test]
    fn disabled_message_quotes_server_error() {
        let err = AppError::EphemeralContainersDisabled("the server could not find".into());
        assert_eq!(
            err.to_string(),
            "ephemeral containers are disabled for this cluster (error from server: \"the server could not find\")."
        );
    }
}
