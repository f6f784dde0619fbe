use k8s_openapi::api::core::v1::Pod;

/// The debug container once its name is settled. Every lookup after the
/// patch must use exactly this identity.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DebugSession {
    pub namespace: String,
    pub pod: String,
    pub container: String,
}

/// One delivery from a single-pod watch.
#[derive(Clone, Debug)]
pub enum PodEvent {
    Pod(Box<Pod>),
    Deleted,
    /// The server sent something that is not a pod.
    Other(String),
}

/// Lifecycle of one container as reported in pod status.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ContainerPhase {
    Waiting { message: Option<String> },
    Running,
    Terminated,
}

/// How the attach session wires local stdio.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StreamOptions {
    pub stdin: bool,
    pub tty: bool,
    pub quiet: bool,
}
