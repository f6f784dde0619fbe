pub mod cli;
pub mod config;
pub mod debug;
pub mod errors;
pub mod k8s;
pub mod logging;
pub mod podwatch;
pub mod reference;
pub mod shutdown;
pub mod types;
pub mod workflow;

use std::io;

use crate::config::Target;
use crate::errors::AppResult;
use crate::k8s::attach::KubeAttacher;
use crate::k8s::client::{infer_config, make_client, resolve_namespace};
use crate::k8s::pods::KubePods;
use crate::shutdown::{until_cancelled, Shutdown};
use crate::workflow::Debugger;

pub async fn run(target: Target) -> AppResult<()> {
    // From here on Ctrl+C / SIGTERM cancel the token instead of killing us.
    let shutdown = Shutdown::new();
    let signals = shutdown.spawn_signal_listener();
    let cancel = shutdown.token();

    // Exec credential plugins can block here, so this is cancellable too.
    let kube_config = until_cancelled(&cancel, infer_config()).await?;
    let namespace = resolve_namespace(target.namespace.as_deref(), &kube_config);
    let client = make_client(kube_config)?;

    tracing::debug!(
        namespace = %namespace,
        pod = %target.pod,
        target = %target.target_container,
        image = %target.image,
        "starting debug session"
    );

    let pods = KubePods::new(client.clone(), &namespace);
    let attacher = KubeAttacher::new(client, &namespace);

    let mut debugger = Debugger::new(pods, attacher, io::stdout());
    let result = debugger.run(&target, &namespace, &cancel).await;

    signals.abort();
    result
}
