//! The debug workflow: check the pod, add the ephemeral container if it is
//! not there yet, wait for it to start and attach.
//!
//! Nothing here retries. Every failure is returned to the caller, which
//! reports it and exits; running the tool again is the retry.

use std::io::Write;

use k8s_openapi::api::core::v1::Pod;
use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::config::Target;
use crate::debug::patch::build_patch;
use crate::errors::{AppError, AppResult};
use crate::k8s::{Attacher, PodApi};
use crate::podwatch::status::{container_phase, container_status, has_container};
use crate::podwatch::watcher::wait_for_container;
use crate::shutdown::until_cancelled;
use crate::types::{ContainerPhase, DebugSession, StreamOptions};

const DEBUG_NAME_PREFIX: &str = "debugger-";
const DEBUG_NAME_SUFFIX_LEN: usize = 5;
// No vowels, no easily confused characters.
const DEBUG_NAME_ALPHABET: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";

/// `debugger-` plus a short random suffix. Collisions are possible and left
/// to the API server to reject.
pub fn generate_debug_name() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..DEBUG_NAME_SUFFIX_LEN)
        .map(|_| DEBUG_NAME_ALPHABET[rng.gen_range(0..DEBUG_NAME_ALPHABET.len())] as char)
        .collect();
    format!("{DEBUG_NAME_PREFIX}{suffix}")
}

pub struct Debugger<P, A, W> {
    pods: P,
    attacher: A,
    /// Informational notices (stdout in the binary).
    out: W,
}

impl<P, A, W> Debugger<P, A, W>
where
    P: PodApi,
    A: Attacher,
    W: Write,
{
    pub fn new(pods: P, attacher: A, out: W) -> Self {
        Self {
            pods,
            attacher,
            out,
        }
    }

    pub async fn run(
        &mut self,
        target: &Target,
        namespace: &str,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        if !target.quiet {
            self.notice(&format!(
                "Targeting container {:?}. If you don't see processes from this container it may be because the container runtime doesn't support this feature.",
                target.target_container
            ))?;
        }

        let pod = until_cancelled(cancel, self.pods.get(&target.pod)).await?;

        if !has_container(&pod, &target.target_container) {
            return Err(AppError::Cli(format!(
                "Pod \"{}\" does not have a container called \"{}\"",
                target.pod, target.target_container
            )));
        }

        let container = match &target.container {
            Some(name) => name.clone(),
            None => {
                let name = generate_debug_name();
                if !target.quiet {
                    self.notice(&format!("Defaulting debug container name to {name}."))?;
                }
                name
            }
        };

        let session = DebugSession {
            namespace: namespace.to_string(),
            pod: target.pod.clone(),
            container,
        };

        self.ensure_debug_container(target, &pod, &session, cancel)
            .await?;

        if target.wants_attach() {
            self.wait_and_attach(target, &session, cancel).await?;
        }

        Ok(())
    }

    /// Add the ephemeral container unless the pod already has a container by
    /// that name. Returns whether a patch was sent.
    pub async fn ensure_debug_container(
        &self,
        target: &Target,
        pod: &Pod,
        session: &DebugSession,
        cancel: &CancellationToken,
    ) -> AppResult<bool> {
        if has_container(pod, &session.container) {
            tracing::debug!(
                namespace = %session.namespace,
                pod = %session.pod,
                container = %session.container,
                "container already present, skipping patch"
            );
            return Ok(false);
        }

        let patch = build_patch(target, &session.container)?;
        tracing::debug!(patch = %patch, "ephemeral container patch");

        until_cancelled(
            cancel,
            self.pods.patch_ephemeral_containers(&session.pod, &patch),
        )
        .await?;

        tracing::debug!(
            namespace = %session.namespace,
            pod = %session.pod,
            container = %session.container,
            "ephemeral container submitted"
        );
        Ok(true)
    }

    async fn wait_and_attach(
        &mut self,
        target: &Target,
        session: &DebugSession,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        let events = self.pods.watch(&session.pod);
        let out = &mut self.out;
        let wait = wait_for_container(events, &session.container, target.quiet, |msg| {
            let _ = writeln!(out, "{msg}");
        });

        // Dropping the wait future closes the watch.
        let pod = until_cancelled(cancel, wait).await?;

        let status = container_status(&pod, &session.container).ok_or_else(|| {
            AppError::Other(format!(
                "failed to get status of container {:?}",
                session.container
            ))
        })?;
        if container_phase(status) == ContainerPhase::Terminated {
            return Err(AppError::ContainerTerminated(session.container.clone()));
        }

        let opts = StreamOptions {
            stdin: target.stdin,
            tty: target.tty,
            quiet: target.quiet,
        };

        until_cancelled(
            cancel,
            self.attacher.attach(&session.pod, &session.container, opts),
        )
        .await
    }

    fn notice(&mut self, msg: &str) -> AppResult<()> {
        writeln!(self.out, "{msg}")?;
        Ok(())
    }
}
