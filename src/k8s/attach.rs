//! `kubectl attach` equivalent: relay local stdio to a container's
//! primary process over the attach subresource.

use async_trait::async_trait;
use futures::channel::mpsc::Sender;
use futures::SinkExt;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{AttachParams, AttachedProcess, TerminalSize};
use kube::{Api, Client};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::errors::{AppError, AppResult};
use crate::k8s::Attacher;
use crate::types::StreamOptions;

pub struct KubeAttacher {
    api: Api<Pod>,
}

impl KubeAttacher {
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
        }
    }
}

#[async_trait]
impl Attacher for KubeAttacher {
    async fn attach(&self, pod: &str, container: &str, opts: StreamOptions) -> AppResult<()> {
        let params = attach_params(container, opts);

        if !opts.quiet {
            eprintln!("If you don't see a command prompt, try pressing enter.");
        }

        let attached = self.api.attach(pod, &params).await?;
        tracing::debug!(pod = %pod, container = %container, tty = opts.tty, "attached");

        let _raw = if opts.tty {
            Some(RawMode::enable()?)
        } else {
            None
        };

        relay(attached, opts).await
    }
}

/// The attach transport rejects stderr alongside a tty; the tty carries both.
fn attach_params(container: &str, opts: StreamOptions) -> AttachParams {
    AttachParams::default()
        .container(container)
        .stdin(opts.stdin)
        .stdout(true)
        .stderr(!opts.tty)
        .tty(opts.tty)
}

async fn relay(mut attached: AttachedProcess, opts: StreamOptions) -> AppResult<()> {
    let remote_in = if opts.stdin { attached.stdin() } else { None };
    let remote_out = attached.stdout();
    let remote_err = attached.stderr();
    let resize = if opts.tty {
        attached.terminal_size()
    } else {
        None
    };

    let output = async {
        let out = copy_to(remote_out, tokio::io::stdout());
        let err = copy_to(remote_err, tokio::io::stderr());
        tokio::join!(out, err);
    };

    // Never finishes on its own; the session ends when the remote output closes.
    let input = async {
        tokio::join!(send_stdin(remote_in), forward_resizes(resize));
        std::future::pending::<()>().await;
    };

    tokio::select! {
        _ = output => {}
        _ = input => {}
    }

    attached
        .join()
        .await
        .map_err(|e| AppError::Other(format!("attach session failed: {e}")))
}

async fn copy_to<R, W>(reader: Option<R>, mut writer: W)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let Some(mut reader) = reader else {
        return;
    };
    if let Err(e) = tokio::io::copy(&mut reader, &mut writer).await {
        tracing::debug!(error = %e, "output relay ended");
    }
    let _ = writer.flush().await;
}

async fn send_stdin<W>(remote: Option<W>)
where
    W: AsyncWrite + Unpin,
{
    let Some(mut remote) = remote else {
        return;
    };
    let mut local = tokio::io::stdin();
    if let Err(e) = tokio::io::copy(&mut local, &mut remote).await {
        tracing::debug!(error = %e, "stdin relay ended");
    }
    // Dropping the writer closes the remote stdin.
    let _ = remote.shutdown().await;
}

async fn forward_resizes(tx: Option<Sender<TerminalSize>>) {
    let Some(mut tx) = tx else {
        return;
    };

    if let Some(size) = local_terminal_size() {
        if tx.send(size).await.is_err() {
            return;
        }
    }

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let Ok(mut winch) = signal(SignalKind::window_change()) else {
            return;
        };
        while winch.recv().await.is_some() {
            let Some(size) = local_terminal_size() else {
                continue;
            };
            if tx.send(size).await.is_err() {
                return;
            }
        }
    }
}

fn local_terminal_size() -> Option<TerminalSize> {
    crossterm::terminal::size()
        .ok()
        .map(|(width, height)| TerminalSize { width, height })
}

/// Puts the local terminal in raw mode until dropped.
struct RawMode;

impl RawMode {
    fn enable() -> AppResult<Self> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = crossterm::terminal::disable_raw_mode();
    }
}
