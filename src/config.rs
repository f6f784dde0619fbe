use crate::cli::Cli;
use crate::errors::{AppError, AppResult};
use crate::reference;

/// What the user asked for. Built once from the CLI and only ever borrowed.
#[derive(Clone, Debug)]
pub struct Target {
    pub pod: String,
    /// Container whose namespaces the debug container joins.
    pub target_container: String,
    /// Debug container name; generated by the workflow when `None`.
    pub container: Option<String>,
    pub image: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cap_add: Vec<String>,
    pub cap_drop: Vec<String>,
    pub privileged: bool,
    pub stdin: bool,
    pub tty: bool,
    pub quiet: bool,
    pub attach: bool,
    pub namespace: Option<String>,
}

impl Target {
    /// Attach after creating the container (`--attach`, implied by `-i`).
    pub fn wants_attach(&self) -> bool {
        self.stdin || self.attach
    }
}

impl TryFrom<Cli> for Target {
    type Error = AppError;

    fn try_from(cli: Cli) -> AppResult<Self> {
        if !reference::is_valid_image(&cli.image) {
            return Err(AppError::Cli(format!(
                "invalid image name {:?}: invalid reference format",
                cli.image
            )));
        }

        if cli.tty && !cli.interactive {
            return Err(AppError::Cli(
                "-i/--stdin is required for containers with -t/--tty=true".to_string(),
            ));
        }

        let env = parse_env(&cli.env)?;

        Ok(Self {
            pod: cli.pod,
            target_container: cli.target,
            container: cli.container.filter(|c| !c.is_empty()),
            image: cli.image,
            args: cli.args,
            env,
            cap_add: cli.cap_add,
            cap_drop: cli.cap_drop,
            privileged: cli.privileged,
            stdin: cli.interactive,
            tty: cli.tty,
            quiet: cli.quiet,
            attach: cli.attach,
            namespace: cli.namespace.filter(|ns| !ns.is_empty()),
        })
    }
}

fn parse_env(pairs: &[String]) -> AppResult<Vec<(String, String)>> {
    pairs
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| match p.split_once('=') {
            Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
            _ => Err(AppError::Cli(format!(
                "invalid environment variable {p:?}: expected KEY=VALUE"
            ))),
        })
        .collect()
}
