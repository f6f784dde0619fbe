use clap::Parser;

// kubectl pdebug web-1 --image busybox:1.28 --target app -it -- sh
#[derive(Debug, Parser)]
#[command(
    name = "kubectl pdebug",
    version,
    about = "Similar to kubectl debug but supporting privileged containers"
)]
pub struct Cli {
    /// Pod to debug
    #[arg(value_name = "POD")]
    pub pod: String,

    /// Command and args
    #[arg(
        value_name = "ARGS",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub args: Vec<String>,

    /// Container image to use for debug container.
    #[arg(long = "image")]
    pub image: String,

    /// When using an ephemeral container, target processes in this container name.
    #[arg(long = "target")]
    pub target: String,

    /// If present, the namespace scope for this CLI request
    #[arg(short = 'n', long = "namespace")]
    pub namespace: Option<String>,

    /// Container name to use for debug container.
    #[arg(short = 'c', long = "container")]
    pub container: Option<String>,

    /// Environment variables to set in the container (KEY=VALUE,...).
    #[arg(long = "env", value_delimiter = ',')]
    pub env: Vec<String>,

    /// If true, wait for the container to start running, and then attach as if
    /// 'kubectl attach ...' were called. Implied by -i/--stdin.
    #[arg(long = "attach", default_value_t = false)]
    pub attach: bool,

    /// Keep stdin open on the container(s) in the pod, even if nothing is attached.
    #[arg(short = 'i', long = "interactive", visible_alias = "stdin", default_value_t = false)]
    pub interactive: bool,

    /// Allocate a TTY for the debugging container.
    #[arg(short = 't', long = "tty", default_value_t = false)]
    pub tty: bool,

    /// If true, suppress informational messages.
    #[arg(short = 'q', long = "quiet", default_value_t = false)]
    pub quiet: bool,

    /// Give extended privileges to this container
    #[arg(long = "privileged", default_value_t = false)]
    pub privileged: bool,

    /// Add Linux capabilities
    #[arg(long = "cap-add", value_delimiter = ',')]
    pub cap_add: Vec<String>,

    /// Drop Linux capabilities
    #[arg(long = "cap-drop", value_delimiter = ',')]
    pub cap_drop: Vec<String>,

    /// Number for the log level verbosity
    #[arg(short = 'v', long = "verbose", default_value_t = 0)]
    pub verbose: u8,
}
