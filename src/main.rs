use std::process;

use kube_pdebug::{cli::Cli, config::Target, errors};

#[tokio::main]
async fn main() {
    let cli = <Cli as clap::Parser>::parse();
    kube_pdebug::logging::init(cli.verbose);

    let result = match Target::try_from(cli) {
        Ok(target) => kube_pdebug::run(target).await,
        Err(e) => Err(e),
    };

    // Exit explicitly: a relay blocked on local stdin would otherwise keep
    // the runtime from shutting down.
    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            errors::report(&e);
            process::exit(1);
        }
    }
}
