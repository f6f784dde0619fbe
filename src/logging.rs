use std::io;

use tracing_subscriber::EnvFilter;

/// Verbosity 0 logs errors only, anything higher logs at debug.
/// `RUST_LOG` overrides both.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();
}

fn default_directive(verbosity: u8) -> &'static str {
    if verbosity > 0 {
        "debug"
    } else {
        "error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_verbosity_turns_on_debug() {
        assert_eq!(default_directive(0), "error");
        assert_eq!(default_directive(1), "debug");
        assert_eq!(default_directive(3), "debug");
    }
}
