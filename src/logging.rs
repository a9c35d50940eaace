use tracing_subscriber::{EnvFilter, fmt};

/// Level used when neither `--log` nor `RUST_LOG` is given.
pub const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber, writing to stderr so that command output on stdout stays clean.
///
/// `filter` takes precedence over `RUST_LOG`. A second call is a no-op.
pub fn init(filter: Option<&str>) {
    let env_filter = match filter {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|err| {
            eprintln!("invalid log filter '{directives}': {err}, using {DEFAULT_FILTER}");
            EnvFilter::new(DEFAULT_FILTER)
        }),
        None => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
        }
    };

    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init(Some("debug"));
        init(Some("not a [valid filter"));
        tracing::debug!("still alive");
    }
}
