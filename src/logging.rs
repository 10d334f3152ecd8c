use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize logging for the binaries.
///
/// Defaults to `info` (`debug` when `verbose` is set) unless overridden by
/// the `MURMUR_LOG` env filter. Logs go to stderr so transcription output
/// piped from stdout stays clean. Safe to call more than once.
pub fn init(verbose: bool) {
    let default_level = if verbose {
        tracing::level_filters::LevelFilter::DEBUG
    } else {
        tracing::level_filters::LevelFilter::INFO
    };

    let filter = EnvFilter::builder()
        .with_env_var("MURMUR_LOG")
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init(false);
        init(true);
    }
}
