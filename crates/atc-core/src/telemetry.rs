use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directives for the given level, used when `RUST_LOG` is unset.
pub fn default_directives(level: &str) -> String {
    format!(
        "atc_api={level},atc_ai={level},atc_cli={level},tower_http={level}",
        level = level
    )
}

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init_tracing(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directives(level))),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
