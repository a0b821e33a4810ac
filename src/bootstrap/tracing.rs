//! Tracing subscriber setup.
//!
//! Everything logs through `tracing`; this installs a single `fmt` layer
//! filtered by `RUST_LOG`, or by the defaults below when it is unset.

use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Default filter directives.
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    vec![
        "info".to_string(),
        if is_dev { "nf_infra=debug" } else { "nf_infra=info" }.to_string(),
        if is_dev { "nf_app=debug" } else { "nf_app=info" }.to_string(),
    ]
}

/// Initialize the global tracing subscriber.
///
/// Log lines go to stderr so command output on stdout stays clean.
///
/// # Errors
///
/// Returns `Err` if a global subscriber is already registered.
pub fn init_tracing_subscriber() -> anyhow::Result<()> {
    let directives = build_filter_directives(is_development());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives.join(",")));

    let stderr_layer = fmt::layer()
        .with_timer(fmt::time::ChronoLocal::new(
            "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        ))
        .with_level(true)
        .with_target(true)
        .with_ansi(cfg!(not(test)))
        .with_writer(std::io::stderr);

    registry().with(env_filter).with(stderr_layer).try_init()?;
    Ok(())
}
