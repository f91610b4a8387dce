//! Structured logging bootstrap using `tracing`.

use std::io::IsTerminal;

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber once; `RUST_LOG` overrides the `info` default.
///
/// Output goes to stderr so `pair` can print its JSON report on stdout. Colour is
/// dropped when stderr is not a terminal.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let directives = env_filter.to_string();
    let stderr_is_tty = std::io::stderr().is_terminal();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(stderr_is_tty)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(fmt_layer).try_init()?;

    tracing::debug!(%directives, ansi = stderr_is_tty, "tracing initialised");
    Ok(())
}
