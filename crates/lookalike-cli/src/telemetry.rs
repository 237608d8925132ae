//! Log subscriber setup.
//!
//! Logs go to stderr; stdout is reserved for command output. Verbosity comes
//! from `RUST_LOG` and falls back to `info`:
//!
//! ```bash
//! RUST_LOG=lookalike_engine=trace,lookalike_postgres=debug lookalike search --text "sunset"
//! ```

use std::io::{self, IsTerminal};

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::LogFormat;

const DEFAULT_DIRECTIVE: &str = "info";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the global subscriber. Fails if one is already set.
pub(crate) fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(DEFAULT_DIRECTIVE).context("invalid default log filter")?,
    };

    tracing_subscriber::registry()
        .with(output_layer(format))
        .with(filter)
        .try_init()
        .context("cannot install the log subscriber")
}

fn output_layer(format: LogFormat) -> BoxedLayer {
    let base = fmt::layer().with_writer(io::stderr).with_target(true);

    match format {
        LogFormat::Text => base.with_ansi(io::stderr().is_terminal()).boxed(),
        LogFormat::Json => base.json().with_ansi(false).boxed(),
    }
}
