pub mod cli;
pub mod error;
pub mod types;
pub mod netutils;
pub mod scan;
pub mod probes;

pub use scan::run;

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber; `RUST_LOG` overrides the `warn` default.
/// Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
