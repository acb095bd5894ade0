mod config;
mod envelope;
mod error;
pub mod protocol;
mod server;
mod transport;

pub use config::{SeedMode, ServerConfig, Transport, DEFAULT_HTTP_ADDR};
pub use envelope::{ToolError, ToolResponse};
pub use error::ServerError;
pub use server::McpServer;

use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber. `JOB_PORTAL_LOG` wins over `RUST_LOG`.
/// Stdout stays reserved for protocol frames.
pub fn init_logging() {
    let filter = std::env::var("JOB_PORTAL_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
