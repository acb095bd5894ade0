use anyhow::Context;
use job_portal_mcp::{McpServer, ServerConfig, Transport, init_logging};

fn main() -> anyhow::Result<()> {
    init_logging();
    let config = ServerConfig::from_env().context("reading JOB_PORTAL_* configuration")?;
    let transport = config.transport;
    let addr = config.http_addr.clone();
    let server = McpServer::with_config(config).context("starting job portal server")?;
    match transport {
        Transport::Stdio => server.serve_stdio()?,
        Transport::Http => server
            .serve_http(&addr)
            .with_context(|| format!("serving http on {addr}"))?,
    }
    Ok(())
}
