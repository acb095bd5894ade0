use job_portal_mcp::{McpServer, init_logging};

fn main() -> anyhow::Result<()> {
    init_logging();
    let server = McpServer::new()?;
    server.serve_stdio()?;
    Ok(())
}
