use mcp_prompt_coach::config::ServerConfig;
use mcp_prompt_coach::server::McpServer;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // stdout carries the protocol; logs go to stderr.
    env_logger::init();

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("mcp-prompt-coach: configuration error: {e}");
            std::process::exit(1);
        }
    };

    let mut server = McpServer::new(config);
    if let Err(e) = server.run().await {
        eprintln!("mcp-prompt-coach: fatal error: {e}");
        std::process::exit(1);
    }
}
