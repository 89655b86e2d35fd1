use anyhow::Result;
use clap::Parser;
use mcp_github_org::config::{self, Config, TokenSource};
use mcp_github_org::github::{GithubClient, DEFAULT_API_URL};
use mcp_github_org::server;
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::EnvFilter;

/// MCP server for GitHub organizations: members, issues, and a few helpers
#[derive(Parser)]
#[command(name = "mcp-github-org", version, about)]
struct Cli {
    /// GitHub personal access token.
    /// Can also be set via the PAT environment variable.
    #[arg(long)]
    token: Option<String>,

    /// Read GitHub token from an environment variable.
    /// Default: PAT, then GITHUB_TOKEN
    #[arg(long = "token-env")]
    token_env: Option<String>,

    /// GitHub API base URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Also serve the config://app resource and the code-request prompt
    #[arg(long)]
    extras: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let resolved = config::resolve_token(cli.token, cli.token_env.as_deref(), |name| {
        std::env::var(name).ok()
    });
    let (token, token_source) = match resolved {
        Some((t, source)) => (Some(t), Some(source)),
        None => (None, None),
    };
    let config = Config {
        token,
        token_source,
        api_url: cli.api_url,
        extras: cli.extras,
    };

    match &config.token_source {
        Some(TokenSource::Env(name)) => {
            tracing::info!(env = %name, "Read GitHub token from environment variable")
        }
        Some(TokenSource::Flag) => tracing::info!("Using GitHub token from --token"),
        None => tracing::warn!(
            "No GitHub token provided; requests are sent unauthenticated and API rate limits will be very restrictive"
        ),
    }

    let github = GithubClient::new(&config.api_url, config.token.as_deref())?;

    tracing::info!(
        authenticated = github.is_authenticated(),
        api_url = github.api_url(),
        extras = config.extras,
        "Starting mcp-github-org server"
    );

    let service = server::McpGithubOrgServer::new(github, config.extras);
    let running = service.serve(stdio()).await?;
    running.waiting().await?;

    Ok(())
}
