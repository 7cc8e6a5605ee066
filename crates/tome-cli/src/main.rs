use anyhow::Result;
use clap::Parser;
use console::style;
use dotenv::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tome::agent::Agent;
use tome::providers::anthropic::AnthropicProvider;
use tome::providers::configs::AnthropicProviderConfig;
use tome::tools::save::SaveTool;
use tome::tools::search::SearchTool;
use tome::tools::toolkit::Toolkit;

mod session;

use session::Session;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Anthropic API key (can also be set via ANTHROPIC_API_KEY environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Anthropic API host
    #[arg(long)]
    host: Option<String>,

    /// Also offer the web search tool to the model
    #[arg(long)]
    with_search: bool,

    /// Also offer the save_text tool, appending to the given file
    #[arg(long, value_name = "FILE")]
    save_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tome=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match cli.api_key {
        Some(api_key) => AnthropicProviderConfig::new(api_key),
        None => AnthropicProviderConfig::from_env()?,
    };
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(host) = cli.host {
        config.host = host;
    }

    let provider = AnthropicProvider::new(config)?;

    let mut toolkit = Toolkit::new();
    if cli.with_search {
        toolkit = toolkit.with_search(SearchTool::new());
    }
    if let Some(path) = cli.save_file {
        toolkit = toolkit.with_save(SaveTool::with_path(path));
    }

    let agent = Agent::new(Box::new(provider), toolkit);

    println!(
        "tome {}",
        style("- type \"exit\" to end the session").dim()
    );
    println!();

    Session::new(agent).start().await
}
