use clap::Parser;
use rig_panel::config::{self, PanelConfig};
use rig_panel::console::{self, ConsoleInput, ConsoleRenderer, OutputFormat};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rig_panel", about = "Console control panel for a remote camera rig")]
struct Args {
    /// URL of the page the panel is served from; the socket is `/ws` on the same host.
    #[arg(
        long,
        env = "RIG_PANEL_PAGE_URL",
        required_unless_present = "endpoint",
        conflicts_with = "endpoint"
    )]
    page_url: Option<String>,

    /// Direct `ws://` or `wss://` endpoint.
    #[arg(long, env = "RIG_PANEL_ENDPOINT")]
    endpoint: Option<String>,

    #[arg(long, env = "RIG_PANEL_RECONNECT_MS", default_value_t = 100)]
    reconnect_ms: u64,

    /// Wait between expanding the camera dropdown and showing its entries.
    #[arg(long, env = "RIG_PANEL_REVEAL_MS", default_value_t = 500)]
    reveal_ms: u64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let endpoint = match (args.page_url.as_deref(), args.endpoint.as_deref()) {
        (Some(page), _) => config::endpoint_from_page_url(page)?,
        (None, Some(endpoint)) => config::parse_endpoint(endpoint)?,
        (None, None) => return Err(anyhow::anyhow!("missing --page-url or --endpoint")),
    };
    let config = PanelConfig::new(endpoint)
        .with_reconnect_delay(Duration::from_millis(args.reconnect_ms))
        .with_reveal_delay(Duration::from_millis(args.reveal_ms));

    let panel = rig_panel::spawn(config, ConsoleRenderer::new(std::io::stdout(), args.format));
    let intents = panel.intents();

    eprintln!("{}", console::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };
        match console::parse_line(&line) {
            Ok(Some(ConsoleInput::Intent(intent))) => {
                if intents.send(intent).await.is_err() {
                    break;
                }
            }
            Ok(Some(ConsoleInput::Help)) => eprintln!("{}", console::HELP),
            Ok(Some(ConsoleInput::Quit)) => break,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "{}", console::HELP),
        }
    }

    panel.shutdown().await?;
    Ok(())
}
