use cardito_bridge::application::session::BridgeSession;
use cardito_bridge::config::{BridgeConfig, DEFAULT_SOCKET_URL};
use cardito_bridge::domain::ports::PaymentConfigSource;
use cardito_bridge::infrastructure::http_config::HttpConfigSource;
use cardito_bridge::infrastructure::in_memory::{
    HeadlessEnvironment, InMemoryTransport, RecordingHost,
};
use cardito_bridge::interfaces::csv::delivery_writer::DeliveryWriter;
use cardito_bridge::interfaces::csv::script_reader::{ScriptReader, ScriptStep};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Lobby server base URL (the payment config is served from the same origin)
    #[arg(long, env = "CARDITO_SOCKET_URL", default_value = DEFAULT_SOCKET_URL, global = true)]
    socket_url: String,

    /// Project id for the mobile wallet connector
    #[arg(long, env = "CARDITO_WC_PROJECT_ID", global = true)]
    connector_project_id: Option<String>,

    /// Log filter, e.g. "info" or "cardito_bridge=debug"
    #[arg(long, default_value = "info", global = true)]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a recorded session script and print host deliveries as CSV
    Replay {
        /// Script CSV with columns kind,name,payload
        script: PathBuf,
    },
    /// Fetch and print the remote payment configuration
    PaymentConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log))
        .into_diagnostic()?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let mut config = BridgeConfig::new().with_socket_url(cli.socket_url);
    if let Some(project_id) = cli.connector_project_id {
        config = config.with_connector_project_id(project_id);
    }

    match cli.command {
        Command::Replay { script } => replay(config, script),
        Command::PaymentConfig => print_payment_config(&config).await,
    }
}

fn replay(config: BridgeConfig, script: PathBuf) -> Result<()> {
    let host = RecordingHost::new();
    let session = BridgeSession::new(
        config.clone(),
        Box::new(host.clone()),
        Some(Box::new(InMemoryTransport::new())),
        Box::new(HeadlessEnvironment::default()),
        Box::new(HttpConfigSource::new(&config)),
    );

    let file = File::open(script).into_diagnostic()?;
    let reader = ScriptReader::new(file);
    for (index, step) in reader.steps().enumerate() {
        match step {
            Ok(ScriptStep::Event { name, payload }) => session.on_event(&name, payload),
            Ok(ScriptStep::Ready) => session.runtime_ready(),
            Ok(ScriptStep::SetWallet(address)) => session.set_active_wallet(&address),
            Ok(ScriptStep::Emit { name, json }) => {
                // Failures are already logged by the session.
                let _ = session.emit(&name, &json);
            }
            Ok(ScriptStep::Lifecycle(event)) => session.on_lifecycle(event),
            Ok(ScriptStep::Close) => session.close(),
            Err(e) => error!(row = index + 1, error = %e, "Error reading script step"),
        }
    }

    session.shutdown();

    let stdout = io::stdout();
    let mut writer = DeliveryWriter::new(stdout.lock());
    writer.write_deliveries(host.deliveries()).into_diagnostic()?;

    Ok(())
}

async fn print_payment_config(config: &BridgeConfig) -> Result<()> {
    let source = HttpConfigSource::new(config);
    let payment_config = source.fetch().await.into_diagnostic()?;
    let json = serde_json::to_string_pretty(&payment_config).into_diagnostic()?;
    println!("{}", json);
    Ok(())
}
