//! Report Chat - Terminal Client
//!
//! Lists, uploads and exports evaluation reports, and opens an interactive
//! chat about one of them.
//!
//! # Usage
//!
//! ```bash
//! # List uploaded reports
//! report-chat reports
//!
//! # Upload an evaluation artifact
//! report-chat upload --label "Churn model v2" --file results.json
//!
//! # Print the PDF export URL
//! report-chat export "Churn model v2"
//!
//! # Chat about report 3 with a technical audience
//! report-chat --profile technical chat 3
//!
//! # Against another backend, with verbose logging on stderr
//! REPORT_CHAT_SERVER=https://reports.example.com RUST_LOG=debug report-chat chat 3
//! ```

mod input;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use chat_core::config::{load_config_from_path, ClientConfig, ConfigOverrides};
use chat_core::{
    find_report, ChatClient, ChatId, ChatSession, ClientError, Profile, ReportsClient,
    SendRejected, WebSocketTransport,
};

use input::{Input, HELP};
use render::{format_profiles, format_quick_actions, Renderer};

/// Report Chat - talk to an assistant about your model evaluation reports
#[derive(Parser, Debug)]
#[command(name = "report-chat")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "REPORT_CHAT_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend base URL (e.g. http://localhost:8000)
    #[arg(short = 's', long, value_name = "URL")]
    server: Option<String>,

    /// Explanation profile (non_technical, technical, business, expert)
    #[arg(short = 'p', long, value_name = "PROFILE")]
    profile: Option<Profile>,

    /// Connection timeout in milliseconds
    #[arg(long, value_name = "MS")]
    connect_timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "REPORT_CHAT_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

/// What to do
#[derive(Subcommand, Debug)]
enum Command {
    /// List uploaded reports
    Reports,

    /// Upload an evaluation artifact (JSON)
    Upload {
        /// Label for the new report
        #[arg(long)]
        label: String,

        /// Path to the JSON results file
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the PDF export URL of a report
    Export {
        /// Report label
        label: String,
    },

    /// Chat about a report
    Chat {
        /// Report id
        id: String,
    },
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(ref server) = self.server {
            overrides = overrides.with_base_url(server.clone());
        }
        if let Some(profile) = self.profile {
            overrides = overrides.with_default_profile(profile);
        }
        if let Some(ms) = self.connect_timeout_ms {
            overrides = overrides.with_connect_timeout_ms(ms);
        }
        overrides
    }
}

/// Initialize logging with the specified level
///
/// Logs go to stderr so the conversation on stdout stays clean.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("report_chat={level},chat_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn load(args: &Args) -> Result<ClientConfig> {
    let path = args
        .config
        .clone()
        .or_else(chat_core::config::default_config_path);
    let mut config = load_config_from_path(path).context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    config.validate().context("Invalid configuration")?;

    debug!(
        source = %config.source(),
        base_url = %config.server.base_url,
        "Configuration loaded"
    );
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    let config = load(&args)?;
    let reports = ReportsClient::from_config(&config).context("Failed to create HTTP client")?;

    match args.command {
        Command::Reports => list_reports(&reports).await,
        Command::Upload { ref label, ref file } => {
            reports
                .upload_report(label, file)
                .await
                .context("Upload failed")?;
            println!("Report created successfully");
            Ok(())
        }
        Command::Export { ref label } => {
            println!("{}", reports.export_url(label)?);
            Ok(())
        }
        Command::Chat { ref id } => run_chat(&config, &reports, ChatId::new(id.clone())).await,
    }
}

async fn list_reports(reports: &ReportsClient) -> Result<()> {
    let list = reports
        .list_reports()
        .await
        .context("Failed to load reports")?;

    if list.is_empty() {
        println!("No reports yet. Upload one with `report-chat upload`.");
        return Ok(());
    }

    println!("{:<8} {:<32} CREATED", "ID", "LABEL");
    for report in &list {
        println!("{:<8} {:<32} {}", report.id, report.label, report.created_at);
    }
    Ok(())
}

async fn run_chat(config: &ClientConfig, reports: &ReportsClient, chat_id: ChatId) -> Result<()> {
    // The chat screen is only built once the report list is in.
    let list = reports
        .list_reports()
        .await
        .context("Failed to load reports")?;
    let label = find_report(&list, &chat_id).map(|r| r.label.clone());
    if label.is_none() {
        warn!(chat_id = %chat_id, "Report not in list; chatting without a label");
    }

    let session = ChatSession::new(chat_id, config.session.default_profile, label.as_deref());
    let transport = WebSocketTransport::from_config(config);
    let mut client = ChatClient::new(transport, session);
    let mut renderer = Renderer::new();

    print_lines(renderer.catch_up(client.session()));
    print_lines(format_quick_actions(client.session().quick_actions()));

    client
        .open()
        .await
        .with_context(|| format!("Failed to connect to {}", config.websocket_url()))?;
    client.reports_loaded().await?;
    info!(profile = %client.session().profile().active(), "Chat ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                let result = match Input::parse(&line) {
                    Input::Message(text) => client.send_message(&text).await.map(Some),
                    Input::Quick(index) => client.select_quick_action(index).await.map(Some),
                    Input::Profile(profile) => {
                        client.request_profile_change(profile).await.map(|()| None)
                    }
                    Input::ListProfiles => {
                        print_lines(format_profiles(client.session().profile().active()));
                        Ok(None)
                    }
                    Input::Actions => {
                        print_lines(format_quick_actions(client.session().quick_actions()));
                        Ok(None)
                    }
                    Input::Help => {
                        println!("{HELP}");
                        Ok(None)
                    }
                    Input::Invalid(message) => {
                        println!("{message}");
                        Ok(None)
                    }
                    Input::Empty => Ok(None),
                    Input::Quit => break,
                };

                match result {
                    Ok(Some(updates)) => print_lines(renderer.render(client.session(), &updates)),
                    Ok(None) => {}
                    Err(ClientError::Rejected(SendRejected::UnknownQuickAction(index))) => {
                        println!("No suggestion number {}", index + 1);
                    }
                    Err(ClientError::Rejected(reason)) => {
                        debug!(%reason, "Input not sent");
                    }
                    Err(ClientError::Transport(e)) => {
                        warn!(error = %e, "Send failed");
                        print_lines(renderer.render(
                            client.session(),
                            &[chat_core::SessionUpdate::LinkChanged(chat_core::LinkState::Closed)],
                        ));
                        break;
                    }
                }
            }
            update = client.next_update() => {
                let Some(updates) = update else {
                    break;
                };
                print_lines(renderer.render(client.session(), &updates));
            }
        }
    }

    if let Err(e) = client.close().await {
        debug!(error = %e, "Disconnect failed");
    }
    Ok(())
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
