use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use courier::a2a::client::A2aClient;
use courier::banner::{BannerInfo, SessionStats, print_banner, print_session_summary};
use courier::bridge::Bridge;
use courier::bridge::polling::PollingBridge;
use courier::config::store::StateStore;
use courier::config::{
    BASE_URL_VAR, BotConfig, BridgeConfig, MAX_WAIT_VAR, POLL_INTERVAL_VAR, env_non_empty,
};
use courier::consts::{DEFAULT_TELEGRAM_POLL_TIMEOUT, default_db_path};
use courier::events::EventBus;
use courier::spinner::Spinner;
use courier::telegram::api::TelegramApi;
use courier::telegram::handlers::Handlers;
use courier::telegram::{bot, only_chat};

#[derive(Parser)]
#[command(
    name = "courier",
    version,
    about = "Carries chat prompts to an A2A agent and brings the answer back."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Agent endpoint (overrides A2A_BASE_URL)
    #[arg(short, long, global = true)]
    base_url: Option<String>,

    /// Seconds between task status polls (overrides A2A_POLL_INTERVAL)
    #[arg(short, long, global = true)]
    poll_interval: Option<String>,

    /// Give up on a task after this many seconds (overrides A2A_MAX_WAIT; default: wait forever)
    #[arg(short, long, global = true)]
    max_wait: Option<String>,

    /// Ask a single prompt and exit (non-interactive)
    #[arg(short, long)]
    run: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve one Telegram chat (needs TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID)
    Bot {
        /// Telegram long-poll timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TELEGRAM_POLL_TIMEOUT)]
        poll_timeout: u64,

        /// SQLite database for bot state (use :memory: for ephemeral)
        #[arg(short, long)]
        db: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Interactive modes share the terminal with the spinner; keep them quiet.
    let default_filter = match cli.command {
        Some(Command::Bot { .. }) => "courier=info",
        None => "courier=warn",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // CLI flags win over the environment
    let mut overrides: HashMap<&str, String> = HashMap::new();
    if let Some(url) = cli.base_url.clone() {
        overrides.insert(BASE_URL_VAR, url);
    }
    if let Some(interval) = cli.poll_interval.clone() {
        overrides.insert(POLL_INTERVAL_VAR, interval);
    }
    if let Some(max_wait) = cli.max_wait.clone() {
        overrides.insert(MAX_WAIT_VAR, max_wait);
    }
    let config = BridgeConfig::from_lookup(|key| {
        overrides.get(key).cloned().or_else(|| env_non_empty(key))
    })?;

    let events = Arc::new(EventBus::default());
    let client = Arc::new(A2aClient::new(&config.base_url));
    let bridge = PollingBridge::new(client, config.poll.clone()).with_events(Arc::clone(&events));

    match cli.command {
        Some(Command::Bot { poll_timeout, db }) => {
            run_bot(&config, Arc::new(bridge), poll_timeout, db).await
        }
        None => match cli.run {
            Some(prompt) => {
                print_repl_banner(&config);
                let mut stats = SessionStats::default();
                ask_and_print(&bridge, &events, &prompt, &mut stats).await;
                print_session_summary(stats);
                Ok(())
            }
            None => {
                print_repl_banner(&config);
                run_repl(&bridge, &events).await
            }
        },
    }
}

fn print_repl_banner(config: &BridgeConfig) {
    print_banner(&BannerInfo {
        mode: "terminal",
        agent_url: &config.base_url,
        poll_interval: config.poll.interval,
        max_wait: config.poll.max_wait,
        chat_id: None,
        state: "none",
    });
}

async fn run_bot(
    config: &BridgeConfig,
    bridge: Arc<dyn Bridge>,
    poll_timeout: u64,
    db: Option<String>,
) -> anyhow::Result<()> {
    let bot_config = BotConfig::from_env()?;

    let db_path = match db {
        Some(path) => path,
        None => default_db_path().to_string_lossy().into_owned(),
    };
    let store = StateStore::open(&db_path)
        .with_context(|| format!("failed to open bot state at {db_path}"))?;

    let api = TelegramApi::new(&bot_config.token);
    let handlers = Arc::new(Handlers::new(
        only_chat(bot_config.chat_id),
        bridge,
        Arc::new(api.clone()),
        &config.base_url,
        config.poll.clone(),
    ));

    print_banner(&BannerInfo {
        mode: "telegram",
        agent_url: &config.base_url,
        poll_interval: config.poll.interval,
        max_wait: config.poll.max_wait,
        chat_id: Some(bot_config.chat_id),
        state: &db_path,
    });
    info!(chat_id = bot_config.chat_id, "starting Telegram bot");

    tokio::select! {
        result = bot::run(api, handlers, &store, poll_timeout) => result,
        _ = tokio::signal::ctrl_c() => {
            println!("\nshutting down.");
            Ok(())
        }
    }
}

async fn run_repl(bridge: &PollingBridge, events: &EventBus) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut stats = SessionStats::default();

    loop {
        print!("\ncourier> ");
        io::stdout().flush()?;

        let line = tokio::select! {
            result = lines.next_line() => {
                match result {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        // Ctrl+D
                        println!();
                        break;
                    }
                    Err(e) => {
                        eprintln!("input error: {}", e);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        if prompt == "quit" || prompt == "exit" {
            break;
        }

        ask_and_print(bridge, events, prompt, &mut stats).await;
    }

    print_session_summary(stats);
    Ok(())
}

/// Ask with a spinner that follows the task state. Ctrl+C abandons this
/// ask only; the remote task keeps running.
async fn ask_and_print(
    bridge: &PollingBridge,
    events: &EventBus,
    prompt: &str,
    stats: &mut SessionStats,
) {
    let spinner = Spinner::start("submitting");
    let mut progress = events.subscribe();
    let ask = bridge.ask(prompt);
    tokio::pin!(ask);

    let outcome = loop {
        tokio::select! {
            result = &mut ask => break Some(result),
            Ok(event) = progress.recv() => spinner.set_message(&event.label()),
            _ = tokio::signal::ctrl_c() => break None,
        }
    };
    spinner.stop().await;

    match outcome {
        Some(Ok(answer)) => {
            stats.answered += 1;
            println!("\n=> {}", answer);
        }
        Some(Err(e)) => {
            stats.failed += 1;
            eprintln!("\nerror: {}", e);
        }
        None => println!("\n\ninterrupted"),
    }
}
