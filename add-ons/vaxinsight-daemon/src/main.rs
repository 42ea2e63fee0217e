//! VaxInsight agent daemon.
//!
//! Runs one agent over the in-process channel transport: periodic analytics report,
//! periodic baseline simulation, and an interactive console where each stdin line is
//! sent to the agent as a chat message.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, Interval};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vaxinsight_core::{
    generate_report, AgentConfig, AgentContext, AgentMessage, ChannelOutbox, ChatMessage, Delivery,
    PatientAnalytics, Protocol, ScoreCalculator, SimulationGenerator, BASELINE_PATIENT_ID,
};

/// Sender address used for chat typed on stdin.
const CONSOLE_ADDRESS: &str = "console";

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[vaxinsight] .env not loaded: {} (using system environment)", e);
    }

    let config = match AgentConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[vaxinsight] failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let _log_guard = init_tracing(&config);

    let analytics = Arc::new(PatientAnalytics::with_max_history(config.max_history));
    let calculator = Arc::new(ScoreCalculator::new(config.metric_defaults));
    let protocol = Protocol::standard(&config.agent_name, calculator, Arc::clone(&analytics));
    let (outbox, mut deliveries) = ChannelOutbox::new();
    let ctx = AgentContext::new(config.address.clone(), Arc::new(outbox));

    tracing::info!(
        agent_name = %config.agent_name,
        address = %config.address,
        report_interval_secs = config.report_interval_secs,
        simulation_interval_secs = config.simulation_interval_secs,
        max_history = ?config.max_history,
        handlers = ?protocol.kinds().iter().map(|k| k.as_str()).collect::<Vec<_>>(),
        "VaxInsight agent started"
    );
    println!("{} ready. Type `help` for commands, Ctrl-C to quit.", config.agent_name);

    let mut report_timer = config.report_interval().map(delayed_interval);
    let mut simulation_timer = config.simulation_interval().map(delayed_interval);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = tick(&mut report_timer) => {
                if let Err(e) = generate_report(&analytics) {
                    tracing::warn!(error = %e, "analytics report failed");
                }
            }
            _ = tick(&mut simulation_timer) => {
                let event = SimulationGenerator::baseline(BASELINE_PATIENT_ID);
                if let Err(e) = ctx.send(&ctx.address, AgentMessage::PatientJourneyEvent(event)).await {
                    tracing::warn!(error = %e, "simulated event not sent");
                }
            }
            Some(delivery) = deliveries.recv() => {
                route(&protocol, &ctx, delivery).await;
            }
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) if !line.trim().is_empty() => {
                    let message = AgentMessage::ChatMessage(ChatMessage::text(line.trim()));
                    if let Err(e) = protocol.dispatch(&ctx, CONSOLE_ADDRESS, message).await {
                        tracing::warn!(error = %e, "console chat failed");
                    }
                }
                Ok(Some(_)) => {}
                Ok(None) => {
                    tracing::info!("stdin closed; console chat disabled");
                    stdin_open = false;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stdin read failed; console chat disabled");
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("CTRL-C received; shutting down agent");
                break;
            }
        }
    }
}

/// Delivers one outbound message: to the protocol when addressed to this agent,
/// to stdout when addressed to the console.
async fn route(protocol: &Protocol, ctx: &AgentContext, delivery: Delivery) {
    let Delivery { sender, recipient, message } = delivery;
    if recipient == ctx.address {
        let kind = message.kind();
        if let Err(e) = protocol.dispatch(ctx, &sender, message).await {
            tracing::warn!(sender = %sender, kind = kind.as_str(), error = %e, "inbound message rejected");
        }
        return;
    }
    match (recipient.as_str(), message) {
        (CONSOLE_ADDRESS, AgentMessage::ChatMessage(reply)) => {
            if let Some(text) = reply.joined_text() {
                println!("{}\n", text);
            }
        }
        (_, message) => {
            tracing::debug!(
                sender = %sender,
                recipient = %recipient,
                kind = message.kind().as_str(),
                "outbound message"
            );
        }
    }
}

/// Interval whose first tick fires one full period after start.
fn delayed_interval(period: Duration) -> Interval {
    tokio::time::interval_at(Instant::now() + period, period)
}

/// Waits for the next tick; never completes for a disabled timer.
async fn tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Console logging plus an optional non-blocking file layer. The returned guard
/// must live until shutdown so buffered lines are flushed.
fn init_tracing(config: &AgentConfig) -> Option<WorkerGuard> {
    let (file_layer, guard) = match config.log_file.as_deref().and_then(file_writer) {
        Some((writer, guard)) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer),
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();
    guard
}

fn file_writer(path: &str) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let path = Path::new(path);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path.file_name()?.to_string_lossy().into_owned();
    match tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
    {
        Ok(appender) => Some(tracing_appender::non_blocking(appender)),
        Err(e) => {
            eprintln!("[vaxinsight] log file {} not opened: {}", path.display(), e);
            None
        }
    }
}
