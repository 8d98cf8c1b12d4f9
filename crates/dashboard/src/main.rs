//! Helpdesk Dashboard - diagnostic collection and live host vitals

mod app;
mod config;
mod console;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::info;

use helpdesk_core::application::{cancel_channel, info as actions, CancelHandle};
use helpdesk_core::port::SampleSink;

use crate::app::App;
use crate::config::Settings;
use crate::console::{print_run, ConsoleSink, JsonSampleSink};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "helpdesk-dashboard")]
#[command(about = "Helpdesk diagnostic collector and live metrics dashboard", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (default: per-user config dir)
    #[arg(long, env = "HELPDESK_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session: live metrics plus on-demand collection (default)
    Dashboard,

    /// Run one diagnostic collection and archive it
    Collect,

    /// Print live metrics until Ctrl+C
    Watch {
        /// One JSON object per sample
        #[arg(long)]
        json: bool,

        /// Stop after this many seconds
        #[arg(long)]
        duration_secs: Option<u64>,
    },

    /// OS, host, user, CPU and RAM
    Sysinfo,

    /// Hostname, address and default gateway
    Netinfo,

    /// Connectivity check against 8.8.8.8
    Ping,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;
    let _log_guard = logging::init(&settings)?;
    info!("Helpdesk toolkit v{} starting...", VERSION);

    let app = App::build(settings);

    match cli.command.unwrap_or(Commands::Dashboard) {
        Commands::Dashboard => run_dashboard(&app).await,
        Commands::Collect => run_collect(&app).await,
        Commands::Watch {
            json,
            duration_secs,
        } => run_watch(&app, json, duration_secs).await,
        Commands::Sysinfo => {
            let user = std::env::var("USERNAME").or_else(|_| std::env::var("USER")).ok();
            let text =
                actions::system_report(app.telemetry.as_deref(), app.identity.as_ref(), user.as_deref()).await;
            println!("{}", "System Info".cyan().bold());
            print!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Netinfo => {
            let text = actions::network_report(app.runner.as_ref(), app.identity.as_ref()).await;
            println!("{}", "Network Info".cyan().bold());
            print!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Ping => {
            let report = actions::ping(app.runner.as_ref()).await;
            if report.reachable {
                println!("{}", "✓ Ping Test".green().bold());
                println!("{}", report.output);
                Ok(ExitCode::SUCCESS)
            } else {
                println!("{}", "✗ Ping Failed".red().bold());
                println!("{}", report.output);
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

async fn run_collect(app: &App) -> Result<ExitCode> {
    let console = ConsoleSink::new(false);
    let (cancel, token) = cancel_channel();

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("{}", "Cancelling after the current probe...".yellow());
            cancel.cancel();
        }
    });

    let run = app.trigger.trigger(&console, &console, &token).await?;
    interrupt.abort();
    print_run(&run);

    Ok(if run.archive_path().is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_watch(app: &App, json: bool, duration_secs: Option<u64>) -> Result<ExitCode> {
    let sink: Arc<dyn SampleSink> = if json {
        Arc::new(JsonSampleSink)
    } else {
        Arc::new(ConsoleSink::new(true))
    };
    let poller = app.poller(sink);
    poller.start().await?;

    match duration_secs {
        Some(secs) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                _ = tokio::signal::ctrl_c() => {}
            }
        }
        None => tokio::signal::ctrl_c().await?,
    }

    let ticks = poller.stop().await;
    info!(ticks = ticks, "Watch finished");
    Ok(ExitCode::SUCCESS)
}

fn print_help() {
    println!("{}", "Helpdesk Dashboard".cyan().bold());
    println!("  c  collect diagnostics");
    println!("  x  cancel running collection");
    println!("  m  mute/unmute live metrics");
    println!("  q  quit");
}

async fn run_dashboard(app: &App) -> Result<ExitCode> {
    let console = Arc::new(ConsoleSink::new(true));
    let poller = app.poller(console.clone());
    poller.start().await?;
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut active: Option<CancelHandle> = None;
    let mut runs: Vec<JoinHandle<()>> = Vec::new();
    let mut muted = false;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "c" => {
                        let (cancel, token) = cancel_channel();
                        // a rejected trigger must not steal the running run's cancel handle
                        if runs.iter().all(|r| r.is_finished()) {
                            active = Some(cancel);
                        }
                        let trigger = app.trigger.clone();
                        let console = console.clone();
                        runs.push(tokio::spawn(async move {
                            match trigger.trigger(console.as_ref(), console.as_ref(), &token).await {
                                Ok(run) => print_run(&run),
                                Err(e) => println!("{}", format!("✗ {e}").yellow()),
                            }
                        }));
                    }
                    "x" => match &active {
                        Some(cancel) if app.trigger.is_running() => {
                            cancel.cancel();
                            println!("{}", "Cancelling after the current probe...".yellow());
                        }
                        _ => println!("No collection running"),
                    },
                    "m" => {
                        muted = !muted;
                        console.set_show_samples(!muted);
                    }
                    "q" => break,
                    "" => {}
                    _ => print_help(),
                }
                runs.retain(|r| !r.is_finished());
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    if let Some(cancel) = active {
        cancel.cancel();
    }
    for run in runs {
        let _ = run.await;
    }
    let ticks = poller.stop().await;
    info!(ticks = ticks, "Dashboard session ended");
    Ok(ExitCode::SUCCESS)
}
