#![forbid(unsafe_code)]

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use serde_json::{Map, Value};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use vigil_client::{replay_all, DeliveryClient, FailureStore};
use vigil_runner::{send_heartbeat, RunOptions, Runner};

const DEFAULT_API_BASE: &str = "https://api.vigil.dev";
const DEFAULT_STORE_DIR: &str = ".vigil/failed_events";
const API_KEY_ENV: &str = "VIGIL_API_KEY";

#[derive(Parser, Debug)]
#[command(name = "vigil", about = "Run commands under remote monitoring")]
struct Args {
    /// Base URL of the monitoring service.
    #[arg(long, global = true, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Directory holding undelivered events awaiting replay.
    #[arg(long, global = true, default_value = DEFAULT_STORE_DIR)]
    store_dir: String,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run a command and report its start and finish to the service.
    Run {
        /// Job name the run is reported under.
        job_name: String,

        /// Attach the command's output to the finish event.
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        capture_logs: bool,

        /// Extra JSON object attached to both events.
        #[arg(long, value_parser = parse_json_object)]
        metadata: Option<Map<String, Value>>,

        /// Opaque JSON passed through to the service.
        #[arg(long, value_parser = parse_json)]
        tags: Option<Value>,

        /// The command to run, verbatim.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },
    /// Resend events that previously failed to deliver.
    ReplayFailed,
    /// Send a single heartbeat for a job.
    Heartbeat { job_name: String },
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|err| format!("invalid JSON: {err}"))
}

fn parse_json_object(raw: &str) -> Result<Map<String, Value>, String> {
    match parse_json(raw)? {
        Value::Object(map) => Ok(map),
        other => Err(format!("expected a JSON object, got {other}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let api_key = match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.is_empty() => key,
        _ => bail!("{API_KEY_ENV} must be set"),
    };

    let client = DeliveryClient::new(&args.api_base, &api_key).context("build delivery client")?;
    let store = FailureStore::new(&args.store_dir);

    match args.cmd {
        Cmd::Run {
            job_name,
            capture_logs,
            metadata,
            tags,
            command,
        } => {
            let opts = RunOptions {
                job_name,
                capture_logs,
                metadata,
                tags,
                command,
            };
            let code = Runner::new(client, store).run(&opts).await?;
            std::process::exit(code);
        }
        Cmd::ReplayFailed => {
            let replayed = replay_all(&client, &store).await?;
            println!("✓ replayed {replayed} failed event(s)");
        }
        Cmd::Heartbeat { job_name } => {
            send_heartbeat(&client, &store, &job_name).await?;
            println!("✓ heartbeat sent for \"{job_name}\"");
        }
    }

    Ok(())
}
