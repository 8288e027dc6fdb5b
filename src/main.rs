use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use skid_steer_runtime::config::{
    CMD_TIMEOUT, DEFAULT_THRESHOLD, LOOP_HZ, MAX_OUTPUT, RuntimeConfig, parse_max_output,
};

/// Skid-steer drive runtime: zenoh drive commands in, per-side actuation out
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Actuator units for a normalized command of 1.0
    #[arg(long, default_value_t = MAX_OUTPUT, value_parser = parse_max_output)]
    max_output: f64,

    /// Dead zone applied to tank/arcade commands that do not carry one
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Control loop rate
    #[arg(long, default_value_t = LOOP_HZ, value_parser = clap::value_parser!(u64).range(1..=1000))]
    loop_hz: u64,

    /// Watchdog timeout in milliseconds
    #[arg(long, default_value_t = CMD_TIMEOUT.as_millis() as u64)]
    timeout_ms: u64,
}

impl From<Args> for RuntimeConfig {
    fn from(args: Args) -> Self {
        Self {
            max_output: args.max_output,
            threshold: args.threshold,
            loop_hz: args.loop_hz,
            cmd_timeout: Duration::from_millis(args.timeout_ms),
        }
    }
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init(); // installs the subscriber globally

    let config = RuntimeConfig::from(Args::parse());

    if let Err(e) = skid_steer_runtime::runtime::run(config).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
