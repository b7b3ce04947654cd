use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use eta_engine::config::Config;
use eta_engine::logging::{init_tracing, LogSettings};
use eta_engine::{format_minutes, EtaEngine, EtaError, TripContext, TripRequest};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Adjust a free-flow ETA for trip conditions", long_about = None)]
struct Cli {
    /// Trip request JSON file, or `-` to read stdin
    #[arg(long, default_value = "-")]
    request: String,

    /// Tuning file (JSON); defaults come from ETA_CONFIG_PATH or built-ins
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tracing filter directive, overrides RUST_LOG
    #[arg(long)]
    log_level: Option<String>,

    /// Pretty-print the breakdown
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn read_request(source: &str) -> Result<String, EtaError> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(source)?)
    }
}

fn run(cli: &Cli, config: &Config) -> Result<String, EtaError> {
    let engine = EtaEngine::new(config.load_eta_config()?)?;

    let request: TripRequest = serde_json::from_str(&read_request(&cli.request)?)?;
    let traffic = request.traffic.clone();
    let ctx = TripContext::try_from(request)?;

    let breakdown = engine.estimate(&ctx, traffic.as_ref())?;
    tracing::info!(
        base = %format_minutes(breakdown.base_minutes),
        adjusted = %format_minutes(breakdown.adjusted_minutes),
        tier = breakdown.severity_tier.as_str(),
        "estimate ready"
    );

    let out = if cli.pretty {
        serde_json::to_string_pretty(&breakdown)?
    } else {
        serde_json::to_string(&breakdown)?
    };
    Ok(out)
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let config = Config::from_env().with_overrides(cli.log_level.clone(), cli.config.clone());
    let _log_guard = init_tracing(&LogSettings::from_env(config.log_level.clone()));

    match run(&cli, &config) {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            if !err.is_input_error() {
                tracing::error!(error = %err, "estimate failed");
            }
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
