//! nextgsim 5GC session management replay tool
//!
//! Loads a core configuration, registers one UE and answers hex-encoded
//! UL NAS Transport messages read from stdin, one per line, with the
//! hex-encoded DL NAS Transport the core produces.
//!
//! # Usage
//!
//! ```bash
//! echo 7e00670100...  | nr-5gc -c config/5gc.yaml --supi imsi-001010000000001
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{error, info, warn};

use nextgsim_5gc::{FiveGc, UeContext};
use nextgsim_common::{init_logging, CoreConfig, LogLevel, NrLocation, Ncgi, SNssai, Tai};

/// nextgsim 5GC - PDU session management replay
#[derive(Parser, Debug)]
#[command(name = "nr-5gc")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the core configuration file (YAML); built-in defaults when omitted
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config_file: Option<String>,

    /// SUPI of the UE the messages belong to
    #[arg(long, default_value = "imsi-001010000000001")]
    supi: String,

    /// SST of the UE's default slice
    #[arg(long, default_value_t = 1)]
    sst: u8,

    /// Tracking area code of the UE
    #[arg(long, default_value_t = 1)]
    tac: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long = "log-level", default_value = "info")]
    log_level: LogLevel,
}

fn load_config(path: Option<&str>) -> Result<CoreConfig> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            CoreConfig::from_yaml_file(path)
                .with_context(|| format!("Failed to load configuration from {path}"))?
        }
        None => CoreConfig::default(),
    };
    config.validate().context("Invalid core configuration")?;
    Ok(config)
}

/// Answer one hex-encoded UL NAS Transport
fn handle_line(core: &FiveGc, ue: &UeContext, line: &str) -> Result<String> {
    let pdu = hex::decode(line.trim()).context("Input is not valid hex")?;
    let reply = core
        .handle_ul_nas_transport(ue, &pdu)
        .context("Malformed UL NAS Transport")?;
    let mut encoded = Vec::new();
    reply.encode(&mut encoded);
    Ok(hex::encode(encoded))
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(args.config_file.as_deref())?;
    let core = FiveGc::from_config(&config)?;

    let location = NrLocation::new(Tai::new(config.plmn, args.tac), Ncgi::new(config.plmn, 1));
    let ue = core.add_ue(UeContext::new(args.supi, SNssai::new(args.sst), location));
    info!(supi = ue.supi(), "UE registered, reading UL NAS Transport messages from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match handle_line(&core, &ue, &line) {
                    Ok(reply) => println!("{reply}"),
                    Err(e) => warn!("Skipping input line: {:#}", e),
                }
            }
        }
    }

    info!(
        supi = ue.supi(),
        sessions = ?ue.session_ids(),
        last_allocated = %core.session_service().address_pool().last_allocated(),
        "Done"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("nr-5gc failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
