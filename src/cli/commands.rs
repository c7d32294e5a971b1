use crate::bridge::Bridge;
use crate::echo::echo_handler;
use crate::envelope::classify;
use crate::runtime_config::BridgeConfig;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Command-line interface for httpbridge
///
/// Runs Lambda HTTP event payloads through the bridge locally.
#[derive(Parser)]
#[command(name = "httpbridge")]
#[command(about = "Run Lambda HTTP event payloads through httpbridge", long_about = None)]
pub struct Cli {
    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "HTTPBRIDGE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a payload through the bridge with the echo handler and print the reply
    Invoke {
        /// Path to the JSON payload, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        payload: PathBuf,

        /// Pretty-print the reply
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Print the envelope format detected for a payload
    Classify {
        /// Path to the JSON payload, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        payload: PathBuf,
    },
}

fn read_payload(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read payload from stdin")?;
        Ok(buf)
    } else {
        fs::read(path).with_context(|| format!("failed to read payload {}", path.display()))
    }
}

fn render_reply(reply: &[u8], pretty: bool) -> Result<Vec<u8>> {
    if !pretty {
        return Ok(reply.to_vec());
    }
    let value: serde_json::Value =
        serde_json::from_slice(reply).context("bridge produced invalid JSON")?;
    serde_json::to_vec_pretty(&value).context("failed to pretty-print reply")
}

/// Execute a parsed command, writing results to `out`.
pub fn run_command(command: &Commands, out: &mut dyn Write) -> Result<()> {
    match command {
        Commands::Invoke { payload, pretty } => {
            let payload = read_payload(payload)?;
            let bridge = Bridge::with_config(echo_handler, BridgeConfig::from_env());
            let reply = render_reply(&bridge.invoke(&payload), *pretty)?;
            out.write_all(&reply)?;
            writeln!(out)?;
        }
        Commands::Classify { payload } => {
            let payload = read_payload(payload)?;
            match classify(&payload) {
                Ok(request) => writeln!(out, "{}", request.format())?,
                Err(err) => writeln!(out, "error: {err}")?,
            }
        }
    }
    Ok(())
}

/// Parse arguments, initialize logging, and run.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    crate::otel::init_logging(cli.log_level.as_deref())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_command(&cli.command, &mut out)
}
