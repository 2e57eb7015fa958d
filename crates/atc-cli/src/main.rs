use anyhow::{Context, Result};
use atc_cli::{DecodeClient, Outcome, TerminalOutput, DEFAULT_ENDPOINT};
use atc_core::telemetry;
use clap::Parser;
use colored::Colorize;
use std::io::{IsTerminal, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "atc-decode")]
#[command(about = "Explain air-traffic-control phrases in plain English", long_about = None)]
#[command(version)]
struct Cli {
    /// Phrase to explain. Without one, phrases are read from stdin, one per line.
    phrase: Vec<String>,

    /// Decode endpoint of the explanation proxy
    #[arg(long, env = "ATC_PROXY_URL", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing(if cli.verbose { "debug" } else { "warn" });

    let client = DecodeClient::new(cli.endpoint).context("creating HTTP client")?;
    let mut out = TerminalOutput::new();

    if !cli.phrase.is_empty() {
        let outcome = client.decode(&cli.phrase.join(" "), &mut out).await;
        if matches!(outcome, Outcome::Failed(_)) {
            std::process::exit(1);
        }
        return Ok(());
    }

    let interactive = std::io::stdin().is_terminal();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if interactive {
            print!("{} ", "ATC phrase>".cyan().bold());
            std::io::stdout().flush().context("flushing prompt")?;
        }
        let Some(line) = lines.next_line().await.context("reading stdin")? else {
            break;
        };
        client.decode(&line, &mut out).await;
    }

    Ok(())
}
