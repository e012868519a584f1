use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use td_client::ClientConfig;
use td_replay::{parse_filter, replay, ReplayOptions};

#[derive(Parser, Debug)]
#[command(name = "td-replay", about = "Replay a captured TDLib update stream", version)]
struct Cli {
    /// Newline-delimited JSON capture, one inbound object per line.
    capture: PathBuf,

    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated update tags to print.
    #[arg(long)]
    filter: Option<String>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(err) = run(cli) {
        eprintln!("td-replay error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    let filter = cli.filter.as_deref().map(parse_filter).transpose()?;
    let file = File::open(&cli.capture).with_context(|| format!("open {}", cli.capture.display()))?;
    let options = ReplayOptions { config, filter };
    let stdout = io::stdout();
    replay(BufReader::new(file), &mut stdout.lock(), &options)?;
    Ok(())
}
