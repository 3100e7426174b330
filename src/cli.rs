// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: One action: log in and run a single command against a salt-api endpoint.

use clap::Parser;
use saltrun::types::TargetType;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "saltrun")]
#[command(about = "Run a command against a salt-api endpoint")]
#[command(version)]
pub struct Cli {
    /// Minion target, e.g. 'web*'
    pub target: String,

    /// Salt function to run, e.g. test.ping
    pub function: String,

    /// Arguments for the function (pass "" for none)
    pub args: String,

    /// salt-api endpoint with scheme [default: https://localhost]
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// salt-api port [default: 443]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// External auth backend [default: ldap]
    #[arg(short, long)]
    pub eauth: Option<String>,

    /// Username (prompted for when not set here or in the config file)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Path to a config file (default: saltrun.yml in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Named destination from the config file
    #[arg(short, long)]
    pub destination: Option<String>,

    /// How the target is matched: glob, list, grain, pcre, compound, ...
    #[arg(short = 'E', long)]
    pub expr_form: Option<TargetType>,

    /// Give up on each request after this long, e.g. 30s
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print only the response body
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON event lines
    #[arg(long)]
    pub json: bool,
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(s).map_err(|e| e.to_string())
}
