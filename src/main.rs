// ABOUTME: Entry point for the saltrun CLI application.
// ABOUTME: Resolves settings, logs in, runs one command, and prints the body.

mod cli;
mod prompt;

use clap::Parser;
use cli::Cli;
use saltrun::api::{CommandRequest, Credentials, SaltClient};
use saltrun::config::Config;
use saltrun::error::{Error, Result};
use saltrun::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);
    output.start_timer();

    if let Err(e) = run(cli, &output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let config = resolve_config(&cli)?;

    let client = SaltClient::new(&config.host, &config.port.to_string())?;
    let client = match config.timeout {
        Some(timeout) => client.with_timeout(timeout),
        None => client,
    };

    let username = match config.username.clone() {
        Some(name) => name,
        None => prompt::username()?,
    };
    let password = match config.resolve_password()? {
        Some(password) => password,
        None => prompt::password()?,
    };
    let credentials = Credentials::new(username, password, config.eauth.clone());

    let token = client.authenticate(&credentials).await?;
    let client = client.attach_token(token);

    output.progress(&format!("Running {} against {}", cli.function, cli.target));

    let mut request = CommandRequest::new(&cli.target, &cli.function, &cli.args);
    if let Some(expr_form) = cli.expr_form {
        request = request.expr_form(expr_form);
    }

    let result = client.execute_request(&request).await?;
    output.result(result.as_bytes());
    Ok(())
}

/// Layer settings: built-in defaults < config file < destination < flags.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) if !path.exists() => return Err(Error::ConfigNotFound(path.clone())),
        Some(path) => Config::load(path)?,
        None => {
            let cwd = env::current_dir()?;
            Config::discover(&cwd)?
        }
    };

    if let Some(dest) = &cli.destination {
        config = config.for_destination(dest)?;
    }

    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(eauth) = &cli.eauth {
        config.eauth = eauth.clone();
    }
    if let Some(username) = &cli.username {
        config.username = Some(username.clone());
    }
    if let Some(timeout) = cli.timeout {
        config.timeout = Some(timeout);
    }

    if config.eauth.trim().is_empty() {
        return Err(Error::InvalidConfig("eauth cannot be empty".to_string()));
    }

    Ok(config)
}
