//! CLI entry point for webreq — a script skeleton around [`ApiClient`].
//!
//! Loads a TOML config, templates the base URL with an instance name,
//! prompts for missing credentials, asks for confirmation, then fetches a
//! resource collection and pretty-prints the JSON.
//!
//! Exit codes:
//! - 0: success (including a declined confirmation)
//! - 1: runtime error (config, auth, API error, I/O)
//! - 2: argument validation error (clap handles this automatically)

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use webreq::client::ApiClient;
use webreq::config;
use webreq::logging::LogPolicy;
use webreq::request::WebRequester;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Name of the API instance, substituted into the configured FQDN.
    #[arg(short, long)]
    instance: String,

    /// Path to the TOML config file.
    #[arg(long, default_value = "webreq.toml")]
    config: PathBuf,

    /// Username for authentication; prompted for when omitted.
    #[arg(short, long)]
    user: Option<String>,

    /// Password for authentication; prompted for (without echo) when
    /// omitted. Prefer setting via the WEBREQ_PASSWORD environment
    /// variable to avoid exposing the secret in process listings and
    /// shell history.
    #[arg(long, env = "WEBREQ_PASSWORD")]
    password: Option<String>,

    /// Optional resource id or URL suffix to request.
    #[arg(long, default_value = "")]
    resource: String,

    /// Return the collection as a map keyed by each item's "key" (or
    /// "name") field instead of a list.
    #[arg(long)]
    as_map: bool,

    /// Skip TLS certificate validation (self-signed endpoints only).
    #[arg(long)]
    insecure: bool,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes")]
    skip_confirm: bool,

    /// Log a line per request and response.
    #[arg(long)]
    log_requests: bool,

    /// Also log headers (may expose credentials; local debugging only).
    #[arg(long)]
    log_headers: bool,

    /// Also log bodies (may expose tokens; local debugging only).
    #[arg(long)]
    log_bodies: bool,

    /// Append log output to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    if let Err(err) = init_tracing(args.log_file.as_deref(), args.log_requests) {
        eprintln!("Error: failed to open log file: {err}");
        return ExitCode::FAILURE;
    }

    let config = match config::load_config(&args.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let base_url = config.base_url(&args.instance);
    println!("URL: {base_url}");

    let (user, password) = match credentials(&args) {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if !args.skip_confirm {
        match confirm_execution() {
            Ok(true) => {}
            Ok(false) => {
                println!("Abort.");
                return ExitCode::SUCCESS;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    let requester = match WebRequester::builder(&base_url)
        .use_session(true)
        .verify_ssl_certs(!args.insecure)
        .log_policy(LogPolicy {
            requests: args.log_requests,
            headers: args.log_headers,
            bodies: args.log_bodies,
        })
        .build()
    {
        Ok(requester) => requester,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let client = ApiClient::with_requester(requester, &user, &password);

    let output = if args.as_map {
        client
            .get_resource_map(&args.resource, &[])
            .await
            .map(serde_json::Value::Object)
    } else {
        client.get_resource(&args.resource, &[]).await
    };

    match output {
        Ok(value) => {
            match serde_json::to_string_pretty(&value) {
                Ok(rendered) => println!("{rendered}"),
                Err(_) => println!("{value}"),
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Installs the tracing subscriber: stderr by default, a file when
/// requested. The filter honors RUST_LOG; without it, request logging
/// enables debug output for this crate and everything else stays at warn.
fn init_tracing(log_file: Option<&Path>, log_requests: bool) -> io::Result<()> {
    let default_filter = if log_requests { "warn,webreq=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Resolves the credential pair: CLI arguments win, otherwise prompt.
/// The username prompt defaults to the OS login name; the password prompt
/// never echoes.
fn credentials(args: &Cli) -> io::Result<(String, String)> {
    let user = match &args.user {
        Some(user) => user.clone(),
        None => {
            let default_user = std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_default();
            print!("Username: [{default_user}] ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            let entered = line.trim();
            if entered.is_empty() {
                default_user
            } else {
                entered.to_string()
            }
        }
    };

    let password = match &args.password {
        Some(password) => password.clone(),
        None => rpassword::prompt_password("Password: ")?,
    };

    Ok((user, password))
}

/// Asks the user to confirm before doing anything. Only an explicit yes
/// proceeds; everything else aborts.
fn confirm_execution() -> io::Result<bool> {
    print!("Are you sure you want to proceed? [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes" | "Yes"))
}
