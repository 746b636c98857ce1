//! `ultipro` command-line client.
//!
//! Loads the configuration, authenticates once and runs a single command.
//! Data goes to stdout; logs go to stderr, so `println!` is used for the
//! command output rather than structured logging.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use ultipro_core::UltiProClient;
use ultipro_domain::EmployeeIdentifier;
use ultipro_infra::{config, write_raw_report, write_report, HttpSoapTransport};

mod args;

use args::Command;

/// Selects JSON log lines when set to `json`.
const LOG_FORMAT_ENV: &str = "ULTIPRO_LOG_FORMAT";
const DEFAULT_LOG_FILTER: &str = "warn,ultipro_core=info,ultipro_infra=info";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr);

    if env::var(LOG_FORMAT_ENV).is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before the log filter is read
    let dotenv = dotenvy::dotenv();
    init_tracing();
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
        Err(e) => tracing::debug!(error = %e, "No .env loaded"),
    }

    let command = match args::parse(env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("error: {e:#}");
            eprintln!();
            eprintln!("{}", args::HELP);
            return ExitCode::FAILURE;
        }
    };

    match run(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    if command == Command::Help {
        println!("{}", args::HELP);
        return Ok(());
    }

    let config = config::load().context("loading configuration")?;
    let transport = Arc::new(HttpSoapTransport::new(&config).context("building HTTP transport")?);
    let mut client = UltiProClient::new(config, transport).context("creating client")?;
    client.authenticate().await.context("authenticating")?;

    match command {
        Command::Report { name, delimiter, output, raw } => {
            run_report(&client, &name, delimiter, output.as_deref(), raw).await
        }
        Command::Reports => run_reports(&client).await,
        Command::Person { identifier, global } => run_person(&client, &identifier, global).await,
        Command::Help => Ok(()),
    }
}

async fn run_report(
    client: &UltiProClient,
    name: &str,
    delimiter: char,
    output: Option<&std::path::Path>,
    raw: bool,
) -> anyhow::Result<()> {
    if raw {
        let text = client
            .execute_and_retrieve_raw_report(name, delimiter)
            .await
            .with_context(|| format!("running report '{name}'"))?;
        match output {
            Some(path) => write_raw_report(path, &text)?,
            None => print!("{text}"),
        }
        return Ok(());
    }

    let rows = client
        .execute_and_retrieve_report(name, delimiter)
        .await
        .with_context(|| format!("running report '{name}'"))?;
    match output {
        Some(path) => write_report(path, &rows, delimiter)?,
        None => {
            let mut stdout = io::stdout().lock();
            for row in &rows {
                serde_json::to_writer(&mut stdout, row)?;
                writeln!(stdout)?;
            }
        }
    }
    Ok(())
}

async fn run_reports(client: &UltiProClient) -> anyhow::Result<()> {
    let context = client.log_on_with_token().await.context("logging on to BI services")?;
    let reports = client.get_report_list(&context).await.context("fetching report catalog")?;
    let mut stdout = io::stdout().lock();
    for report in &reports {
        writeln!(stdout, "{}\t{}", report.name, report.path)?;
    }
    Ok(())
}

async fn run_person(
    client: &UltiProClient,
    identifier: &EmployeeIdentifier,
    global: bool,
) -> anyhow::Result<()> {
    let people = if global {
        client.get_global_employee(identifier).await
    } else {
        client.get_person(identifier).await
    }
    .context("looking up person")?;

    println!("{}", serde_json::to_string_pretty(&people)?);
    Ok(())
}
