//! Command-line argument parsing.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use ultipro_domain::constants::DEFAULT_DELIMITER;
use ultipro_domain::EmployeeIdentifier;

/// A parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a BI report by name
    Report {
        /// Exact catalog name
        name: String,
        /// Field delimiter requested from the server and used for parsing
        delimiter: char,
        /// Write to this file instead of stdout
        output: Option<PathBuf>,
        /// Keep the decoded text instead of parsing rows
        raw: bool,
    },
    /// List the report catalog
    Reports,
    /// Look up a person
    Person {
        /// Lookup key
        identifier: EmployeeIdentifier,
        /// Query `EmployeeGlobal` instead of `EmployeePerson`
        global: bool,
    },
    /// Print usage
    Help,
}

/// Usage text.
pub const HELP: &str = "\
UltiPro client

USAGE:
    ultipro <COMMAND> [OPTIONS]

COMMANDS:
    report <NAME>   Run a BI report and print its rows as JSON lines
        --delimiter <CHAR>   Field delimiter (default ','; 'tab' for a tab)
        --output <PATH>      Write a delimited file instead of printing
        --raw                Keep the decoded report text unparsed
    reports         List the report catalog
    person          Look up a person
        --email <ADDRESS>          By email address
        --employee-number <NUMBER> By employee number
        --company <CODE>           Company code for --employee-number
        --global                   Use the global employee service
    help            Show this help message

CONFIGURATION:
    UKG_UserName, UKG_Password, UKG_ClientAccessKey, UKG_UserAccessKey
    (environment or .env), or ultipro.json / ultipro.toml.
    RUST_LOG sets the log filter; ULTIPRO_LOG_FORMAT=json switches to JSON logs.";

fn value(flag: &str, args: &mut impl Iterator<Item = String>) -> anyhow::Result<String> {
    args.next().with_context(|| format!("{flag} requires a value"))
}

fn parse_delimiter(raw: &str) -> anyhow::Result<char> {
    if raw.eq_ignore_ascii_case("tab") || raw == "\\t" {
        return Ok('\t');
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(anyhow!("delimiter must be a single character, got '{raw}'")),
    }
}

fn parse_report(mut args: impl Iterator<Item = String>) -> anyhow::Result<Command> {
    let mut name = None;
    let mut delimiter = DEFAULT_DELIMITER;
    let mut output = None;
    let mut raw = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--delimiter" | "-d" => delimiter = parse_delimiter(&value(&arg, &mut args)?)?,
            "--output" | "-o" => output = Some(PathBuf::from(value(&arg, &mut args)?)),
            "--raw" => raw = true,
            flag if flag.starts_with('-') => bail!("unknown option for report: {flag}"),
            _ if name.is_some() => bail!("unexpected argument: {arg}"),
            _ => name = Some(arg),
        }
    }

    let name = name.context("report requires a report name")?;
    Ok(Command::Report { name, delimiter, output, raw })
}

fn parse_person(mut args: impl Iterator<Item = String>) -> anyhow::Result<Command> {
    let mut email = None;
    let mut number = None;
    let mut company = None;
    let mut global = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--email" => email = Some(value(&arg, &mut args)?),
            "--employee-number" => number = Some(value(&arg, &mut args)?),
            "--company" => company = Some(value(&arg, &mut args)?),
            "--global" => global = true,
            other => bail!("unknown option for person: {other}"),
        }
    }

    let identifier = match (email, number) {
        (Some(address), None) => {
            if company.is_some() {
                bail!("--company only applies to --employee-number");
            }
            EmployeeIdentifier::email_address(address)
        }
        (None, Some(number)) => EmployeeIdentifier::EmployeeNumber { number, company_code: company },
        _ => bail!("person requires exactly one of --email or --employee-number"),
    };
    Ok(Command::Person { identifier, global })
}

/// Parse the arguments after the program name.
///
/// # Errors
/// Unknown commands or options, missing values and conflicting options.
pub fn parse(args: impl IntoIterator<Item = String>) -> anyhow::Result<Command> {
    let mut args = args.into_iter();
    match args.next().as_deref() {
        Some("report") => parse_report(args),
        Some("reports") => Ok(Command::Reports),
        Some("person") => parse_person(args),
        Some("help" | "--help" | "-h") | None => Ok(Command::Help),
        Some(unknown) => bail!("unknown command: {unknown}"),
    }
}
