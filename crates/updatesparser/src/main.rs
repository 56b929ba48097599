//! updatesparser - render updateinfo XML feeds as change logs.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use updateinfo_parser::{parse_file_to_output, FilterConfig, OutputConfig, SECURITY_TYPE};

#[derive(Parser, Debug)]
#[command(name = "updatesparser")]
#[command(
    author,
    version,
    about = "A simple CLI to parse updateinfo XML files",
    long_about = "Filters the updates of an updateinfo XML file by date, type or package \
                  and renders them as a change log, a custom template or JSON."
)]
struct Cli {
    /// Path to the updateinfo XML file
    #[arg(value_name = "UPDATEINFO", value_parser = existing_file)]
    updateinfo: PathBuf,

    /// Filter updates released before the given date (a Unix timestamp unless --dateFormat is set)
    #[arg(short = 'b', long = "beforeDate", visible_alias = "before-date")]
    before_date: Option<String>,

    /// Filter updates released after the given date (a Unix timestamp unless --dateFormat is set)
    #[arg(short = 'a', long = "afterDate", visible_alias = "after-date")]
    after_date: Option<String>,

    /// chrono format used to parse --beforeDate and --afterDate (e.g. %Y-%m-%d)
    #[arg(short = 'f', long = "dateFormat", visible_alias = "date-format")]
    date_format: Option<String>,

    /// Output file. Defaults to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Custom update template file
    #[arg(short, long, conflicts_with = "json")]
    template: Option<PathBuf>,

    /// Package list file (OBS *.packages format) to select updates touching any listed package
    #[arg(short, long)]
    packages: Option<PathBuf>,

    /// Match only security updates
    #[arg(short, long, conflicts_with = "update_type")]
    security: bool,

    /// Match only updates of the given type
    #[arg(long = "type", value_name = "TYPE")]
    update_type: Option<String>,

    /// Output in JSON format
    #[arg(short, long)]
    json: bool,

    /// Enable verbose logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn existing_file(value: &str) -> std::result::Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("could not find updateinfo file '{value}'"))
    }
}

impl Cli {
    fn filter(&self) -> updateinfo_parser::Result<FilterConfig> {
        let mut builder = FilterConfig::builder();
        if let Some(format) = &self.date_format {
            builder = builder.date_format(format);
        }
        if let Some(before) = &self.before_date {
            builder = builder.before(before);
        }
        if let Some(after) = &self.after_date {
            builder = builder.after(after);
        }
        if let Some(packages) = &self.packages {
            builder = builder.packages_file(packages);
        }
        if self.security {
            builder = builder.update_type(SECURITY_TYPE);
        } else if let Some(update_type) = &self.update_type {
            builder = builder.update_type(update_type);
        }
        builder.build()
    }

    fn output(&self) -> updateinfo_parser::Result<OutputConfig> {
        let mut builder = OutputConfig::builder().json(self.json);
        if let Some(template) = &self.template {
            builder = builder.template_file(template);
        }
        if let Some(output) = &self.output {
            builder = builder.output_file(output);
        }
        builder.build()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    debug!("{:?}", cli);

    let filter = cli.filter().context("invalid filter options")?;
    let output = cli.output().context("invalid output options")?;
    debug!(json = output.is_json(), "Output configured");

    parse_file_to_output(&cli.updateinfo, &filter, output)
        .with_context(|| format!("failed to process '{}'", cli.updateinfo.display()))?;

    Ok(())
}
