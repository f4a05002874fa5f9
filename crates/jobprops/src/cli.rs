use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use cli_table::format::Separator;
use cli_table::{Cell, CellStruct, Style, Table, print_stdout};
use serde_json::Value;

use crate::common::parser::{consume_all, p_i64};
use crate::directives::DirectiveParser;
use crate::mapping::{ConstValue, MappingTable, ValueSpec};
use crate::params::{JobParameters, Overrides};
use crate::script::DirectoryStore;

// Common CLI options
#[derive(Parser)]
pub struct CommonOpts {
    /// Enables more detailed log output
    #[arg(
        long,
        env = "JOBPROPS_DEBUG",
        global = true,
        help_heading("GLOBAL OPTIONS"),
        hide_short_help(true)
    )]
    pub debug: bool,
}

// Root CLI options
#[derive(Parser)]
#[command(
    author,
    about,
    version,
    disable_help_subcommand(true),
    help_expected(true)
)]
pub struct RootOptions {
    #[clap(flatten)]
    pub common: CommonOpts,

    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Parser)]
pub enum SubCommand {
    /// Parse the directives of a job script and print the job parameters as JSON
    Parse(ParseOpts),
    /// Display all known sbatch flags and their REST fields
    Flags,
    /// Print #SBATCH directives for job parameters stored in a JSON file
    Render(RenderOpts),
}

#[derive(Parser)]
pub struct ParseOpts {
    /// Identifier of the job script (its file name inside the script directory)
    pub script_id: String,

    /// Directory with job scripts
    #[arg(
        long,
        env = "JOBPROPS_SCRIPT_DIR",
        default_value = ".",
        value_hint = clap::ValueHint::DirPath
    )]
    pub root: PathBuf,

    /// TOML file with `field = value` pairs that override values from the script
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub overrides: Option<PathBuf>,

    /// Override a single field (`--set name=job`). Applied after `--overrides`.
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub set: Vec<String>,
}

#[derive(Parser)]
pub struct RenderOpts {
    /// JSON file with job parameters
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub path: PathBuf,
}

/// Parses a `FIELD=VALUE` assignment. The value is typed after the flag that writes the
/// field; values of fields without a flag are read as JSON, falling back to a string.
pub fn parse_override(table: &MappingTable, assignment: &str) -> anyhow::Result<(String, Value)> {
    let Some((field, value)) = assignment.split_once('=') else {
        bail!("Invalid override '{assignment}', expected FIELD=VALUE");
    };
    let field = field.trim();
    if field.is_empty() {
        bail!("Invalid override '{assignment}', field name is empty");
    }

    let spec = table
        .flag_key_for(field)
        .and_then(|key| table.entries_for_destination(key).next())
        .map(|entry| *entry.value());
    let value = match spec {
        Some(ValueSpec::Integer) => Value::from(
            consume_all(p_i64, value)
                .with_context(|| format!("Field {field} expects an integer, not '{value}'"))?,
        ),
        Some(ValueSpec::Switch(ConstValue::Bool(_))) => Value::Bool(
            value
                .parse::<bool>()
                .with_context(|| format!("Field {field} expects true or false, not '{value}'"))?,
        ),
        Some(_) => Value::String(value.to_string()),
        None => serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string())),
    };
    Ok((field.to_string(), value))
}

/// Loads overrides from a TOML document.
pub fn load_overrides_file(path: &Path) -> anyhow::Result<Overrides> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read overrides from {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid overrides file {}", path.display()))
}

/// Overrides from the optional file, then from individual assignments.
pub fn build_overrides(
    table: &MappingTable,
    file: Option<&Path>,
    assignments: &[String],
) -> anyhow::Result<Overrides> {
    let mut overrides = match file {
        Some(path) => load_overrides_file(path)?,
        None => Overrides::new(),
    };
    for assignment in assignments {
        let (field, value) = parse_override(table, assignment)?;
        overrides.insert(field, value);
    }
    Ok(overrides)
}

pub fn command_parse(opts: ParseOpts) -> anyhow::Result<()> {
    let parser = DirectiveParser::sbatch()?;
    let overrides = build_overrides(parser.table(), opts.overrides.as_deref(), &opts.set)?;
    let store = DirectoryStore::new(opts.root);
    let params = parser.job_parameters_from_store(&store, &opts.script_id, overrides)?;
    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}

fn flag_rows(table: &MappingTable) -> Vec<Vec<CellStruct>> {
    table
        .entries()
        .iter()
        .map(|entry| {
            vec![
                entry.flag_long().cell(),
                entry.flag_short().unwrap_or("").cell(),
                entry.value().describe().cell(),
                entry.rest_field().unwrap_or("-").cell(),
            ]
        })
        .collect()
}

pub fn command_flags() -> anyhow::Result<()> {
    let table = MappingTable::sbatch()?;
    let header = vec![
        "Flag".cell().bold(true),
        "Short".cell().bold(true),
        "Value".cell().bold(true),
        "REST field".cell().bold(true),
    ];
    let table = flag_rows(&table)
        .table()
        .separator(
            Separator::builder()
                .title(Some(Default::default()))
                .column(Some(Default::default()))
                .build(),
        )
        .title(header);
    print_stdout(table).context("Cannot print table to stdout")?;
    Ok(())
}

pub fn command_render(opts: RenderOpts) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&opts.path)
        .with_context(|| format!("Cannot read {}", opts.path.display()))?;
    let params: JobParameters = serde_json::from_str(&text)
        .with_context(|| format!("Invalid job parameters in {}", opts.path.display()))?;
    let parser = DirectiveParser::sbatch()?;
    print!("{}", parser.render(&params)?);
    Ok(())
}
