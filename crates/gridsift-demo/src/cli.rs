//! Command line definition.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use gridsift::Condition;

#[derive(Debug, Parser)]
#[command(name = "gridsift", version, about = "Spreadsheet-style column filters over JSON rows")]
pub struct Cli {
    /// JSON data file: {"schema": [{"name", "field_type"}], "rows": [{...}]}.
    /// Uses a built-in sample when omitted.
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// YAML file overriding engine options.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Raise log verbosity (-v, -vv). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List columns with their types and conditions.
    Schema,
    /// Show the check-list of one column.
    Distinct(ColumnArgs),
    /// Show the year/month/day tree of a date column.
    Tree(ColumnArgs),
    /// Apply filters and print the visible rows.
    Filter(FilterArgs),
}

#[derive(Debug, Args)]
pub struct ColumnArgs {
    /// Column name.
    pub field: String,

    /// Only show entries whose label matches.
    #[arg(long)]
    pub search: Option<String>,

    /// Match the search text at the start of labels.
    #[arg(long)]
    pub starts_with: bool,

    #[command(flatten)]
    pub filters: FilterArgs,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Condition as FIELD:CONDITION:OPERAND, e.g. "price:>=:15" or "name:contains:item".
    #[arg(long = "where", value_name = "FIELD:COND:OPERAND")]
    pub conditions: Vec<ConditionArg>,

    /// Hide rows whose FIELD shows VALUE. An empty VALUE hides blanks.
    #[arg(long = "exclude", value_name = "FIELD=VALUE")]
    pub exclusions: Vec<ExclusionArg>,
}

/// `--where FIELD:CONDITION:OPERAND`
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionArg {
    pub field: String,
    pub condition: Condition,
    pub operand: String,
}

impl FromStr for ConditionArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(field), Some(condition), Some(operand)) = (parts.next(), parts.next(), parts.next())
        else {
            bail!("expected FIELD:CONDITION:OPERAND, got '{}'", s);
        };
        if field.is_empty() {
            bail!("missing field name in '{}'", s);
        }
        let condition = condition
            .parse::<Condition>()
            .with_context(|| format!("in '{}'", s))?;
        Ok(ConditionArg {
            field: field.to_string(),
            condition,
            operand: operand.to_string(),
        })
    }
}

/// `--exclude FIELD=VALUE`
#[derive(Debug, Clone, PartialEq)]
pub struct ExclusionArg {
    pub field: String,
    pub label: String,
}

impl FromStr for ExclusionArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, label) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected FIELD=VALUE, got '{}'", s))?;
        if field.is_empty() {
            bail!("missing field name in '{}'", s);
        }
        Ok(ExclusionArg {
            field: field.to_string(),
            label: label.to_string(),
        })
    }
}
