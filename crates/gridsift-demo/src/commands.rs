//! Subcommand handlers.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use gridsift::{
    Condition, FieldType, FilterOptions, FilterSession, GroupNode, ItemLevel, ItemSearch, Row,
    SearchMode, TypedRow,
};
use serde::Serialize;
use tracing::debug;

use crate::cli::{Cli, ColumnArgs, Command, ConditionArg, FilterArgs};
use crate::data::{self, Item};

pub fn run(cli: Cli) -> Result<()> {
    let options = match &cli.config {
        Some(path) => load_options(path)?,
        None => FilterOptions::default(),
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.data {
        Some(path) => {
            let (schema, rows) = data::load(path, &options)?;
            let mut session = FilterSession::new(rows, schema, options);
            execute(&mut session, &cli.command, cli.json, &mut out)
        }
        None => {
            debug!("no data file given, using sample rows");
            let mut session = FilterSession::new(data::sample(), Item::schema(), options);
            execute(&mut session, &cli.command, cli.json, &mut out)
        }
    }
}

fn load_options(path: &Path) -> Result<FilterOptions> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
}

pub fn execute<R: Row + Sync>(
    session: &mut FilterSession<R>,
    command: &Command,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Schema => schema(session, json, out),
        Command::Distinct(args) => distinct(session, args, json, out),
        Command::Tree(args) => tree(session, args, json, out),
        Command::Filter(args) => {
            apply_filters(session, args)?;
            print_rows(session, json, out)
        }
    }
}

#[derive(Serialize)]
struct ColumnInfo<'a> {
    name: &'a str,
    field_type: FieldType,
    conditions: Vec<&'static str>,
}

fn schema<R: Row>(session: &FilterSession<R>, json: bool, out: &mut dyn Write) -> Result<()> {
    let columns: Vec<ColumnInfo<'_>> = session
        .schema()
        .iter()
        .map(|field| ColumnInfo {
            name: &field.name,
            field_type: field.field_type,
            conditions: Condition::available_for(field.field_type)
                .iter()
                .map(|c| c.as_str())
                .collect(),
        })
        .collect();

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&columns)?)?;
        return Ok(());
    }
    for column in &columns {
        writeln!(
            out,
            "{:<16} {:<8} {}",
            column.name,
            column.field_type.as_str(),
            column.conditions.join(", ")
        )?;
    }
    Ok(())
}

fn distinct<R: Row>(
    session: &mut FilterSession<R>,
    args: &ColumnArgs,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    apply_filters(session, &args.filters)?;
    let column = session.open(&args.field)?;
    let search = item_search(session.options(), args);
    let shown: Vec<_> = column
        .search(&search)
        .into_iter()
        .filter_map(|index| column.items.get(index))
        .collect();

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&shown)?)?;
        return Ok(());
    }
    for item in shown {
        let indent = if item.level == ItemLevel::All { "" } else { "  " };
        writeln!(out, "{}{} {}", indent, checkbox(item.checked), item.label)?;
    }
    Ok(())
}

fn tree<R: Row>(
    session: &mut FilterSession<R>,
    args: &ColumnArgs,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    apply_filters(session, &args.filters)?;
    let mut column = session.open(&args.field)?;
    if column.tree.is_none() {
        bail!("column '{}' is not a date column", args.field);
    }
    let search = item_search(session.options(), args);
    if !search.is_empty() {
        column.narrow_tree(&search, session.options());
    }
    let Some(tree) = &column.tree else {
        return Ok(());
    };

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(tree)?)?;
        return Ok(());
    }
    write_node(tree, 0, out)
}

fn write_node(node: &GroupNode, depth: usize, out: &mut dyn Write) -> Result<()> {
    writeln!(
        out,
        "{:indent$}{} {}",
        "",
        checkbox(node.checked),
        node.label,
        indent = depth * 2
    )?;
    for child in &node.children {
        write_node(child, depth + 1, out)?;
    }
    Ok(())
}

fn print_rows<R: Row + Sync>(
    session: &FilterSession<R>,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let visible = session.par_visible();
    let options = session.options();

    if json {
        let rows: Vec<serde_json::Map<String, serde_json::Value>> = visible
            .iter()
            .map(|row| {
                session
                    .schema()
                    .iter()
                    .map(|field| {
                        let value = row
                            .field_value(&field.name)
                            .map(|v| serde_json::to_value(&v))
                            .transpose()?
                            .unwrap_or(serde_json::Value::Null);
                        Ok::<_, anyhow::Error>((field.name.clone(), value))
                    })
                    .collect::<Result<_>>()
            })
            .collect::<Result<_>>()?;
        writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
        return Ok(());
    }

    let header: Vec<&str> = session.schema().iter().map(|f| f.name.as_str()).collect();
    writeln!(out, "{}", header.join("\t"))?;
    for row in &visible {
        let cells: Vec<String> = session
            .schema()
            .iter()
            .map(|field| {
                row.field_value(&field.name)
                    .map(|v| options.format_value(&v))
                    .unwrap_or_default()
            })
            .collect();
        writeln!(out, "{}", cells.join("\t"))?;
    }
    writeln!(out, "({} of {} rows)", visible.len(), session.rows().len())?;
    Ok(())
}

/// Opens, edits and applies one column filter per field named in `args`.
///
/// Fields are handled in the order they first appear, so later columns only
/// offer values still visible after the earlier ones.
fn apply_filters<R: Row>(session: &mut FilterSession<R>, args: &FilterArgs) -> Result<()> {
    let mut fields: Vec<&str> = Vec::new();
    let named = args
        .conditions
        .iter()
        .map(|c| c.field.as_str())
        .chain(args.exclusions.iter().map(|e| e.field.as_str()));
    for field in named {
        if !fields.contains(&field) {
            fields.push(field);
        }
    }

    for field in fields {
        let mut column = session.open(field)?;

        for ConditionArg {
            condition, operand, ..
        } in args.conditions.iter().filter(|c| c.field == field)
        {
            column.spec.set_condition(*condition);
            column.spec.set_operand(operand.as_str());
        }

        for exclusion in args.exclusions.iter().filter(|e| e.field == field) {
            let index = column
                .items
                .iter()
                .position(|item| match item.level {
                    ItemLevel::All => false,
                    ItemLevel::Blank => exclusion.label.is_empty(),
                    ItemLevel::Value => item.label == exclusion.label,
                })
                .ok_or_else(|| {
                    anyhow!(
                        "column '{}' shows no value '{}'",
                        exclusion.field,
                        exclusion.label
                    )
                })?;
            column.set_checked(index, false);
        }

        session.apply(column)?;
    }
    Ok(())
}

fn item_search(options: &FilterOptions, args: &ColumnArgs) -> ItemSearch {
    let mode = if args.starts_with {
        SearchMode::StartsWith
    } else {
        options.search_mode
    };
    ItemSearch::new(args.search.as_deref().unwrap_or_default(), mode)
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}
