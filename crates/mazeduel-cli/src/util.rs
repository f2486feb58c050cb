use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use mazeduel_grid::{Cell, GridLayout};
use mazeduel_training::OptimizerParams;
use serde::{Serialize, de::DeserializeOwned};

use crate::schema::policy_model::PolicyModel;

/// Writes `value` as pretty JSON to `path`, or to stdout if there is none.
pub fn write_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize,
{
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_json_to(BufWriter::new(file), value)
                .with_context(|| format!("Failed to write JSON to {}", path.display()))
        }
        None => write_json_to(io::stdout().lock(), value).context("Failed to write JSON to stdout"),
    }
}

fn write_json_to<W, T>(mut writer: W, value: &T) -> anyhow::Result<()>
where
    W: Write,
    T: Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}

pub fn read_policy_model_file<P>(path: P) -> anyhow::Result<PolicyModel>
where
    P: AsRef<Path>,
{
    read_json_file("policy model", path)
}

pub fn read_layout_file<P>(path: P) -> anyhow::Result<GridLayout>
where
    P: AsRef<Path>,
{
    read_json_file("grid layout", path)
}

/// Read optimizer parameters; fields missing from the file keep their defaults.
pub fn read_params_file<P>(path: P) -> anyhow::Result<OptimizerParams>
where
    P: AsRef<Path>,
{
    read_json_file("optimizer parameters", path)
}

/// Parses a `row,col` pair.
pub fn parse_cell(s: &str) -> Result<Cell, String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `row,col`, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid coordinate {v:?}: {e}"))
    };
    Ok(Cell::new(parse(row)?, parse(col)?))
}
