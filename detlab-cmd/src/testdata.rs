use std::fmt::Display;
use std::io::{stdout, Write};
use std::path::Path;

use anyhow::{Context, Result};
use detlab::lab::TestData;
use tracing::debug;

fn row<T>(values: &[T]) -> String
where
    T: Display,
{
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<String>>()
        .join(" ")
}

/// Dump the test table columns, one line per column.
pub fn testdata(config: &Path) -> Result<()> {
    let data = TestData::load(config).with_context(|| format!("loading test table {config:?}"))?;
    debug!(runs = data.len(), "loaded test table");

    let mut out = stdout().lock();
    writeln!(out, "{}", row(&data.line))?;
    writeln!(out, "{}", row(&data.hrc_file))?;
    writeln!(out, "{}", row(&data.bg_hrc_file))?;
    writeln!(out, "{}", row(&data.mcp))?;
    writeln!(out, "{}", row(&data.energy))?;
    writeln!(out, "{}", row(&data.time))?;
    writeln!(out, "{}", row(&data.bg_time))?;

    Ok(())
}
