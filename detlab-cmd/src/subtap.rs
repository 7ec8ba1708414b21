use std::fs::File;
use std::io::{stdout, BufReader, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use detlab::subtap::{SubtapHeader, SubtapReader};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone)]
pub enum Format {
    Json,
    Text,
}

impl clap::ValueEnum for Format {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Json, Self::Text]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
            Self::Text => Some(clap::builder::PossibleValue::new("text")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct Info {
    filename: String,
    count: usize,
    subtaps: Vec<SubtapHeader>,
}

/// List every subtap header in the binfile.
pub fn info(input: &Path, format: &Format) -> Result<()> {
    let file = File::open(input).with_context(|| format!("opening {input:?}"))?;
    let mut reader = SubtapReader::new(BufReader::new(file));

    let mut subtaps: Vec<SubtapHeader> = Vec::new();
    while let Some(header) = reader.next_header().context("reading subtap header")? {
        subtaps.push(header);
    }
    debug!(count = subtaps.len(), "read subtap headers");

    match format {
        Format::Json => {
            let info = Info {
                filename: input.to_string_lossy().to_string(),
                count: subtaps.len(),
                subtaps,
            };
            serde_json::to_writer_pretty(stdout(), &info).context("serializing to json")?;
        }
        Format::Text => {
            let mut out = stdout().lock();
            writeln!(out, "ytap\tysubtap\txtap\txsubtap\ty1\ty2\tx1\tx2")?;
            writeln!(out, "N\tN\tN\tN\tN\tN\tN\tN")?;
            for h in &subtaps {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    h.ytap, h.ysubtap, h.xtap, h.xsubtap, h.y1, h.y2, h.x1, h.x2
                )?;
            }
        }
    }

    Ok(())
}

/// Extract the histogram of the subtap at `coord`.
pub fn hist(input: &Path, coord: (u32, u32, u32, u32), format: &Format) -> Result<()> {
    let (ytap, ysubtap, xtap, xsubtap) = coord;
    let file = File::open(input).with_context(|| format!("opening {input:?}"))?;
    let reader = SubtapReader::new(BufReader::new(file));

    for zult in reader {
        let subtap = zult.context("reading subtap record")?;
        let h = &subtap.header;
        if (h.ytap, h.ysubtap, h.xtap, h.xsubtap) != (ytap, ysubtap, xtap, xsubtap) {
            continue;
        }

        match format {
            Format::Json => {
                serde_json::to_writer_pretty(stdout(), &subtap).context("serializing to json")?;
            }
            Format::Text => {
                let mut out = stdout().lock();
                writeln!(out, "pha\tn")?;
                writeln!(out, "N\tN")?;
                for (pha, count) in subtap.histogram.bins() {
                    writeln!(out, "{pha}\t{count}")?;
                }
            }
        }
        return Ok(());
    }

    bail!("no subtap ({ytap}, {ysubtap}, {xtap}, {xsubtap}) in {input:?}");
}
