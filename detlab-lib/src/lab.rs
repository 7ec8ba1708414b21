//! Lab setup constants and the laboratory test table.
//!
//! Geometry constants describe the detector readout: chip and raw
//! coordinate ranges and the coarse tap grid each axis is divided into.
//! The test table lists every lab exposure with its emission line, energy,
//! MCP voltage, and the raw telemetry files for the source and background
//! runs.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use crate::rdb;
use crate::{Error, Result};

/// Directory holding raw background runs.
pub const BG_DIR: &str = "/data/lab/bg";
/// Merged background binfile.
pub const MERGED_BG: &str = "/data/lab/bg/merged_bg.bin";
/// Directory holding level-1 event files.
pub const EVT_DIR: &str = "/data/lab/evt1";
/// Analysis products directory.
pub const ANALYSIS_DIR: &str = "/data/lab/analysis";
/// Default lab test table.
pub const TEST_FILE: &str = "/data/lab/cal/detector_lab.rdb";

/// Chip coordinate minimum, 1-based inclusive.
pub const CHIPX_MIN: usize = 1;
pub const CHIPX_MAX: usize = 4096;
pub const CHIPY_MIN: usize = 1;
pub const CHIPY_MAX: usize = 16384;

/// Raw detector coordinates; three chips stacked along y.
pub const RAWX_MIN: usize = CHIPX_MIN;
pub const RAWX_MAX: usize = CHIPX_MAX;
pub const RAWY_MIN: usize = CHIPY_MIN;
pub const RAWY_MAX: usize = 3 * CHIPY_MAX;

/// Coarse tap size in raw coordinate units.
pub const TAP_SIZE: usize = 256;
/// Subtap subdivisions per tap along each axis.
pub const SUBTAPS: usize = 3;

/// Columns of the lab test table, one entry per exposure.
#[derive(Debug, Default, Clone)]
pub struct TestData {
    /// Emission line name.
    pub line: Vec<String>,
    /// Line energy in eV.
    pub energy: Vec<i64>,
    /// MCP high voltage setting.
    pub mcp: Vec<i64>,
    /// Source exposure time in seconds.
    pub time: Vec<i64>,
    /// Raw telemetry file of the source run.
    pub hrc_file: Vec<String>,
    /// Background exposure time in seconds.
    pub bg_time: Vec<i64>,
    /// Raw telemetry file of the background run.
    pub bg_hrc_file: Vec<String>,
}

impl TestData {
    /// Load the test table at `path`.
    ///
    /// # Errors
    /// [`Error::Io`] opening or reading the file, [`Error::MissingColumn`]
    /// or [`Error::InvalidTable`] if the table does not have the expected
    /// shape, [`Error::InvalidValue`] for non-numeric values in numeric
    /// columns.
    pub fn load<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        debug!(?path, "loading test table");
        let file = File::open(path)?;
        let mut cols = rdb::read_columns(
            BufReader::new(file),
            &[
                "line", "energy", "MCP", "time", "HRC_file", "b_time", "b_HRC_file",
            ],
        )?;

        // read_columns guarantees every requested column is present
        let mut take = |name: &str| cols.remove(name).unwrap_or_default();
        let line = take("line");
        let energy = take("energy");
        let mcp = take("MCP");
        let time = take("time");
        let hrc_file = take("HRC_file");
        let bg_time = take("b_time");
        let bg_hrc_file = take("b_HRC_file");

        Ok(TestData {
            line,
            energy: numbers("energy", energy)?,
            mcp: numbers("MCP", mcp)?,
            time: numbers("time", time)?,
            hrc_file,
            bg_time: numbers("b_time", bg_time)?,
            bg_hrc_file,
        })
    }

    /// Number of exposures in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.line.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }
}

fn numbers(column: &str, values: Vec<String>) -> Result<Vec<i64>> {
    values
        .into_iter()
        .map(|value| match value.parse() {
            Ok(number) => Ok(number),
            Err(_) => Err(Error::InvalidValue {
                column: column.to_string(),
                value,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const TABLE: &str = "line\tenergy\tMCP\ttime\tHRC_file\tb_time\tb_HRC_file\n\
N\tN\tN\tN\tS\tN\tS\n\
B-K\t183\t2350\t300\trun042.rm\t600\tbg042.rm\n\
Al-K\t1487\t2400\t120\trun043.rm\t240\tbg043.rm\n";

    #[test]
    fn load_test_table() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(TABLE.as_bytes()).unwrap();

        let data = TestData::load(tmp.path()).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.line, ["B-K", "Al-K"]);
        assert_eq!(data.energy, [183, 1487]);
        assert_eq!(data.mcp, [2350, 2400]);
        assert_eq!(data.time, [300, 120]);
        assert_eq!(data.hrc_file, ["run042.rm", "run043.rm"]);
        assert_eq!(data.bg_time, [600, 240]);
        assert_eq!(data.bg_hrc_file, ["bg042.rm", "bg043.rm"]);
    }

    #[test]
    fn bad_number_names_the_column() {
        let table = TABLE.replace("1487", "n/a");
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(table.as_bytes()).unwrap();

        let err = TestData::load(tmp.path()).unwrap_err();
        match err {
            Error::InvalidValue { column, value } => {
                assert_eq!(column, "energy");
                assert_eq!(value, "n/a");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn raw_coordinate_ranges_cover_three_chips() {
        assert_eq!(RAWY_MAX, 3 * CHIPY_MAX);
        assert_eq!(RAWX_MAX, CHIPX_MAX);
        // taps tile the raw coordinate range
        assert_eq!(RAWY_MAX % TAP_SIZE, 0);
    }
}
