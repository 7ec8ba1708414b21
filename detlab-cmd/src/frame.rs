use std::fs::File;
use std::io::{stdin, stdout, BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use detlab::framing::read_frames;
use tracing::{info, warn};

pub fn frame(input: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let src: Box<dyn Read + Send> = match input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {path:?}"))?,
        )),
        None => Box::new(stdin()),
    };
    let mut dst: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {path:?}"))?,
        )),
        None => Box::new(stdout()),
    };

    let mut frames = 0usize;
    let mut events = 0usize;
    let mut bytes = 0usize;
    for zult in read_frames(src) {
        let frame = zult.context("reassembling frames")?;
        if !frame.is_complete() {
            warn!(events = frame.events, "incomplete frame at end of input");
        }
        dst.write_all(&frame.data).context("writing frame")?;
        frames += 1;
        events += frame.events;
        bytes += frame.data.len();
    }
    dst.flush().context("flushing output")?;

    info!(frames, events, bytes, "done");

    Ok(())
}
