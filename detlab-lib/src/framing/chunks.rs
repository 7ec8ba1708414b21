use std::io::{self, ErrorKind, Read};

/// Number of bytes per read from the telemetry source.
pub(crate) const CHUNK_LEN: usize = 8192;

/// Reads a stream in fixed [`CHUNK_LEN`] chunks.
///
/// A chunk is filled completely before it is handed out, so a short count
/// can only happen on the final chunk before end of stream.
pub(crate) struct Chunks<R>
where
    R: Read,
{
    reader: R,
}

impl<R> Chunks<R>
where
    R: Read,
{
    pub fn new(reader: R) -> Self {
        Chunks { reader }
    }

    /// Fill `buf` from the source and return the number of bytes read.
    /// Zero means the source is exhausted.
    pub fn next(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.reader.read(&mut buf[n..]) {
                Ok(0) => break,
                Ok(k) => n += k,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(n)
    }
}
