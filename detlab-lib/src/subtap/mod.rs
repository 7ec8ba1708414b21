//! Subtap PHA histogram decoding.
//!
//! A binfile is a sequence of fixed-layout records, one per subtap: a
//! 32-byte header of eight big-endian u32 words followed by a 256-entry
//! big-endian u32 histogram payload, [`RECORD_LEN`] bytes in all. A
//! well-formed file is an exact multiple of the record length; a record
//! that starts but cannot be completed is a truncation error.

use std::io::{ErrorKind, Read};

use tracing::trace;

use crate::{Error, Result};

/// Total size in bytes of one subtap record.
pub const RECORD_LEN: usize = SubtapHeader::LEN + Histogram::LEN;

/// Single normalization point for the on-disk byte order. Records store
/// every multi-byte word most significant byte first; decoded values are
/// identical on any host.
fn be32(dat: &[u8], off: usize) -> u32 {
    u32::from_be_bytes([dat[off], dat[off + 1], dat[off + 2], dat[off + 3]])
}

/// Fixed-layout subtap record header.
///
/// Word order on disk: ytap, ysubtap, xtap, xsubtap, y1, y2, x1, x2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubtapHeader {
    pub ytap: u32,
    pub ysubtap: u32,
    pub xtap: u32,
    pub xsubtap: u32,
    /// Raw y coordinate range covered by this subtap, inclusive.
    pub y1: u32,
    pub y2: u32,
    /// Raw x coordinate range covered by this subtap, inclusive.
    pub x1: u32,
    pub x2: u32,
}

impl SubtapHeader {
    /// Header length in bytes.
    pub const LEN: usize = 32;

    /// Decode from bytes, or `None` if there are not enough bytes.
    #[must_use]
    pub fn decode(dat: &[u8]) -> Option<Self> {
        if dat.len() < Self::LEN {
            return None;
        }
        Some(SubtapHeader {
            ytap: be32(dat, 0),
            ysubtap: be32(dat, 4),
            xtap: be32(dat, 8),
            xsubtap: be32(dat, 12),
            y1: be32(dat, 16),
            y2: be32(dat, 20),
            x1: be32(dat, 24),
            x2: be32(dat, 28),
        })
    }
}

/// 256-bin pulse-height histogram for one subtap.
///
/// Bin `i` holds the count for pulse-height value `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Histogram {
    pub counts: Vec<u32>,
}

impl Histogram {
    /// Number of bins.
    pub const BINS: usize = 256;
    /// Payload length in bytes.
    pub const LEN: usize = Self::BINS * 4;

    /// Decode from bytes, or `None` if there are not enough bytes.
    #[must_use]
    pub fn decode(dat: &[u8]) -> Option<Self> {
        if dat.len() < Self::LEN {
            return None;
        }
        let counts = (0..Self::BINS).map(|bin| be32(dat, bin * 4)).collect();
        Some(Histogram { counts })
    }

    /// (bin, count) pairs in bin order.
    pub fn bins(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(bin, count)| (bin as u32, *count))
    }
}

/// One decoded subtap record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Subtap {
    pub header: SubtapHeader,
    pub histogram: Histogram,
}

/// Sequential reader over the subtap records in a binfile.
///
/// The reader owns the handle and holds an exclusive cursor over it; each
/// call advances past exactly one record. A clean end of file on a record
/// boundary is the end marker, after which the reader stays exhausted.
/// The sequence is not restartable; reopen the file for another pass.
pub struct SubtapReader<R>
where
    R: Read + Send,
{
    reader: R,
    // Payload scratch, reused across records.
    scratch: Vec<u8>,
    offset: u64,
    done: bool,
}

impl<R> SubtapReader<R>
where
    R: Read + Send,
{
    pub fn new(reader: R) -> Self {
        SubtapReader {
            reader,
            scratch: vec![0u8; Histogram::LEN],
            offset: 0,
            done: false,
        }
    }

    /// Current byte position of the cursor. Advances by [`RECORD_LEN`]
    /// per successful call; a truncation failure does not advance past
    /// the failure point.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.offset
    }

    /// Decode the next record header and skip its histogram payload.
    ///
    /// Returns `Ok(None)` at a clean end of file on a record boundary.
    ///
    /// # Errors
    /// [`Error::Truncated`] if the header or the skipped payload cannot
    /// be read in full; [`Error::Io`] on any other read failure. Either
    /// is fatal: the reader is exhausted afterwards.
    pub fn next_header(&mut self) -> Result<Option<SubtapHeader>> {
        let Some(header) = self.read_header()? else {
            return Ok(None);
        };
        self.read_payload()?;
        Ok(Some(header))
    }

    /// Decode the next record header and its histogram.
    ///
    /// End and failure behavior are the same as [`SubtapReader::next_header`].
    pub fn next_record(&mut self) -> Result<Option<Subtap>> {
        let Some(header) = self.read_header()? else {
            return Ok(None);
        };
        self.read_payload()?;
        // cannot fail, scratch is exactly one payload long
        let histogram = Histogram::decode(&self.scratch).unwrap();
        Ok(Some(Subtap { header, histogram }))
    }

    fn read_header(&mut self) -> Result<Option<SubtapHeader>> {
        if self.done {
            return Ok(None);
        }
        let mut buf = [0u8; SubtapHeader::LEN];
        let n = match fill(&mut self.reader, &mut buf) {
            Ok(n) => n,
            Err(err) => {
                self.done = true;
                return Err(Error::Io(err));
            }
        };
        if n == 0 {
            self.done = true;
            trace!(offset = self.offset, "end of binfile");
            return Ok(None);
        }
        if n < SubtapHeader::LEN {
            self.done = true;
            return Err(Error::Truncated {
                offset: self.offset,
                needed: SubtapHeader::LEN,
                got: n,
            });
        }
        self.offset += SubtapHeader::LEN as u64;
        // cannot fail, buf is exactly one header long
        Ok(Some(SubtapHeader::decode(&buf).unwrap()))
    }

    /// Read the histogram payload into scratch. The header already
    /// started this record, so running out of bytes here is a truncation,
    /// never a clean end.
    fn read_payload(&mut self) -> Result<()> {
        let n = match fill(&mut self.reader, &mut self.scratch) {
            Ok(n) => n,
            Err(err) => {
                self.done = true;
                return Err(Error::Io(err));
            }
        };
        if n < Histogram::LEN {
            self.done = true;
            return Err(Error::Truncated {
                offset: self.offset,
                needed: Histogram::LEN,
                got: n,
            });
        }
        self.offset += Histogram::LEN as u64;
        Ok(())
    }
}

/// Fill `buf` from `reader`, returning the number of bytes available.
fn fill<R>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: Read,
{
    let mut n = 0;
    while n < buf.len() {
        match reader.read(&mut buf[n..]) {
            Ok(0) => break,
            Ok(k) => n += k,
            Err(err) if err.kind() == ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(n)
}

impl<R> IntoIterator for SubtapReader<R>
where
    R: Read + Send,
{
    type Item = Result<Subtap>;
    type IntoIter = SubtapIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        SubtapIter { reader: self }
    }
}

/// Iterates full records from a [`SubtapReader`]. Created with
/// ``SubtapReader::into_iter``.
pub struct SubtapIter<R>
where
    R: Read + Send,
{
    reader: SubtapReader<R>,
}

impl<R> Iterator for SubtapIter<R>
where
    R: Read + Send,
{
    type Item = Result<Subtap>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.next_record() {
            Ok(Some(subtap)) => Some(Ok(subtap)),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

/// Creates an iterator producing every subtap record in `reader`.
///
/// # Errors
/// Truncation or read errors end the iteration after being yielded.
pub fn read_subtaps<'a, R>(reader: R) -> impl Iterator<Item = Result<Subtap>> + 'a
where
    R: Read + Send + 'a,
{
    SubtapReader::new(reader).into_iter()
}
