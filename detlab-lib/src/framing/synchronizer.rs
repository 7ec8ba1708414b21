use std::io::Read;

use tracing::trace;

use super::chunks::{Chunks, CHUNK_LEN};
use super::{Frame, CONT_TAG, EVENT_LEN, FRAME_EVENTS, FRAME_LEN, SYNC_TAG};
use crate::Result;

/// Reassembles [`Frame`]s from a raw fast telemetry byte stream.
///
/// The source is consumed in fixed 8192-byte chunks and scanned two bytes
/// at a time as (tag, value) pairs. A [`SYNC_TAG`] pair begins an event;
/// the next 15 pairs must carry [`CONT_TAG`] or the event is discarded and
/// the scan resumes at the pair after the bad tag. The scan is strictly
/// forward; malformed pairs are consumed, never re-examined.
///
/// When the source is exhausted the frame in progress is produced exactly
/// once, however full it is. Use [`Frame::is_complete`] to tell the
/// best-effort terminal flush from a full frame.
pub struct FrameSynchronizer<R>
where
    R: Read + Send,
{
    chunks: Chunks<R>,
    // Current chunk and scan position. `len` < CHUNK_LEN only for the
    // final chunk of the stream.
    chunk: Vec<u8>,
    len: usize,
    pos: usize,
    // Frame assembly buffer, replaced on every flush so an emitted frame
    // never aliases the one being filled.
    frame: Vec<u8>,
    events: usize,
    done: bool,
}

impl<R> FrameSynchronizer<R>
where
    R: Read + Send,
{
    pub fn new(reader: R) -> Self {
        FrameSynchronizer {
            chunks: Chunks::new(reader),
            chunk: vec![0u8; CHUNK_LEN],
            len: 0,
            pos: 0,
            frame: vec![0u8; FRAME_LEN],
            events: 0,
            done: false,
        }
    }

    /// Produce the next frame.
    ///
    /// Returns the terminal, possibly incomplete frame exactly once when
    /// the source is exhausted and `None` on every call after that.
    ///
    /// # Errors
    /// Any read error on the source is fatal and returned immediately;
    /// the synchronizer produces nothing further afterwards.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.done {
            return Ok(None);
        }
        loop {
            let event = match self.next_event() {
                Ok(event) => event,
                Err(err) => {
                    self.done = true;
                    return Err(err);
                }
            };
            match event {
                Some(event) => {
                    let at = self.events * EVENT_LEN;
                    self.frame[at..at + EVENT_LEN].copy_from_slice(&event);
                    self.events += 1;
                    if self.events == FRAME_EVENTS {
                        return Ok(Some(self.flush()));
                    }
                }
                None => {
                    self.done = true;
                    trace!(events = self.events, "source exhausted, flushing");
                    return Ok(Some(self.flush()));
                }
            }
        }
    }

    /// Scan forward to the next fully valid event.
    ///
    /// Returns `None` when the source is exhausted; an event cut off by
    /// end of input is discarded like any other invalid event.
    fn next_event(&mut self) -> Result<Option<[u8; EVENT_LEN]>> {
        let mut event = [0u8; EVENT_LEN];
        'scan: loop {
            let Some((tag, value)) = self.next_pair()? else {
                return Ok(None);
            };
            if tag != SYNC_TAG {
                continue;
            }
            event[0] = value;
            for slot in event.iter_mut().skip(1) {
                let Some((tag, value)) = self.next_pair()? else {
                    return Ok(None);
                };
                if tag != CONT_TAG {
                    // Sync loss. The bad pair is consumed along with the
                    // rest of the attempted event.
                    continue 'scan;
                }
                *slot = value;
            }
            return Ok(Some(event));
        }
    }

    /// Next (tag, value) pair, or `None` once the source is exhausted.
    /// An unpaired trailing byte in the final chunk is dropped.
    fn next_pair(&mut self) -> Result<Option<(u8, u8)>> {
        if self.pos + 2 > self.len {
            self.len = self.chunks.next(&mut self.chunk)?;
            self.pos = 0;
            if self.len < 2 {
                return Ok(None);
            }
        }
        let pair = (self.chunk[self.pos], self.chunk[self.pos + 1]);
        self.pos += 2;
        Ok(Some(pair))
    }

    /// Hand off the assembled frame and reset for the next one. The
    /// replacement buffer starts zeroed; a partial terminal flush never
    /// carries bytes from an already emitted frame.
    fn flush(&mut self) -> Frame {
        let events = self.events;
        self.events = 0;
        let data = std::mem::replace(&mut self.frame, vec![0u8; FRAME_LEN]);
        Frame { data, events }
    }
}

impl<R> IntoIterator for FrameSynchronizer<R>
where
    R: Read + Send,
{
    type Item = Result<Frame>;
    type IntoIter = FrameIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        FrameIter { sync: self }
    }
}

/// Iterates the frames produced by a [`FrameSynchronizer`]. Created with
/// ``FrameSynchronizer::into_iter``.
pub struct FrameIter<R>
where
    R: Read + Send,
{
    sync: FrameSynchronizer<R>,
}

impl<R> Iterator for FrameIter<R>
where
    R: Read + Send,
{
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.sync.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

/// Creates an iterator producing the reassembled frames in `reader`.
///
/// The last frame produced is the terminal flush and may be incomplete;
/// every frame's `data` is [`FRAME_LEN`] bytes regardless, so concatenated
/// frame output stays frame-size aligned.
///
/// # Errors
/// Any error reading from the stream ends the iteration after yielding it.
pub fn read_frames<'a, R>(reader: R) -> impl Iterator<Item = Result<Frame>> + 'a
where
    R: Read + Send + 'a,
{
    FrameSynchronizer::new(reader).into_iter()
}
