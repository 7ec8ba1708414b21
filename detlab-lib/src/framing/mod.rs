//! Fast telemetry frame reassembly.
//!
//! The fast telemetry path produces an unframed byte stream structured as
//! (tag, value) byte pairs. A pair tagged [`SYNC_TAG`] starts a new event
//! and the 15 pairs that follow must carry [`CONT_TAG`]; the 16 value
//! bytes of a fully tagged run form one event. 512 events make one
//! [`FRAME_LEN`]-byte [`Frame`].
//!
//! Loss of sync is expected and is not an error: the event in progress is
//! discarded and scanning resumes at the pair following the bad tag.

mod chunks;
mod synchronizer;

pub use synchronizer::*;

/// Tag byte marking the first pair of a new event.
pub const SYNC_TAG: u8 = 1;
/// Tag byte marking a pair that extends the event being assembled.
pub const CONT_TAG: u8 = 0;
/// Number of value bytes in one event.
pub const EVENT_LEN: usize = 16;
/// Number of events in a reassembled frame.
pub const FRAME_EVENTS: usize = 512;
/// Size in bytes of a reassembled frame.
pub const FRAME_LEN: usize = EVENT_LEN * FRAME_EVENTS;

/// A reassembled telemetry frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame bytes, always [`FRAME_LEN`] long. Event slots past `events`
    /// are zero.
    pub data: Vec<u8>,
    /// Number of valid events in `data`.
    pub events: usize,
}

impl Frame {
    /// True when all [`FRAME_EVENTS`] event slots are filled.
    ///
    /// Only the terminal frame flushed at end of input may be incomplete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.events == FRAME_EVENTS
    }
}
