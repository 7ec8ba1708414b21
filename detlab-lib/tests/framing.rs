use detlab::framing::{
    read_frames, Frame, FrameSynchronizer, CONT_TAG, EVENT_LEN, FRAME_EVENTS, FRAME_LEN, SYNC_TAG,
};
use rand::{Rng, SeedableRng};

/// Encode one well-formed event from 16 value bytes.
fn encode_event(values: &[u8; EVENT_LEN]) -> Vec<u8> {
    let mut dat = Vec::with_capacity(EVENT_LEN * 2);
    for (i, value) in values.iter().enumerate() {
        dat.push(if i == 0 { SYNC_TAG } else { CONT_TAG });
        dat.push(*value);
    }
    dat
}

/// Encode `count` events with deterministic value bytes, returning the
/// raw pair stream and the expected reassembled bytes.
fn encode_events(count: usize) -> (Vec<u8>, Vec<u8>) {
    let mut stream = Vec::new();
    let mut expected = Vec::new();
    for n in 0..count {
        let mut values = [0u8; EVENT_LEN];
        for (i, v) in values.iter_mut().enumerate() {
            *v = ((n * EVENT_LEN + i) % 255) as u8;
        }
        stream.extend(encode_event(&values));
        expected.extend_from_slice(&values);
    }
    (stream, expected)
}

#[test]
fn one_full_frame_in_order() {
    let (stream, expected) = encode_events(FRAME_EVENTS);

    let frames: Vec<Frame> = read_frames(&stream[..]).map(Result::unwrap).collect();

    // the complete frame plus the terminal flush
    assert_eq!(frames.len(), 2);
    assert!(frames[0].is_complete());
    assert_eq!(frames[0].data, expected);
    assert_eq!(frames[1].events, 0);
}

#[test]
fn frame_boundaries_stay_aligned_for_noise_input() {
    // Random bytes, a prime-ish length so the stream ends mid-everything.
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let mut noise = vec![0u8; 3 * 8192 + 1031];
    rng.fill(&mut noise[..]);

    let mut total = 0usize;
    for zult in read_frames(&noise[..]) {
        let frame = zult.unwrap();
        assert_eq!(frame.data.len(), FRAME_LEN);
        total += frame.data.len();
    }
    assert_eq!(total % FRAME_LEN, 0);
}

#[test]
fn broken_event_is_dropped_and_scan_recovers() {
    let mut stream = Vec::new();

    // An event broken 5 pairs in by an unexpected sync tag.
    stream.extend_from_slice(&[SYNC_TAG, 0x10]);
    for _ in 0..4 {
        stream.extend_from_slice(&[CONT_TAG, 0x11]);
    }
    stream.extend_from_slice(&[SYNC_TAG, 0x12]);

    // Two good events after the break.
    stream.extend(encode_event(&[0xa0; EVENT_LEN]));
    stream.extend(encode_event(&[0xb0; EVENT_LEN]));

    let frames: Vec<Frame> = read_frames(&stream[..]).map(Result::unwrap).collect();
    assert_eq!(frames.len(), 1);
    let frame = &frames[0];
    assert_eq!(frame.events, 2, "only the two good events survive");
    assert_eq!(frame.data[..EVENT_LEN], [0xa0; EVENT_LEN]);
    assert_eq!(frame.data[EVENT_LEN..2 * EVENT_LEN], [0xb0; EVENT_LEN]);
}

#[test]
fn input_shorter_than_one_chunk_flushes_once() {
    let (stream, expected) = encode_events(3);
    assert!(stream.len() < 8192);

    let mut sync = FrameSynchronizer::new(&stream[..]);
    let frame = sync.next_frame().unwrap().expect("one terminal flush");
    assert_eq!(frame.events, 3);
    assert_eq!(frame.data[..expected.len()], expected[..]);
    assert!(frame.data[expected.len()..].iter().all(|&b| b == 0));

    assert!(sync.next_frame().unwrap().is_none());
    assert!(sync.next_frame().unwrap().is_none());
}

#[test]
fn events_in_a_short_final_chunk_are_kept() {
    // 256 events fill the first chunk exactly; the rest land in a short
    // final chunk and must still be recovered.
    let (stream, _) = encode_events(256 + 10);
    assert_eq!(stream.len(), 8192 + 320);

    let frames: Vec<Frame> = read_frames(&stream[..]).map(Result::unwrap).collect();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].events, 266);
}

#[test]
fn multiple_frames_then_partial_flush() {
    let (stream, expected) = encode_events(2 * FRAME_EVENTS + 17);

    let frames: Vec<Frame> = read_frames(&stream[..]).map(Result::unwrap).collect();
    assert_eq!(frames.len(), 3);
    assert!(frames[0].is_complete());
    assert!(frames[1].is_complete());
    assert_eq!(frames[2].events, 17);

    let mut got = Vec::new();
    got.extend_from_slice(&frames[0].data);
    got.extend_from_slice(&frames[1].data);
    got.extend_from_slice(&frames[2].data[..17 * EVENT_LEN]);
    assert_eq!(got, expected);
}

#[test]
fn read_error_is_fatal() {
    struct Broken;
    impl std::io::Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "device gone"))
        }
    }

    let mut iter = read_frames(Broken);
    assert!(matches!(iter.next(), Some(Err(detlab::Error::Io(_)))));
    assert!(iter.next().is_none(), "nothing is produced after a failure");
}
