//! KISS Protocol Tests
//!
//! Tests for the host-side KISS decoder, the frame encoder and how the
//! TNC applies decoded commands.
//! Run with: cargo test --test kiss_tests

use tnc_firmware::config::{KissParams, StationConfig, KISS_PACKET_LEN, KISS_TIMEOUT};
use tnc_firmware::protocol::kiss::{
    encode_frame, KissCommand, KissDecoder, KissFrame, FEND, FESC, TFEND, TFESC,
};
use tnc_firmware::radio::audio::AudioLink;
use tnc_firmware::radio::port::Port;
use tnc_firmware::radio::tnc::{KissOutcome, Tnc};
use tnc_firmware::types::TimingMode;
use tnc_firmware::TncError;

/// Feed bytes, collecting every decoded frame as port and debug text
fn decode_all(dec: &mut KissDecoder, bytes: &[u8]) -> Vec<(u8, String)> {
    let mut out = Vec::new();
    for &b in bytes {
        if let Some(frame) = dec.feed(b, 0) {
            out.push((frame.port, format!("{:?}", frame.command)));
        }
    }
    out
}

// =============================================================================
// Decoder Tests
// =============================================================================

#[test]
fn test_data_frame() {
    let mut dec = KissDecoder::new();
    let mut got = None;
    for &b in &[FEND, 0x00, b'h', b'i', FEND] {
        if let Some(frame) = dec.feed(b, 0) {
            assert_eq!(frame.port, 0);
            assert_eq!(frame.command, KissCommand::Data(b"hi"));
            got = Some(());
        }
    }
    assert!(got.is_some());
}

#[test]
fn test_escapes_are_undone() {
    let mut dec = KissDecoder::new();
    let bytes = [FEND, 0x00, 1, FESC, TFEND, 2, FESC, TFESC, 3, FEND];
    let mut payload = Vec::new();
    for &b in &bytes {
        if let Some(KissFrame {
            command: KissCommand::Data(d),
            ..
        }) = dec.feed(b, 0)
        {
            payload.extend_from_slice(d);
        }
    }
    assert_eq!(payload, vec![1, FEND, 2, FESC, 3]);
}

#[test]
fn test_parameter_commands() {
    let mut dec = KissDecoder::new();
    let got = decode_all(
        &mut dec,
        &[
            FEND, 0x01, 30, FEND, //
            FEND, 0x02, 128, FEND, //
            FEND, 0x03, 5, FEND, //
            FEND, 0x04, 2, FEND, //
            FEND, 0x05, 1, FEND, //
            FEND, 0x05, 0, FEND,
        ],
    );
    let expected = [
        KissCommand::TxDelay(30),
        KissCommand::Persistence(128),
        KissCommand::SlotTime(5),
        KissCommand::TxTail(2),
        KissCommand::FullDuplex(true),
        KissCommand::FullDuplex(false),
    ];
    assert_eq!(got.len(), expected.len());
    for ((port, cmd), exp) in got.iter().zip(expected.iter()) {
        assert_eq!(*port, 0);
        assert_eq!(cmd, &format!("{exp:?}"));
    }
}

#[test]
fn test_port_from_high_nibble() {
    let mut dec = KissDecoder::new();
    let got = decode_all(&mut dec, &[FEND, 0x21, 10, FEND]);
    assert_eq!(got, vec![(2, format!("{:?}", KissCommand::TxDelay(10)))]);
}

#[test]
fn test_unknown_and_hardware() {
    let mut dec = KissDecoder::new();
    let got = decode_all(&mut dec, &[FEND, 0x06, 9, 8, FEND, FEND, 0x0a, 1, FEND]);
    assert_eq!(
        got,
        vec![
            (0, format!("{:?}", KissCommand::SetHardware(&[9, 8]))),
            (0, format!("{:?}", KissCommand::Unknown(0x0a))),
        ]
    );
}

#[test]
fn test_return_command() {
    let mut dec = KissDecoder::new();
    let got = decode_all(&mut dec, &[FEND, 0xff, FEND]);
    assert_eq!(got, vec![(0, format!("{:?}", KissCommand::Return))]);
}

#[test]
fn test_short_frames_ignored() {
    let mut dec = KissDecoder::new();
    // Type byte only, then an empty frame
    assert!(decode_all(&mut dec, &[FEND, 0x01, FEND, FEND, FEND]).is_empty());
}

#[test]
fn test_back_to_back_fends_stay_inside() {
    let mut dec = KissDecoder::new();
    let got = decode_all(&mut dec, &[FEND, FEND, FEND, 0x02, 200, FEND]);
    assert_eq!(got, vec![(0, format!("{:?}", KissCommand::Persistence(200)))]);
}

#[test]
fn test_bytes_outside_frame_ignored() {
    let mut dec = KissDecoder::new();
    let got = decode_all(&mut dec, b"garbage\r\n");
    assert!(got.is_empty());
    let got = decode_all(&mut dec, &[FEND, 0x03, 7, FEND]);
    assert_eq!(got.len(), 1);
}

#[test]
fn test_overflow_discards_frame() {
    let mut dec = KissDecoder::new();
    let mut bytes = vec![FEND, 0x00];
    bytes.extend(std::iter::repeat(0x55).take(KISS_PACKET_LEN + 10));
    bytes.push(FEND);
    assert!(decode_all(&mut dec, &bytes).is_empty());

    // Decoder recovers on the next frame
    let got = decode_all(&mut dec, &[FEND, 0x01, 40, FEND]);
    assert_eq!(got, vec![(0, format!("{:?}", KissCommand::TxDelay(40)))]);
}

#[test]
fn test_reset_drops_partial_frame() {
    let mut dec = KissDecoder::new();
    assert!(decode_all(&mut dec, &[FEND, 0x00, 1, 2]).is_empty());
    dec.reset();
    // A lone FEND now only opens a frame
    assert!(decode_all(&mut dec, &[FEND]).is_empty());
    let got = decode_all(&mut dec, &[0x00, 3, FEND]);
    assert_eq!(got, vec![(0, format!("{:?}", KissCommand::Data(&[3])))]);
}

// =============================================================================
// Frame Timeout Tests
// =============================================================================

/// Feed bytes at one tick, collecting decoded data payloads
fn data_at(dec: &mut KissDecoder, bytes: &[u8], now: u32) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    for &b in bytes {
        if let Some(KissFrame {
            command: KissCommand::Data(d),
            ..
        }) = dec.feed(b, now)
        {
            out.push(d.to_vec());
        }
    }
    out
}

#[test]
fn test_frame_completes_within_timeout() {
    let mut dec = KissDecoder::new();
    assert!(data_at(&mut dec, &[FEND, 0x00, b'a'], 1000).is_empty());
    let got = data_at(&mut dec, &[b'b', FEND], 1000 + KISS_TIMEOUT - 1);
    assert_eq!(got, vec![b"ab".to_vec()]);
}

#[test]
fn test_stale_frame_is_dropped() {
    let mut dec = KissDecoder::new();
    assert!(data_at(&mut dec, &[FEND, 0x00, b's', b't'], 0).is_empty());

    // Closing FEND arrives too late: it opens a new frame instead
    let late = KISS_TIMEOUT;
    assert!(data_at(&mut dec, &[b'x', FEND], late).is_empty());
    let got = data_at(&mut dec, &[0x00, b'n', b'e', b'w', FEND], late + 1);
    assert_eq!(got, vec![b"new".to_vec()]);
}

#[test]
fn test_timeout_clears_discard() {
    let mut dec = KissDecoder::new();
    let mut bytes = vec![FEND, 0x00];
    bytes.extend(std::iter::repeat(0x55).take(KISS_PACKET_LEN + 10));
    assert!(data_at(&mut dec, &bytes, 0).is_empty());

    let got = data_at(&mut dec, &[FEND, 0x00, b'o', b'k', FEND], 500);
    assert_eq!(got, vec![b"ok".to_vec()]);
}

#[test]
fn test_timeout_survives_tick_wrap() {
    let mut dec = KissDecoder::new();
    let start = u32::MAX - 10;
    assert!(data_at(&mut dec, &[FEND, 0x00, b'w'], start).is_empty());
    let got = data_at(&mut dec, &[FEND], start.wrapping_add(20));
    assert_eq!(got, vec![b"w".to_vec()]);
}

// =============================================================================
// Encoder Tests
// =============================================================================

#[test]
fn test_encode_escapes() {
    let mut out = Vec::new();
    encode_frame(1, &[0x01, FEND, FESC, 0x02], |b| out.push(b));
    assert_eq!(
        out,
        vec![FEND, 0x10, 0x01, FESC, TFEND, FESC, TFESC, 0x02, FEND]
    );
}

#[test]
fn test_encode_decode_agree() {
    let frame = [0x82, 0xa0, FEND, 0x00, FESC, 0x7e];
    let mut wire = Vec::new();
    encode_frame(0, &frame, |b| wire.push(b));

    let mut dec = KissDecoder::new();
    let mut decoded = Vec::new();
    for &b in &wire {
        if let Some(KissFrame {
            command: KissCommand::Data(d),
            ..
        }) = dec.feed(b, 0)
        {
            decoded.extend_from_slice(d);
        }
    }
    assert_eq!(decoded, frame);
}

// =============================================================================
// TNC Command Handling Tests
// =============================================================================

#[test]
fn test_tnc_applies_commands() {
    let mut link = AudioLink::new();
    let (producer, _consumer) = link.split();
    let port = Port::new(0, TimingMode::Pll, producer);
    let mut tnc = Tnc::new(StationConfig::new(), [port], 1);

    let cmd = |command| KissFrame { port: 0, command };
    assert_eq!(tnc.handle_kiss(&cmd(KissCommand::TxDelay(20))), Ok(KissOutcome::Continue));
    assert_eq!(tnc.handle_kiss(&cmd(KissCommand::Persistence(255))), Ok(KissOutcome::Continue));
    assert_eq!(tnc.handle_kiss(&cmd(KissCommand::SlotTime(3))), Ok(KissOutcome::Continue));
    assert_eq!(tnc.handle_kiss(&cmd(KissCommand::FullDuplex(true))), Ok(KissOutcome::Continue));

    let kiss = tnc.port(0).unwrap().kiss();
    assert_eq!(
        *kiss,
        KissParams {
            txdelay: 20,
            persistence: 255,
            slot_time: 3,
            full_duplex: true,
        }
    );
}

#[test]
fn test_tnc_queues_data() {
    let mut link = AudioLink::new();
    let (producer, _consumer) = link.split();
    let port = Port::new(0, TimingMode::Pll, producer);
    let mut tnc = Tnc::new(StationConfig::new(), [port], 1);

    let frame = KissFrame {
        port: 0,
        command: KissCommand::Data(b"payload"),
    };
    assert_eq!(tnc.handle_kiss(&frame), Ok(KissOutcome::Continue));
    assert_eq!(tnc.port(0).unwrap().queued(), 2 + 7 + 2);
}

#[test]
fn test_tnc_rejects_bad_port() {
    let mut link = AudioLink::new();
    let (producer, _consumer) = link.split();
    let port = Port::new(0, TimingMode::Pll, producer);
    let mut tnc = Tnc::new(StationConfig::new(), [port], 1);

    let frame = KissFrame {
        port: 5,
        command: KissCommand::TxDelay(1),
    };
    assert_eq!(tnc.handle_kiss(&frame), Err(TncError::InvalidPort));
}

#[test]
fn test_tnc_return_exits() {
    let mut link = AudioLink::new();
    let (producer, _consumer) = link.split();
    let port = Port::new(0, TimingMode::Pll, producer);
    let mut tnc = Tnc::new(StationConfig::new(), [port], 1);

    let frame = KissFrame {
        port: 0,
        command: KissCommand::Return,
    };
    assert_eq!(tnc.handle_kiss(&frame), Ok(KissOutcome::Exit));
}

#[test]
fn test_txdelay_conversion() {
    let mut link = AudioLink::new();
    let (producer, _consumer) = link.split();
    let port = Port::new(0, TimingMode::Pll, producer);
    let mut tnc = Tnc::new(StationConfig::new(), [port], 1);

    // Default command TXDELAY of 100 maps to 66 KISS units
    assert_eq!(tnc.port(0).unwrap().kiss().txdelay, 66);

    assert!(tnc.set_txdelay(30).is_ok());
    assert_eq!(tnc.station().txdelay, 30);
    assert_eq!(tnc.port(0).unwrap().kiss().txdelay, 20);

    assert_eq!(tnc.set_txdelay(0), Err(TncError::OutOfRange));
    assert_eq!(tnc.set_txdelay(201), Err(TncError::OutOfRange));
    assert_eq!(tnc.port(0).unwrap().kiss().txdelay, 20);
}
