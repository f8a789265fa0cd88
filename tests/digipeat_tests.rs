//! Digipeater Tests
//!
//! Tests for next-hop selection, H-bit handling and idempotence.
//! Run with: cargo test --test digipeat_tests

use heapless::Vec as HVec;
use tnc_firmware::config::StationConfig;
use tnc_firmware::protocol::ax25::{build_ui_frame, H_BIT};
use tnc_firmware::protocol::fcs::{check, fcs};
use tnc_firmware::radio::digipeat::{digipeat, DigipeatOutcome};
use tnc_firmware::radio::queue::SendQueue;
use tnc_firmware::types::Callsign;

fn call(s: &str) -> Callsign {
    s.parse().unwrap()
}

fn station() -> StationConfig {
    let mut s = StationConfig::new();
    s.mycall = Some(call("N0DIGI"));
    s.myalias = Some(call("WIDE1-1"));
    s.digipeat = true;
    s
}

fn ui_frame(digis: &[&str], info: &[u8]) -> Vec<u8> {
    let digis: Vec<Callsign> = digis.iter().map(|d| call(d)).collect();
    let mut out: HVec<u8, 1024> = HVec::new();
    build_ui_frame(&call("APRS"), &call("K1ABC"), &digis, info, &mut out).unwrap();
    let mut frame = out.to_vec();
    frame.extend_from_slice(&fcs(&frame).to_le_bytes());
    frame
}

/// Pop one record from the queue, returning the frame with FCS
fn pop_record(queue: &mut SendQueue) -> Vec<u8> {
    let lo = queue.pop().unwrap();
    let hi = queue.pop().unwrap();
    let len = usize::from(u16::from_le_bytes([lo, hi]));
    (0..len).map(|_| queue.pop().unwrap()).collect()
}

/// SSID byte offset of digipeater `n`
fn digi_ssid(n: usize) -> usize {
    14 + n * 7 + 6
}

// =============================================================================
// Relay Tests
// =============================================================================

#[test]
fn test_repeats_for_alias() {
    let mut frame = ui_frame(&["WIDE1-1", "WIDE2-1"], b"hello");
    let original = frame.clone();
    let mut queue: SendQueue = SendQueue::new();

    assert_eq!(digipeat(&mut frame, &station(), &mut queue), DigipeatOutcome::Repeated);
    // Received buffer left as it was
    assert_eq!(frame, original);

    let sent = pop_record(&mut queue);
    assert!(queue.is_empty());
    assert!(check(&sent));
    assert_eq!(sent.len(), original.len());
    assert_ne!(sent[digi_ssid(0)] & H_BIT, 0);
    assert_eq!(sent[digi_ssid(1)] & H_BIT, 0);
    // Everything but the H bit unchanged
    let mut expect = original[..original.len() - 2].to_vec();
    expect[digi_ssid(0)] |= H_BIT;
    assert_eq!(&sent[..sent.len() - 2], &expect[..]);
}

#[test]
fn test_repeats_for_mycall_second_hop() {
    let mut frame = ui_frame(&["RELAY", "N0DIGI"], b"x");
    frame[digi_ssid(0)] |= H_BIT;
    // Fix the FCS after editing the address
    let len = frame.len();
    let sum = fcs(&frame[..len - 2]);
    frame[len - 2..].copy_from_slice(&sum.to_le_bytes());

    let mut queue: SendQueue = SendQueue::new();
    assert_eq!(digipeat(&mut frame, &station(), &mut queue), DigipeatOutcome::Repeated);
    let sent = pop_record(&mut queue);
    assert_ne!(sent[digi_ssid(1)] & H_BIT, 0);
}

#[test]
fn test_only_next_hop_may_act() {
    let mut frame = ui_frame(&["K9XYZ", "WIDE1-1"], b"x");
    let mut queue: SendQueue = SendQueue::new();
    assert_eq!(digipeat(&mut frame, &station(), &mut queue), DigipeatOutcome::NotForUs);
    assert!(queue.is_empty());
}

#[test]
fn test_ssid_must_match() {
    let mut frame = ui_frame(&["WIDE1-2"], b"x");
    let mut queue: SendQueue = SendQueue::new();
    assert_eq!(digipeat(&mut frame, &station(), &mut queue), DigipeatOutcome::NotForUs);
}

#[test]
fn test_already_repeated_is_idempotent() {
    let mut frame = ui_frame(&["WIDE1-1"], b"x");
    let mut queue: SendQueue = SendQueue::new();
    assert_eq!(digipeat(&mut frame, &station(), &mut queue), DigipeatOutcome::Repeated);

    // Hear our own retransmission
    let mut echoed = pop_record(&mut queue);
    assert_eq!(digipeat(&mut echoed, &station(), &mut queue), DigipeatOutcome::Complete);
    assert!(queue.is_empty());
}

// =============================================================================
// Rejection Tests
// =============================================================================

#[test]
fn test_no_path() {
    let mut frame = ui_frame(&[], b"direct");
    let mut queue: SendQueue = SendQueue::new();
    assert_eq!(digipeat(&mut frame, &station(), &mut queue), DigipeatOutcome::NoPath);
}

#[test]
fn test_non_ui_ignored() {
    let mut frame = ui_frame(&["WIDE1-1"], b"x");
    frame[21] = 0x10;
    let mut queue: SendQueue = SendQueue::new();
    assert_eq!(digipeat(&mut frame, &station(), &mut queue), DigipeatOutcome::NotUi);
}

#[test]
fn test_unconfigured_station_never_repeats() {
    let mut frame = ui_frame(&["WIDE1-1"], b"x");
    let mut queue: SendQueue = SendQueue::new();
    let bare = StationConfig::new();
    assert_eq!(digipeat(&mut frame, &bare, &mut queue), DigipeatOutcome::NotForUs);
}

#[test]
fn test_queue_full_reported() {
    let mut frame = ui_frame(&["WIDE1-1"], b"x");
    let mut queue: SendQueue<16> = SendQueue::new();
    assert_eq!(digipeat(&mut frame, &station(), &mut queue), DigipeatOutcome::QueueFull);
    assert!(queue.is_empty());
}

#[test]
fn test_path_longer_than_cap() {
    let digis = ["D1", "D2", "D3", "D4", "D5", "D6", "D7", "D8", "D9"];
    let mut frame = ui_frame(&digis, b"x");
    for n in 0..digis.len() {
        frame[digi_ssid(n)] |= H_BIT;
    }
    let mut queue: SendQueue = SendQueue::new();
    assert_eq!(digipeat(&mut frame, &station(), &mut queue), DigipeatOutcome::Malformed);
}
