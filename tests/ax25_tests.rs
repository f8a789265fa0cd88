//! AX.25 Tests
//!
//! Tests for FCS, address encoding, UI frame construction and the
//! monitor display format.
//! Run with: cargo test --test ax25_tests

use heapless::Vec as HVec;
use tnc_firmware::protocol::ax25::{
    address_matches, build_ui_frame, decode_address, encode_address, is_ui, CONTROL_UI, EXT_BIT,
    H_BIT, PID_NO_L3,
};
use tnc_firmware::protocol::fcs::{check, fcs, Fcs, FCS_RESIDUE};
use tnc_firmware::protocol::monitor::{should_display, write_monitor};
use tnc_firmware::types::{Callsign, MonitorMode};

fn call(s: &str) -> Callsign {
    s.parse().unwrap()
}

/// UI frame with FCS appended
fn ui_frame(dst: &str, src: &str, digis: &[&str], info: &[u8]) -> Vec<u8> {
    let digis: Vec<Callsign> = digis.iter().map(|d| call(d)).collect();
    let mut out: HVec<u8, 1024> = HVec::new();
    build_ui_frame(&call(dst), &call(src), &digis, info, &mut out).unwrap();
    let mut frame = out.to_vec();
    frame.extend_from_slice(&fcs(&frame).to_le_bytes());
    frame
}

fn monitor(frame: &[u8]) -> String {
    let mut s = String::new();
    write_monitor(&mut s, frame).unwrap();
    s
}

// =============================================================================
// FCS Tests
// =============================================================================

#[test]
fn test_fcs_residue_for_any_payload() {
    for len in [1usize, 2, 15, 64, 300] {
        let data: Vec<u8> = (0..len).map(|i| (i * 37 + 11) as u8).collect();
        let mut frame = data.clone();
        frame.extend_from_slice(&fcs(&data).to_le_bytes());
        assert_eq!(fcs(&frame), FCS_RESIDUE, "len {len}");
        assert!(check(&frame));
    }
}

#[test]
fn test_fcs_detects_single_bit_errors() {
    let frame = ui_frame("APRS", "N0CALL", &[], b"Hello");
    for byte in 0..frame.len() {
        for bit in 0..8 {
            let mut bad = frame.clone();
            bad[byte] ^= 1 << bit;
            assert!(!check(&bad), "flip {byte}.{bit}");
        }
    }
}

#[test]
fn test_fcs_streaming_bytes() {
    let mut f = Fcs::new();
    for &b in b"123456789" {
        f.update_byte(b);
    }
    assert_eq!(f.finish(), 0x906e);
    assert_eq!(f.to_bytes(), [0x6e, 0x90]);
}

// =============================================================================
// Address Tests
// =============================================================================

#[test]
fn test_address_round_trip() {
    for text in ["N0CALL", "N0CALL-7", "WIDE2-2", "A1"] {
        let c = call(text);
        assert_eq!(decode_address(&encode_address(&c)), Some(c));
    }
}

#[test]
fn test_address_reserved_bits() {
    let addr = encode_address(&call("KJ4ERJ-15"));
    assert_eq!(addr[6], 0x60 | (15 << 1));
}

#[test]
fn test_address_match_exact_ssid() {
    let addr = encode_address(&call("N0CALL-1"));
    assert!(address_matches(&call("N0CALL-1"), &addr));
    assert!(!address_matches(&call("N0CALL"), &addr));
    assert!(!address_matches(&call("N0CAL-1"), &addr));
}

#[test]
fn test_decode_rejects_lowercase() {
    let mut addr = encode_address(&call("N0CALL"));
    addr[0] = b'n' << 1;
    assert_eq!(decode_address(&addr), None);
}

// =============================================================================
// UI Frame Tests
// =============================================================================

#[test]
fn test_build_ui_frame_layout() {
    let frame = ui_frame("APRS", "N0CALL", &["WIDE1-1", "WIDE2-1"], b"x");
    // 4 addresses, control, PID, info, FCS
    assert_eq!(frame.len(), 4 * 7 + 2 + 1 + 2);
    // Command bit on destination
    assert_ne!(frame[6] & H_BIT, 0);
    // Extension bit only on the last address
    assert_eq!(frame[13] & EXT_BIT, 0);
    assert_eq!(frame[20] & EXT_BIT, 0);
    assert_ne!(frame[27] & EXT_BIT, 0);
    assert_eq!(frame[28], CONTROL_UI);
    assert_eq!(frame[29], PID_NO_L3);
    assert!(check(&frame));
}

#[test]
fn test_build_ui_frame_overflow() {
    let mut out: HVec<u8, 20> = HVec::new();
    let r = build_ui_frame(&call("APRS"), &call("N0CALL"), &[], b"too long", &mut out);
    assert!(r.is_err());
}

#[test]
fn test_is_ui() {
    let frame = ui_frame("APRS", "N0CALL", &["WIDE1-1"], b"hi");
    assert!(is_ui(&frame));

    let mut not_ui = frame.clone();
    not_ui[21] = 0x13;
    assert!(!is_ui(&not_ui));

    let mut other_pid = frame.clone();
    other_pid[22] = 0xcf;
    assert!(!is_ui(&other_pid));

    // No extension bit anywhere
    let mut open = frame;
    open[20] &= !EXT_BIT;
    assert!(!is_ui(&open));
}

// =============================================================================
// Monitor Format Tests
// =============================================================================

#[test]
fn test_monitor_simple() {
    let frame = ui_frame("APRS", "N0CALL", &[], b"Hello");
    assert_eq!(monitor(&frame), "N0CALL>APRS:<03><f0>Hello");
}

#[test]
fn test_monitor_path_and_ssid() {
    let mut frame = ui_frame("APRS", "N0CALL-7", &["WIDE1-1", "WIDE2-1"], b"!");
    // First digipeater has repeated
    frame[20] |= H_BIT;
    assert_eq!(monitor(&frame), "N0CALL-7>APRS,WIDE1-1*,WIDE2-1:<03><f0>!");
}

#[test]
fn test_monitor_escapes_binary_info() {
    let frame = ui_frame("APRS", "N0CALL", &[], &[b'a', 0x0d, 0x7f, b'b']);
    assert_eq!(monitor(&frame), "N0CALL>APRS:<03><f0>a<0d><7f>b");
}

#[test]
fn test_monitor_filter() {
    let me = call("N0CALL");
    let to_me = ui_frame("N0CALL", "K1ABC", &[], b"msg");
    let to_other = ui_frame("APRS", "K1ABC", &[], b"msg");

    assert!(should_display(MonitorMode::All, None, &to_other));
    assert!(should_display(MonitorMode::Me, Some(&me), &to_me));
    assert!(!should_display(MonitorMode::Me, Some(&me), &to_other));
    assert!(!should_display(MonitorMode::Me, None, &to_me));
    assert!(!should_display(MonitorMode::Off, Some(&me), &to_me));
}
