//! Integration tests exercising the wire codec and keymap together, the way
//! the bridge's dispatch path uses them.

use rdpws_core::keymap::browser;
use rdpws_core::protocol::messages::{OP_KEY_PRESS, OP_KEY_UPDOWN, OP_MOUSE};
use rdpws_core::protocol::{decode_input, encode_event, BrowserInput, ProtocolError, ServerEvent};

fn frame(words: &[u32]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(words.len() * 4);
    for w in words {
        buf.extend_from_slice(&w.to_le_bytes());
    }
    buf
}

#[test]
fn mouse_frame_decodes_to_injector_arguments() {
    let input = decode_input(&frame(&[OP_MOUSE, 0x8000, 70000, 2])).unwrap();

    // The bridge narrows coordinates to u16 without clamping; out-of-range
    // values wrap, which is the caller's responsibility per the contract.
    match input {
        BrowserInput::Mouse { flags, x, y } => {
            assert_eq!(flags, 0x8000);
            assert_eq!(x as u16, (70000u32 % 65536) as u16);
            assert_eq!(y as u16, 2);
        }
        other => panic!("expected Mouse, got {other:?}"),
    }
}

#[test]
fn modifier_frame_resolves_through_keymap() {
    let input = decode_input(&frame(&[OP_KEY_UPDOWN, 1, 16])).unwrap();
    let BrowserInput::KeyUpDown { down, code } = input else {
        panic!("expected KeyUpDown");
    };
    assert!(down);

    let sc = browser::modifier_scancode(code).expect("left shift must map");
    assert_eq!(sc.code, 0x2A);
    assert!(!sc.extended);
}

#[test]
fn return_key_press_resolves_non_extended() {
    let input = decode_input(&frame(&[OP_KEY_PRESS, 0, 0x0D])).unwrap();
    let BrowserInput::KeyPress { shift_state, code } = input else {
        panic!("expected KeyPress");
    };
    assert_eq!(shift_state, 0);

    let sc = browser::control_scancode(code).expect("return must map");
    assert_eq!(sc.code, 0x1C);
    assert!(!sc.extended);
}

#[test]
fn pointer_events_encode_with_disjoint_op_codes() {
    let frames = [
        encode_event(&ServerEvent::PointerNew {
            id: 1,
            hot_x: 0,
            hot_y: 0,
        }),
        encode_event(&ServerEvent::PointerFree { id: 1 }),
        encode_event(&ServerEvent::PointerSet { id: 1 }),
        encode_event(&ServerEvent::PointerSetNull),
        encode_event(&ServerEvent::PointerSetDefault),
    ];

    let mut ops = std::collections::HashSet::new();
    for f in &frames {
        assert!(f.len() >= 4);
        let op = u32::from_le_bytes(f[..4].try_into().unwrap());
        assert!(ops.insert(op), "op code {op} reused");
        // Outbound frames must never decode as inbound input.
        assert_eq!(decode_input(f), Err(ProtocolError::UnknownOpCode(op)));
    }
}
