//! Codec for clipboard slot references.
//!
//! A clipboard tells the on-chain call-data interpreter to take the
//! return value written at a byte offset of an earlier step's result and
//! splice it into a byte offset of the current step's call data. The
//! engine only ever encodes the *reference*; the value is resolved at
//! execution time on chain.
//!
//! Wire layout:
//!
//! ```text
//! [type_id: u8][use_ether: u8]            header
//! ([count: u256])                         only for type 0x02
//! [paste param: bytes32] * N
//! ([ether value: u256])                   only when use_ether = 0x01
//! ```
//!
//! `type_id` is `0x00` (no paste), `0x01` (one paste param) or `0x02`
//! (count-prefixed list). Each paste param is one 32-byte word:
//!
//! ```text
//! [flags: u8][reserved: u8][copy_from_step_index: u80][copy_byte: u80][paste_byte: u80]
//! ```
//!
//! Offsets are stored as byte indices into the in-memory layouts the
//! interpreter sees: return data carries a 32-byte length prefix
//! (`copy_byte = 32 + 32 * copy_slot`) and call data a 4-byte selector
//! after its prefix (`paste_byte = 36 + 32 * paste_slot`). The decoder
//! rejects indices that do not land on those grids.

use alloy::primitives::{Bytes, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Word size of the target call-data layout.
pub const WORD: u64 = 32;

const COPY_BASE: u64 = 32;
const PASTE_BASE: u64 = 36;
const FLAG_PASTE_BEFORE: u8 = 0x01;

const TYPE_NONE: u8 = 0x00;
const TYPE_SINGLE: u8 = 0x01;
const TYPE_MULTI: u8 = 0x02;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("clipboard data too short: {len} bytes")]
    TooShort { len: usize },

    #[error("unknown clipboard type 0x{type_id:02x}")]
    UnknownType { type_id: u8 },

    #[error("unknown paste-param flags 0x{flags:02x}")]
    UnknownFlags { flags: u8 },

    #[error("{field} byte index {byte_index} is not word-aligned")]
    UnalignedOffset { field: &'static str, byte_index: u64 },

    #[error("{field} value {value} out of range")]
    OutOfRange { field: &'static str, value: u128 },

    #[error("{extra} unexpected trailing bytes")]
    TrailingBytes { extra: usize },
}

/// A single substitution instruction: copy the word at `copy_slot` of
/// step `copy_from_step_index`'s return data into `paste_slot` of the
/// current step's call data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardRef {
    /// Index of the step whose return data is read. Must precede the
    /// step carrying this reference; the workflow enforces that.
    pub copy_from_step_index: u32,
    /// Word slot within the source step's return data.
    pub copy_slot: u16,
    /// Word slot within this step's call-data argument area.
    pub paste_slot: u16,
    /// Splice before the static arguments are finalized rather than
    /// after.
    pub place_before_static_args: bool,
}

impl ClipboardRef {
    pub fn slot(copy_from_step_index: u32, copy_slot: u16, paste_slot: u16) -> Self {
        ClipboardRef {
            copy_from_step_index,
            copy_slot,
            paste_slot,
            place_before_static_args: false,
        }
    }
}

/// A fully decoded clipboard: zero or more paste params plus an optional
/// attached ether value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Clipboard {
    pub refs: Vec<ClipboardRef>,
    pub ether: Option<U256>,
}

// ── Encoding ─────────────────────────────────────────────────────────

/// Encode "no substitution".
pub fn encode_empty() -> Bytes {
    encode(&[], None)
}

/// Encode a single substitution instruction.
pub fn encode_slot(copy_from_step_index: u32, copy_slot: u16, paste_slot: u16) -> Bytes {
    encode(
        &[ClipboardRef::slot(copy_from_step_index, copy_slot, paste_slot)],
        None,
    )
}

/// Encode any number of paste params, optionally with an ether value.
pub fn encode(refs: &[ClipboardRef], ether: Option<U256>) -> Bytes {
    let mut out = Vec::with_capacity(2 + refs.len() * WORD as usize + 32);
    let type_id = match refs.len() {
        0 => TYPE_NONE,
        1 => TYPE_SINGLE,
        _ => TYPE_MULTI,
    };
    out.push(type_id);
    out.push(if ether.is_some() { 0x01 } else { 0x00 });
    if type_id == TYPE_MULTI {
        out.extend_from_slice(&U256::from(refs.len()).to_be_bytes::<32>());
    }
    for r in refs {
        out.extend_from_slice(&encode_param(r));
    }
    if let Some(value) = ether {
        out.extend_from_slice(&value.to_be_bytes::<32>());
    }
    out.into()
}

fn encode_param(r: &ClipboardRef) -> [u8; 32] {
    let mut w = [0u8; 32];
    if r.place_before_static_args {
        w[0] = FLAG_PASTE_BEFORE;
    }
    put_u80(&mut w[2..12], r.copy_from_step_index as u128);
    put_u80(&mut w[12..22], (COPY_BASE + WORD * r.copy_slot as u64) as u128);
    put_u80(&mut w[22..32], (PASTE_BASE + WORD * r.paste_slot as u64) as u128);
    w
}

// ── Decoding ─────────────────────────────────────────────────────────

/// Exact inverse of every [`encode`] form.
pub fn decode(data: &[u8]) -> Result<Clipboard, ClipboardError> {
    if data.len() < 2 {
        return Err(ClipboardError::TooShort { len: data.len() });
    }
    let type_id = data[0];
    let use_ether = data[1] == 0x01;
    let mut rest = &data[2..];

    let count = match type_id {
        TYPE_NONE => 0,
        TYPE_SINGLE => 1,
        TYPE_MULTI => {
            let word = take_word(&mut rest, data.len())?;
            let count = U256::from_be_bytes::<32>(word);
            usize::try_from(count).map_err(|_| ClipboardError::OutOfRange {
                field: "paste param count",
                value: u128::MAX,
            })?
        }
        other => return Err(ClipboardError::UnknownType { type_id: other }),
    };

    let mut refs = Vec::with_capacity(count);
    for _ in 0..count {
        let word = take_word(&mut rest, data.len())?;
        refs.push(decode_param(&word)?);
    }

    let ether = if use_ether {
        let word = take_word(&mut rest, data.len())?;
        Some(U256::from_be_bytes::<32>(word))
    } else {
        None
    };

    if !rest.is_empty() {
        return Err(ClipboardError::TrailingBytes { extra: rest.len() });
    }
    Ok(Clipboard { refs, ether })
}

fn decode_param(w: &[u8; 32]) -> Result<ClipboardRef, ClipboardError> {
    let flags = w[0];
    if flags & !FLAG_PASTE_BEFORE != 0 {
        return Err(ClipboardError::UnknownFlags { flags });
    }

    let copy_from = get_u80(&w[2..12]);
    let copy_byte = get_u80(&w[12..22]);
    let paste_byte = get_u80(&w[22..32]);

    let copy_from_step_index =
        u32::try_from(copy_from).map_err(|_| ClipboardError::OutOfRange {
            field: "copy_from_step_index",
            value: copy_from,
        })?;
    let copy_slot = slot_from_byte(copy_byte, COPY_BASE, "copy")?;
    let paste_slot = slot_from_byte(paste_byte, PASTE_BASE, "paste")?;

    Ok(ClipboardRef {
        copy_from_step_index,
        copy_slot,
        paste_slot,
        place_before_static_args: flags & FLAG_PASTE_BEFORE != 0,
    })
}

fn slot_from_byte(byte_index: u128, base: u64, field: &'static str) -> Result<u16, ClipboardError> {
    let unaligned = || ClipboardError::UnalignedOffset {
        field,
        byte_index: byte_index as u64,
    };
    let offset = byte_index.checked_sub(base as u128).ok_or_else(unaligned)?;
    if offset % WORD as u128 != 0 {
        return Err(unaligned());
    }
    u16::try_from(offset / WORD as u128).map_err(|_| ClipboardError::OutOfRange {
        field,
        value: byte_index,
    })
}

fn take_word(rest: &mut &[u8], total: usize) -> Result<[u8; 32], ClipboardError> {
    if rest.len() < 32 {
        return Err(ClipboardError::TooShort { len: total });
    }
    let mut w = [0u8; 32];
    w.copy_from_slice(&rest[..32]);
    *rest = &rest[32..];
    Ok(w)
}

fn put_u80(dst: &mut [u8], value: u128) {
    dst.copy_from_slice(&value.to_be_bytes()[6..16]);
}

fn get_u80(src: &[u8]) -> u128 {
    let mut buf = [0u8; 16];
    buf[6..16].copy_from_slice(src);
    u128::from_be_bytes(buf)
}
