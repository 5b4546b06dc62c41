use std::io::{Read, Write};

use crate::atom::{
    BACK_REFERENCE, CONS_BOX_MARKER, MAX_SINGLE_BYTE, NIL_MARKER, parse_atom_header, write_atom,
};
use crate::stream::read_u8;
use crate::{Error, Result};

// offsets are u64, so a back-reference payload is never longer than this
const MAX_OFFSET_BYTES: usize = 8;

// the offset as an atom: big-endian, without leading zeros
fn offset_atom(offset: u64) -> ([u8; 8], usize) {
    let bytes = offset.to_be_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    (bytes, start)
}

/// The number of bytes [`write_backref`] produces for `offset`.
pub fn backref_serialized_length(offset: u64) -> u64 {
    let (bytes, start) = offset_atom(offset);
    // at most 8 bytes, so the atom never needs more than a 1-byte prefix
    let atom_len = match &bytes[start..] {
        [] => 1,
        [b] if *b <= MAX_SINGLE_BYTE => 1,
        atom => 1 + atom.len() as u64,
    };
    1 + atom_len
}

/// Writes a reference to the object whose serialization starts at byte
/// `offset` of the current stream.
pub fn write_backref<W: Write>(f: &mut W, offset: u64) -> Result<()> {
    let (bytes, start) = offset_atom(offset);
    f.write_all(&[BACK_REFERENCE])?;
    write_atom(f, &bytes[start..])
}

/// Reads the offset of a back-reference whose marker byte has already been
/// consumed.
pub fn parse_backref<R: Read>(f: &mut R) -> Result<u64> {
    let b0 = read_u8(f)?;
    if b0 == CONS_BOX_MARKER || b0 == BACK_REFERENCE {
        return Err(Error::MalformedInput("back reference offset must be an atom"));
    }

    let mut buf = [0_u8; MAX_OFFSET_BYTES];
    let atom = if b0 <= MAX_SINGLE_BYTE {
        buf[0] = b0;
        &buf[..1]
    } else {
        let len = parse_atom_header(f, b0)?;
        if len > MAX_OFFSET_BYTES as u64 {
            return Err(Error::MalformedInput("back reference offset too large"));
        }
        let atom = &mut buf[..len as usize];
        f.read_exact(atom)?;
        &*atom
    };
    if atom.first() == Some(&0) {
        return Err(Error::MalformedInput("back reference offset has leading zeros"));
    }
    Ok(atom
        .iter()
        .fold(0_u64, |acc, b| (acc << 8) | u64::from(*b)))
}

/// The error for a `0xfe` lead byte when back-references are off, with the
/// marker already consumed.
///
/// Every offset [`write_backref`] produces starts with a byte of at most
/// `0x88`, which is reported as a back-reference. Anything else is read as
/// the rest of a 7-byte atom length prefix, a length no atom can have.
pub(crate) fn reject_backref<R: Read>(f: &mut R) -> Error {
    let b1 = match read_u8(f) {
        Ok(b1) => b1,
        Err(err) => return err,
    };
    if b1 <= NIL_MARKER + MAX_OFFSET_BYTES as u8 {
        return Error::MalformedInput("back references are not allowed");
    }
    // the length is at least 0x89 << 40, so this never reads a payload
    match parse_atom_header(&mut [b1].as_slice().chain(f), BACK_REFERENCE) {
        Ok(len) => Error::SizeLimitExceeded(len),
        Err(err) => err,
    }
}
