use std::io::{Cursor, Read};

use crate::atom::{BACK_REFERENCE, CONS_BOX_MARKER, skip_atom};
use crate::backref::{parse_backref, reject_backref};
use crate::flags::ALLOW_BACKREFS;
use crate::stream::{OffsetReader, RecordingReader, read_u8};
use crate::Result;

/// Walks exactly one serialized value without building it. Returns the number
/// of back-references seen. Back-reference targets are not checked.
fn scan<R: Read>(f: &mut OffsetReader<R>, allow_backrefs: bool) -> Result<u64> {
    // values still to be read
    let mut pending = 1_u64;
    let mut backrefs = 0;
    while pending > 0 {
        let b0 = read_u8(f)?;
        if b0 == CONS_BOX_MARKER {
            pending += 1;
            continue;
        }
        if b0 == BACK_REFERENCE {
            if !allow_backrefs {
                return Err(reject_backref(f));
            }
            parse_backref(f)?;
            backrefs += 1;
        } else {
            skip_atom(f, b0)?;
        }
        pending -= 1;
    }
    Ok(backrefs)
}

fn scan_logged<R: Read>(f: &mut OffsetReader<R>, flags: u32) -> Result<u64> {
    scan(f, flags & ALLOW_BACKREFS != 0).inspect_err(|err| {
        log::debug!("failed to scan at offset {}: {err}", f.offset());
    })
}

/// Reads one serialized value from `f` and returns its bytes, exactly as
/// they appear in the stream.
pub fn node_buffer_from_stream<R: Read>(f: &mut R, flags: u32) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    scan_logged(
        &mut OffsetReader::new(RecordingReader::new(f, &mut buf)),
        flags,
    )?;
    Ok(buf)
}

/// The length of the canonically serialized value at the front of `b`.
pub fn serialized_length_from_bytes(b: &[u8]) -> Result<u64> {
    serialized_length_from_bytes_flags(b, 0)
}

pub fn serialized_length_from_bytes_flags(b: &[u8], flags: u32) -> Result<u64> {
    let mut f = OffsetReader::new(Cursor::new(b));
    scan_logged(&mut f, flags)?;
    Ok(f.offset())
}

/// Whether the value at the front of `b`, which may use back-references,
/// actually contains any.
pub fn has_backrefs(b: &[u8]) -> Result<bool> {
    let mut f = OffsetReader::new(Cursor::new(b));
    Ok(scan_logged(&mut f, ALLOW_BACKREFS)? > 0)
}
