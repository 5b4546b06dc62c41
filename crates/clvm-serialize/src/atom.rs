use std::io::{self, Read, Write};

use crate::{Error, Result};

/// Atoms up to this value are serialized as themselves, in a single byte.
pub const MAX_SINGLE_BYTE: u8 = 0x7f;
/// The serialization of the empty atom.
pub const NIL_MARKER: u8 = 0x80;
pub const BACK_REFERENCE: u8 = 0xfe;
pub const CONS_BOX_MARKER: u8 = 0xff;

/// The largest atom that can be serialized. Lengths must fit in the 5-byte
/// prefix, i.e. be below 2^34.
pub const MAX_ATOM_LEN: u64 = 0x3_ffff_ffff;

/// The number of bytes in the length prefix of an atom of `len` bytes.
fn prefix_len(len: u64) -> Result<usize> {
    match len {
        0..0x40 => Ok(1),
        0x40..0x2000 => Ok(2),
        0x2000..0x10_0000 => Ok(3),
        0x10_0000..0x800_0000 => Ok(4),
        0x800_0000..=MAX_ATOM_LEN => Ok(5),
        _ => Err(Error::SizeLimitExceeded(len)),
    }
}

/// The number of bytes [`write_atom`] produces for `atom`.
pub fn atom_serialized_length(atom: &[u8]) -> Result<u64> {
    match atom {
        [] => Ok(1),
        [b] if *b <= MAX_SINGLE_BYTE => Ok(1),
        _ => {
            let len = atom.len() as u64;
            Ok(prefix_len(len)? as u64 + len)
        }
    }
}

/// Writes the length prefix of an atom of `len` bytes. The number of leading
/// 1-bits in the first byte is the size of the prefix, the remaining bits are
/// the big-endian length.
pub fn write_atom_header<W: Write>(f: &mut W, len: u64) -> Result<()> {
    let prefix = prefix_len(len)?;
    let mut buf = len.to_be_bytes();
    let header = &mut buf[8 - prefix..];
    header[0] |= !(0xff_u8 >> prefix);
    f.write_all(header)?;
    Ok(())
}

pub fn write_atom<W: Write>(f: &mut W, atom: &[u8]) -> Result<()> {
    match atom {
        [] => f.write_all(&[NIL_MARKER])?,
        [b] if *b <= MAX_SINGLE_BYTE => f.write_all(&[*b])?,
        _ => {
            write_atom_header(f, atom.len() as u64)?;
            f.write_all(atom)?;
        }
    }
    Ok(())
}

/// Reads the remainder of a length prefix whose first byte is `b0` and
/// returns the length of the atom that follows.
///
/// A length beyond [`MAX_ATOM_LEN`] fails before any of the atom is read.
pub fn parse_atom_header<R: Read>(f: &mut R, b0: u8) -> Result<u64> {
    let prefix = b0.leading_ones() as usize;
    if prefix == 0 || prefix > 7 {
        return Err(Error::MalformedInput("invalid atom length prefix"));
    }

    let mut buf = [0_u8; 8];
    let header = &mut buf[8 - prefix..];
    header[0] = b0 & (0xff >> prefix);
    f.read_exact(&mut header[1..])?;

    let len = u64::from_be_bytes(buf);
    if len > MAX_ATOM_LEN {
        return Err(Error::SizeLimitExceeded(len));
    }
    Ok(len)
}

/// Reads an atom whose first byte, `b0`, has already been consumed.
pub fn parse_atom<R: Read>(f: &mut R, b0: u8) -> Result<Vec<u8>> {
    if b0 <= MAX_SINGLE_BYTE {
        return Ok(vec![b0]);
    }
    let len = parse_atom_header(f, b0)?;

    // the buffer grows with the data actually received, so a large length
    // claim on a short stream costs nothing
    let mut buf = Vec::new();
    f.by_ref().take(len).read_to_end(&mut buf)?;
    if (buf.len() as u64) < len {
        return Err(Error::UnexpectedEndOfInput);
    }
    Ok(buf)
}

/// Like [`parse_atom`], but discards the atom. Returns the number of bytes
/// consumed after `b0`.
pub fn skip_atom<R: Read>(f: &mut R, b0: u8) -> Result<u64> {
    if b0 <= MAX_SINGLE_BYTE {
        return Ok(0);
    }
    let len = parse_atom_header(f, b0)?;
    let skipped = io::copy(&mut f.by_ref().take(len), &mut io::sink())?;
    if skipped < len {
        return Err(Error::UnexpectedEndOfInput);
    }
    Ok(u64::from(b0.leading_ones()) - 1 + len)
}
