// atoms longer than this (after stripping sign padding) never fit a primitive
const MAX_PADDING_BYTES: usize = 64;

/// Turns the big-endian bytes of a two's complement integer into the minimal
/// atom representation. Zero becomes the empty atom.
pub fn encode_number(bytes: &[u8], negative: bool) -> Vec<u8> {
    let pad = if negative { 0xff } else { 0x00 };
    let start = bytes.iter().position(|b| *b != pad).unwrap_or(bytes.len());
    let significant = &bytes[start..];

    // the top bit of the first byte carries the sign, so it must agree
    let needs_pad = match significant.first() {
        Some(b) => (b & 0x80 != 0) != negative,
        None => negative,
    };

    let mut result = Vec::with_capacity(significant.len() + usize::from(needs_pad));
    if needs_pad {
        result.push(pad);
    }
    result.extend_from_slice(significant);
    result
}

/// Sign-extends an atom into a fixed-width, big-endian integer.
///
/// Returns `None` if the value does not fit in `LEN` bytes, or if it is
/// negative and `signed` is false.
pub fn decode_number<const LEN: usize>(mut atom: &[u8], signed: bool) -> Option<[u8; LEN]> {
    let Some(&lead) = atom.first() else {
        return Some([0; LEN]);
    };

    let negative = lead & 0x80 != 0;
    if negative && !signed {
        return None;
    }
    let pad = if negative { 0xff } else { 0x00 };

    let mut stripped = 0;
    while atom.len() > LEN && atom[0] == pad {
        if stripped == MAX_PADDING_BYTES {
            return None;
        }
        atom = &atom[1..];
        stripped += 1;
    }

    // for signed types, stripping must not flip the sign of what's left
    let flipped = signed && atom.first().is_some_and(|b| (b & 0x80 != 0) != negative);
    if atom.len() > LEN || flipped {
        return None;
    }

    let mut result = [pad; LEN];
    result[LEN - atom.len()..].copy_from_slice(atom);
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    use num_bigint::BigInt;
    use rstest::rstest;

    fn bigint_atom(v: impl Into<BigInt>) -> Vec<u8> {
        let v = v.into();
        if v == BigInt::from(0) {
            Vec::new()
        } else {
            v.to_signed_bytes_be()
        }
    }

    #[test]
    fn test_u8_i8() {
        for number in u8::MIN..=u8::MAX {
            let encoded = encode_number(&number.to_be_bytes(), false);
            assert_eq!(encoded, bigint_atom(number));
            assert_eq!(decode_number(&encoded, false), Some(number.to_be_bytes()));
        }
        for number in i8::MIN..=i8::MAX {
            let encoded = encode_number(&number.to_be_bytes(), number < 0);
            assert_eq!(encoded, bigint_atom(number));
            assert_eq!(decode_number(&encoded, true), Some(number.to_be_bytes()));
        }
    }

    #[test]
    fn test_i16() {
        for number in i16::MIN..=i16::MAX {
            let encoded = encode_number(&number.to_be_bytes(), number < 0);
            assert_eq!(encoded, bigint_atom(number));
            assert_eq!(decode_number(&encoded, true), Some(number.to_be_bytes()));
        }
    }

    #[rstest]
    fn test_u64(#[values(0, 1, 127, 128, 255, 256, 65535, u64::from(u32::MAX), u64::MAX)] number: u64) {
        let encoded = encode_number(&number.to_be_bytes(), false);
        assert_eq!(encoded, bigint_atom(number));
        assert_eq!(decode_number(&encoded, false), Some(number.to_be_bytes()));
    }

    #[rstest]
    #[case(&[], false, Some([0x00, 0x00]))]
    #[case(&[0x7f], false, Some([0x00, 0x7f]))]
    #[case(&[0x80], true, Some([0xff, 0x80]))]
    #[case(&[0x80], false, None)]
    #[case(&[0x00, 0x00, 0x12, 0x34], false, Some([0x12, 0x34]))]
    #[case(&[0xff, 0xff, 0x80, 0x00], true, Some([0x80, 0x00]))]
    #[case(&[0x01, 0x00, 0x00], false, None)]
    // stripping the padding would turn this negative
    #[case(&[0x00, 0x00, 0x80, 0x00], true, None)]
    fn test_decode_number(
        #[case] atom: &[u8],
        #[case] signed: bool,
        #[case] expected: Option<[u8; 2]>,
    ) {
        assert_eq!(decode_number::<2>(atom, signed), expected);
    }

    #[test]
    fn test_excessive_padding() {
        let mut atom = vec![0; MAX_PADDING_BYTES + 1];
        atom.push(1);
        assert_eq!(decode_number::<1>(&atom, false), None);
        atom.remove(0);
        assert_eq!(decode_number::<1>(&atom, false), Some([1]));
    }
}
