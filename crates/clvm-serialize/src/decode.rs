use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read};

use clvm_node::{Allocator, NodePtr};

use crate::atom::{BACK_REFERENCE, CONS_BOX_MARKER, parse_atom};
use crate::backref::{parse_backref, reject_backref};
use crate::flags::ALLOW_BACKREFS;
use crate::stream::{OffsetReader, read_u8};
use crate::{Error, Result};

// a pair whose marker has been read, but not both of its children
struct Frame {
    start: u64,
    first: Option<NodePtr>,
}

struct Deserializer<'a> {
    a: &'a mut Allocator,
    // object start offset -> decoded object. Only maintained when
    // back-references are allowed
    offsets: Option<HashMap<u64, NodePtr>>,
    // targets of back-references, when the caller asked for them
    targets: Option<HashSet<NodePtr>>,
}

impl Deserializer<'_> {
    fn remember(&mut self, start: u64, node: NodePtr) {
        if let Some(offsets) = &mut self.offsets {
            offsets.insert(start, node);
        }
    }

    fn parse<R: Read>(&mut self, f: &mut OffsetReader<R>) -> Result<NodePtr> {
        let mut frames = Vec::<Frame>::new();

        loop {
            let start = f.offset();
            let b0 = read_u8(f)?;

            let mut node = if b0 == CONS_BOX_MARKER {
                frames.push(Frame { start, first: None });
                continue;
            } else if b0 == BACK_REFERENCE {
                let Some(offsets) = &self.offsets else {
                    return Err(reject_backref(f));
                };
                let target = parse_backref(f)?;
                let Some(node) = offsets.get(&target).copied() else {
                    return Err(Error::InvalidBackReference(target));
                };
                if let Some(targets) = &mut self.targets {
                    targets.insert(node);
                }
                node
            } else {
                let atom = parse_atom(f, b0)?;
                let node = self.a.new_atom(&atom)?;
                self.remember(start, node);
                node
            };

            // hand the object to its parent, completing as many pairs as
            // this finishes
            loop {
                let Some(frame) = frames.last_mut() else {
                    return Ok(node);
                };
                let Some(first) = frame.first else {
                    frame.first = Some(node);
                    break;
                };
                let start = frame.start;
                frames.pop();
                node = self.a.new_pair(first, node)?;
                self.remember(start, node);
            }
        }
    }
}

fn deserialize<R: Read>(
    a: &mut Allocator,
    f: R,
    allow_backrefs: bool,
    record_targets: bool,
) -> Result<(NodePtr, HashSet<NodePtr>)> {
    let mut d = Deserializer {
        a,
        offsets: allow_backrefs.then(HashMap::new),
        targets: record_targets.then(HashSet::new),
    };
    let mut f = OffsetReader::new(f);
    match d.parse(&mut f) {
        Ok(node) => Ok((node, d.targets.unwrap_or_default())),
        Err(err) => {
            log::debug!("failed to deserialize at offset {}: {err}", f.offset());
            Err(err)
        }
    }
}

/// Reads one canonically serialized tree from `f`. A back-reference is
/// rejected with `MalformedInput`.
pub fn node_from_stream<R: Read>(a: &mut Allocator, f: &mut R) -> Result<NodePtr> {
    Ok(deserialize(a, f, false, false)?.0)
}

/// Reads one tree from `f`, resolving back-references. Every back-reference
/// resolves to the very same [`NodePtr`] as the object it refers to.
pub fn node_from_stream_backrefs<R: Read>(a: &mut Allocator, f: &mut R) -> Result<NodePtr> {
    Ok(deserialize(a, f, true, false)?.0)
}

pub fn node_from_stream_flags<R: Read>(a: &mut Allocator, f: &mut R, flags: u32) -> Result<NodePtr> {
    Ok(deserialize(a, f, flags & ALLOW_BACKREFS != 0, false)?.0)
}

/// Decodes the tree at the front of `b`. Trailing bytes are ignored.
pub fn node_from_bytes(a: &mut Allocator, b: &[u8]) -> Result<NodePtr> {
    node_from_stream(a, &mut Cursor::new(b))
}

pub fn node_from_bytes_backrefs(a: &mut Allocator, b: &[u8]) -> Result<NodePtr> {
    node_from_stream_backrefs(a, &mut Cursor::new(b))
}

/// Like [`node_from_bytes_backrefs`], but also returns every node that was
/// the target of at least one back-reference.
pub fn node_from_bytes_backrefs_record(
    a: &mut Allocator,
    b: &[u8],
) -> Result<(NodePtr, HashSet<NodePtr>)> {
    deserialize(a, Cursor::new(b), true, true)
}

pub fn node_from_bytes_flags(a: &mut Allocator, b: &[u8], flags: u32) -> Result<NodePtr> {
    node_from_stream_flags(a, &mut Cursor::new(b), flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::encode::{node_to_bytes, node_to_bytes_backrefs};
    use crate::test_utils::InfiniteStream;

    use clvm_node::{SExp, ToNode, node_eq, node_list};
    use hex_literal::hex;
    use rstest::rstest;

    #[rstest]
    #[case(&hex!("80"))]
    #[case(&hex!("01"))]
    #[case(&hex!("86666f6f626172"))]
    #[case(&hex!("ff0502"))]
    #[case(&hex!("ff81b8ff8301600980"))]
    #[case(&hex!("ffff80ff80ff8080ff8080"))]
    fn test_roundtrip(#[case] bytes: &[u8], #[values(0, ALLOW_BACKREFS)] flags: u32) {
        let a = &mut Allocator::new();
        let node = node_from_bytes_flags(a, bytes, flags).unwrap();
        assert_eq!(node_to_bytes(a, node).unwrap(), bytes);
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let a = &mut Allocator::new();
        let node = node_from_bytes(a, &hex!("ff0102ff")).unwrap();
        assert_eq!(node_to_bytes(a, node).unwrap(), hex!("ff0102"));
    }

    #[rstest]
    #[case(&hex!(""))]
    #[case(&hex!("ff"))]
    #[case(&hex!("ff01"))]
    #[case(&hex!("ffff0101"))]
    #[case(&hex!("bf202020"))]
    #[case(&hex!("c040"))]
    #[case(&hex!("ff01fe"))]
    fn test_truncated(#[case] bytes: &[u8]) {
        let a = &mut Allocator::new();
        assert_eq!(
            node_from_bytes_backrefs(a, bytes),
            Err(Error::UnexpectedEndOfInput)
        );
    }

    #[rstest]
    #[case(&hex!("fe01"))]
    #[case(&hex!("ff01fe01"))]
    #[case(&hex!("ff01fe8180"))]
    fn test_backref_marker_without_backrefs(#[case] bytes: &[u8]) {
        let a = &mut Allocator::new();
        assert_eq!(
            node_from_bytes(a, bytes),
            Err(Error::MalformedInput("back references are not allowed"))
        );
    }

    #[rstest]
    #[case(&hex!("fcffffffffff"), 0xff_ffff_ffff)]
    #[case(&hex!("fc0400000000"), 0x4_0000_0000)]
    #[case(&hex!("ff01fcffffffffff"), 0xff_ffff_ffff)]
    // without back-references, 0xfe can only start a 7-byte length prefix
    #[case(&hex!("feffffffffffff"), 0xffff_ffff_ffff)]
    #[case(&hex!("ff01fe890000000000"), 0x8900_0000_0000)]
    fn test_oversized_atom(#[case] bytes: &[u8], #[case] len: u64) {
        // an endless stream, so the only way out is to reject the length
        let a = &mut Allocator::new();
        let mut f = InfiniteStream::new(bytes);
        assert_eq!(
            node_from_stream(a, &mut f),
            Err(Error::SizeLimitExceeded(len))
        );
        assert_eq!(f.position(), bytes.len());
    }

    #[rstest]
    // nothing starts at offset 5
    #[case(&hex!("ff01fe05"), 5)]
    // forward reference
    #[case(&hex!("fffe03ff0505"), 3)]
    // the enclosing pair is incomplete
    #[case(&hex!("ff01fe80"), 0)]
    #[case(&hex!("fe80"), 0)]
    fn test_invalid_backref(#[case] bytes: &[u8], #[case] offset: u64) {
        let a = &mut Allocator::new();
        assert_eq!(
            node_from_bytes_backrefs(a, bytes),
            Err(Error::InvalidBackReference(offset))
        );
    }

    #[test]
    fn test_backref_payload_must_be_canonical() {
        let a = &mut Allocator::new();
        assert_eq!(
            node_from_bytes_backrefs(a, &hex!("ff01fe820001")),
            Err(Error::MalformedInput("back reference offset has leading zeros"))
        );
    }

    #[test]
    fn test_backref_is_shared() {
        let a = &mut Allocator::new();
        let (node, targets) =
            node_from_bytes_backrefs_record(a, &hex!("ff8461626364fe01")).unwrap();
        let SExp::Pair(first, rest) = a.sexp(node) else {
            panic!("expected a pair");
        };
        assert_eq!(first, rest);
        assert_eq!(a.atom(first).unwrap(), b"abcd");
        assert_eq!(targets, HashSet::from([first]));
    }

    #[test]
    fn test_backref_to_pair() {
        let a = &mut Allocator::new();
        let node = node_from_bytes_backrefs(a, &hex!("ffff01ff02ff0380fe01")).unwrap();
        let (first, rest) = a.pair(node).unwrap();
        assert_eq!(first, rest);
        assert_eq!(
            node_to_bytes(a, node).unwrap(),
            hex!("ffff01ff02ff0380ff01ff02ff0380")
        );
    }

    #[test]
    fn test_record_without_backrefs() {
        let a = &mut Allocator::new();
        let (_, targets) = node_from_bytes_backrefs_record(a, &hex!("ff0102")).unwrap();
        assert!(targets.is_empty());
    }

    #[test]
    fn test_compressed_roundtrip() {
        let a = &mut Allocator::new();
        let shared = node_list!("foo", "bar", 1337).to_node(a).unwrap();
        let node = node_list!(shared, shared, (shared, shared)).to_node(a).unwrap();
        let compressed = node_to_bytes_backrefs(a, node).unwrap();
        let plain = node_to_bytes(a, node).unwrap();
        assert!(compressed.len() < plain.len());

        let b = &mut Allocator::new();
        let decoded = node_from_bytes_backrefs(b, &compressed).unwrap();
        assert!(node_eq(a, node, b, decoded));

        // an old decoder can't read it
        assert_eq!(
            node_from_bytes(b, &compressed),
            Err(Error::MalformedInput("back references are not allowed"))
        );
        assert_eq!(
            node_from_bytes_flags(b, &compressed, 0),
            Err(Error::MalformedInput("back references are not allowed"))
        );
    }

    #[rstest]
    fn test_deep_tree(#[values(true, false)] left: bool) {
        let a = &mut Allocator::new();
        let mut node = a.nil();
        for i in 0..100_000_u32 {
            let atom = a.new_small_number(i % 200).unwrap();
            node = if left {
                a.new_pair(node, atom).unwrap()
            } else {
                a.new_pair(atom, node).unwrap()
            };
        }
        let bytes = node_to_bytes(a, node).unwrap();

        let b = &mut Allocator::new();
        let decoded = node_from_bytes(b, &bytes).unwrap();
        assert!(node_eq(a, node, b, decoded));
        assert_eq!(b.pair_count(), 100_000);
    }

    #[test]
    fn test_heap_limit() {
        let a = &mut Allocator::new_limited(10);
        assert_eq!(
            node_from_bytes(a, &hex!("8c000102030405060708090a0b")),
            Err(Error::Node(clvm_node::NodeError::OutOfMemory))
        );
    }
}
