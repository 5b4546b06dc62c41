use std::collections::HashMap;
use std::io::{Cursor, Write};

use clvm_node::{Allocator, NodePtr, SExp};

use crate::atom::{CONS_BOX_MARKER, write_atom};
use crate::backref::{backref_serialized_length, write_backref};
use crate::stream::OffsetWriter;
use crate::{Error, Result};

enum WriteOp {
    Node(NodePtr),
    // all of the pair's children have been written
    PairDone { node: NodePtr, start: u64 },
}

// where an object was first written, and how many bytes it took
#[derive(Clone, Copy)]
struct Written {
    offset: u64,
    len: u64,
}

fn serialize<W: Write>(
    a: &Allocator,
    node: NodePtr,
    f: &mut OffsetWriter<W>,
    allow_backrefs: bool,
    limit: u64,
) -> Result<()> {
    // keyed by identity. Only objects that have been written completely are
    // in here, which rules out references to an object's own ancestors
    let mut written = HashMap::<NodePtr, Written>::new();
    let mut backrefs = 0_usize;
    let mut ops = vec![WriteOp::Node(node)];

    while let Some(op) = ops.pop() {
        match op {
            WriteOp::Node(node) => {
                let start = f.offset();
                if let Some(prev) = written.get(&node) {
                    if backref_serialized_length(prev.offset) < prev.len {
                        write_backref(f, prev.offset)?;
                        backrefs += 1;
                        continue;
                    }
                }
                match a.sexp(node) {
                    SExp::Atom => {
                        write_atom(f, a.atom(node)?)?;
                        if allow_backrefs {
                            written.entry(node).or_insert(Written {
                                offset: start,
                                len: f.offset() - start,
                            });
                        }
                    }
                    SExp::Pair(first, rest) => {
                        f.write_all(&[CONS_BOX_MARKER])?;
                        if allow_backrefs {
                            ops.push(WriteOp::PairDone { node, start });
                        }
                        ops.push(WriteOp::Node(rest));
                        ops.push(WriteOp::Node(first));
                    }
                }
            }
            WriteOp::PairDone { node, start } => {
                written.entry(node).or_insert(Written {
                    offset: start,
                    len: f.offset() - start,
                });
            }
        }
        if f.offset() > limit {
            return Err(Error::SizeLimitExceeded(limit));
        }
    }

    log::trace!(
        "serialized {} bytes, {} back references",
        f.offset(),
        backrefs
    );
    Ok(())
}

/// Writes the canonical serialization of `node` to `f`.
pub fn node_to_stream<W: Write>(a: &Allocator, node: NodePtr, f: &mut W) -> Result<()> {
    serialize(a, node, &mut OffsetWriter::new(f), false, u64::MAX)
}

/// Writes a serialization of `node` where an object that appears more than
/// once (as the same [`NodePtr`]) may be replaced by a back-reference to its
/// first appearance. The output is never longer than the canonical
/// serialization.
pub fn node_to_stream_backrefs<W: Write>(a: &Allocator, node: NodePtr, f: &mut W) -> Result<()> {
    serialize(a, node, &mut OffsetWriter::new(f), true, u64::MAX)
}

pub fn node_to_bytes(a: &Allocator, node: NodePtr) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    node_to_stream(a, node, &mut buffer)?;
    Ok(buffer.into_inner())
}

pub fn node_to_bytes_backrefs(a: &Allocator, node: NodePtr) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    node_to_stream_backrefs(a, node, &mut buffer)?;
    Ok(buffer.into_inner())
}

/// Like [`node_to_bytes`], but gives up with `SizeLimitExceeded` as soon as
/// the output grows beyond `limit` bytes.
pub fn node_to_bytes_limit(a: &Allocator, node: NodePtr, limit: usize) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    serialize(
        a,
        node,
        &mut OffsetWriter::new(&mut buffer),
        false,
        limit as u64,
    )?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    use clvm_node::{ToNode, node_list};
    use hex_literal::hex;

    #[test]
    fn test_atoms() {
        let mut a = Allocator::new();
        assert_eq!(node_to_bytes(&a, a.nil()).unwrap(), hex!("80"));
        assert_eq!(node_to_bytes(&a, a.one()).unwrap(), hex!("01"));
        let zero = a.new_atom(&[0]).unwrap();
        assert_eq!(node_to_bytes(&a, zero).unwrap(), hex!("00"));
        let atom = a.new_atom(b"foobar").unwrap();
        assert_eq!(node_to_bytes(&a, atom).unwrap(), hex!("86666f6f626172"));
    }

    #[test]
    fn test_pairs() {
        let a = &mut Allocator::new();
        let node = (5, 2).to_node(a).unwrap();
        assert_eq!(node_to_bytes(a, node).unwrap(), hex!("ff0502"));

        let node = node_list!(-72, 90121).to_node(a).unwrap();
        assert_eq!(node_to_bytes(a, node).unwrap(), hex!("ff81b8ff8301600980"));

        let inner = node_list!((), (), ()).to_node(a).unwrap();
        let node = node_list!(inner, ()).to_node(a).unwrap();
        assert_eq!(
            node_to_bytes(a, node).unwrap(),
            hex!("ffff80ff80ff8080ff8080")
        );
    }

    #[test]
    fn test_backrefs_only_when_shorter() {
        let a = &mut Allocator::new();

        // a 2-byte atom is no longer than the back-reference to it
        let small = a.new_atom(&[0x80]).unwrap();
        let node = (small, small).to_node(a).unwrap();
        assert_eq!(node_to_bytes_backrefs(a, node).unwrap(), hex!("ff81808180"));

        // a repeated larger atom is referenced by its offset, 1
        let large = a.new_atom(b"abcd").unwrap();
        let node = (large, large).to_node(a).unwrap();
        assert_eq!(
            node_to_bytes_backrefs(a, node).unwrap(),
            hex!("ff8461626364fe01")
        );
        assert_eq!(
            node_to_bytes(a, node).unwrap(),
            hex!("ff84616263648461626364")
        );
    }

    #[test]
    fn test_backrefs_equal_values_are_not_shared() {
        // only identity counts. Two equal atoms are both written out
        let a = &mut Allocator::new();
        let left = a.new_atom(b"abcd").unwrap();
        let right = a.new_atom(b"abcd").unwrap();
        let node = a.new_pair(left, right).unwrap();
        assert_eq!(
            node_to_bytes_backrefs(a, node).unwrap(),
            node_to_bytes(a, node).unwrap()
        );
    }

    #[test]
    fn test_backref_to_pair() {
        let a = &mut Allocator::new();
        let inner = node_list!(1, 2, 3).to_node(a).unwrap();
        let node = a.new_pair(inner, inner).unwrap();
        // the inner list starts at offset 1
        assert_eq!(
            node_to_bytes_backrefs(a, node).unwrap(),
            hex!("ffff01ff02ff0380fe01")
        );
    }

    #[test]
    fn test_limit() {
        let a = &mut Allocator::new();
        let node = node_list!(1, 2, 3).to_node(a).unwrap();
        assert_eq!(node_to_bytes(a, node).unwrap().len(), 7);
        assert_eq!(node_to_bytes_limit(a, node, 7).unwrap().len(), 7);
        assert_eq!(
            node_to_bytes_limit(a, node, 6),
            Err(Error::SizeLimitExceeded(6))
        );
    }

    #[test]
    fn test_deep_tree() {
        let a = &mut Allocator::new();
        let mut node = a.nil();
        for _ in 0..100_000 {
            node = a.new_pair(node, a.one()).unwrap();
        }
        let bytes = node_to_bytes(a, node).unwrap();
        assert_eq!(bytes.len(), 100_000 * 2 + 1);
        assert_eq!(bytes[0], CONS_BOX_MARKER);
        assert_eq!(bytes[99_999], CONS_BOX_MARKER);
        assert_eq!(bytes[100_000], 0x80);
    }
}
