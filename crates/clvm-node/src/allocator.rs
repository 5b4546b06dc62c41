use std::fmt;

use num_bigint::BigInt;

use crate::{NodeError, encode_number};

const PAIR_BIT: u32 = 0x8000_0000;
const INDEX_MASK: u32 = !PAIR_BIT;

// every handle carries a 31 bit index into either the atom or the pair table
const MAX_NUM_ATOMS: usize = INDEX_MASK as usize;
const MAX_NUM_PAIRS: usize = INDEX_MASK as usize;

/// A handle to an atom or a pair living in an [`Allocator`].
///
/// Handles are cheap to copy and compare. Two handles are equal only if they
/// refer to the same object, which makes a `NodePtr` usable as an identity key.
/// Use [`node_eq`] to compare trees by value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePtr(u32);

impl NodePtr {
    /// The canonical empty atom. Every allocator pre-allocates it.
    pub const NIL: Self = Self(0);

    fn new_atom(index: usize) -> Self {
        Self(index as u32)
    }

    fn new_pair(index: usize) -> Self {
        Self(index as u32 | PAIR_BIT)
    }

    fn index(self) -> usize {
        (self.0 & INDEX_MASK) as usize
    }

    pub fn is_pair(self) -> bool {
        self.0 & PAIR_BIT != 0
    }

    pub fn is_atom(self) -> bool {
        !self.is_pair()
    }
}

impl Default for NodePtr {
    fn default() -> Self {
        Self::NIL
    }
}

impl fmt::Debug for NodePtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_pair() {
            write!(f, "NodePtr::Pair({})", self.index())
        } else {
            write!(f, "NodePtr::Atom({})", self.index())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SExp {
    Atom,
    Pair(NodePtr, NodePtr),
}

#[derive(Debug, Clone, Copy)]
struct AtomBuf {
    start: usize,
    end: usize,
}

#[derive(Debug, Clone, Copy)]
struct IntPair {
    first: NodePtr,
    rest: NodePtr,
}

/// Arena owning every atom and pair of one or more trees.
///
/// Objects are immutable once allocated and live as long as the allocator.
/// Sub-trees may be shared by any number of parents.
#[derive(Debug, Clone)]
pub struct Allocator {
    // atom payloads, back to back
    u8s: Vec<u8>,
    atom_vec: Vec<AtomBuf>,
    pair_vec: Vec<IntPair>,

    // the number of payload bytes the atoms may use, in total
    heap_limit: usize,
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator {
    pub fn new() -> Self {
        Self::new_limited(usize::MAX)
    }

    pub fn new_limited(heap_limit: usize) -> Self {
        let mut a = Self {
            u8s: Vec::new(),
            atom_vec: Vec::new(),
            pair_vec: Vec::new(),
            heap_limit,
        };
        // index 0 is nil, index 1 is one. Neither counts against the limit
        a.atom_vec.push(AtomBuf { start: 0, end: 0 });
        a.u8s.push(1);
        a.atom_vec.push(AtomBuf { start: 0, end: 1 });
        a
    }

    pub fn nil(&self) -> NodePtr {
        NodePtr::NIL
    }

    pub fn one(&self) -> NodePtr {
        NodePtr::new_atom(1)
    }

    pub fn new_atom(&mut self, v: &[u8]) -> Result<NodePtr, NodeError> {
        if v.len() > self.heap_limit.saturating_sub(self.heap_size()) {
            return Err(NodeError::OutOfMemory);
        }
        if self.atom_vec.len() >= MAX_NUM_ATOMS {
            return Err(NodeError::TooManyAtoms);
        }
        self.u8s
            .try_reserve(v.len())
            .map_err(|_| NodeError::OutOfMemory)?;
        let start = self.u8s.len();
        self.u8s.extend_from_slice(v);
        let end = self.u8s.len();
        self.atom_vec.push(AtomBuf { start, end });
        Ok(NodePtr::new_atom(self.atom_vec.len() - 1))
    }

    pub fn new_pair(&mut self, first: NodePtr, rest: NodePtr) -> Result<NodePtr, NodeError> {
        if self.pair_vec.len() >= MAX_NUM_PAIRS {
            return Err(NodeError::TooManyPairs);
        }
        self.pair_vec.push(IntPair { first, rest });
        Ok(NodePtr::new_pair(self.pair_vec.len() - 1))
    }

    pub fn new_small_number(&mut self, v: u32) -> Result<NodePtr, NodeError> {
        self.new_atom(&encode_number(&v.to_be_bytes(), false))
    }

    pub fn new_number(&mut self, v: &BigInt) -> Result<NodePtr, NodeError> {
        if v.sign() == num_bigint::Sign::NoSign {
            return Ok(self.nil());
        }
        self.new_atom(&v.to_signed_bytes_be())
    }

    pub fn sexp(&self, node: NodePtr) -> SExp {
        if node.is_pair() {
            let pair = self.pair_vec[node.index()];
            SExp::Pair(pair.first, pair.rest)
        } else {
            SExp::Atom
        }
    }

    pub fn atom(&self, node: NodePtr) -> Result<&[u8], NodeError> {
        if node.is_pair() {
            return Err(NodeError::ExpectedAtom);
        }
        let buf = self.atom_vec[node.index()];
        Ok(&self.u8s[buf.start..buf.end])
    }

    pub fn atom_len(&self, node: NodePtr) -> Result<usize, NodeError> {
        if node.is_pair() {
            return Err(NodeError::ExpectedAtom);
        }
        let buf = self.atom_vec[node.index()];
        Ok(buf.end - buf.start)
    }

    pub fn pair(&self, node: NodePtr) -> Result<(NodePtr, NodePtr), NodeError> {
        match self.sexp(node) {
            SExp::Pair(first, rest) => Ok((first, rest)),
            SExp::Atom => Err(NodeError::ExpectedPair),
        }
    }

    pub fn first(&self, node: NodePtr) -> Result<NodePtr, NodeError> {
        self.pair(node).map(|(first, _)| first)
    }

    pub fn rest(&self, node: NodePtr) -> Result<NodePtr, NodeError> {
        self.pair(node).map(|(_, rest)| rest)
    }

    /// True for any empty atom, not just the [`NodePtr::NIL`] handle.
    pub fn is_nil(&self, node: NodePtr) -> bool {
        matches!(self.atom_len(node), Ok(0))
    }

    /// Interprets an atom as a signed, big-endian integer.
    pub fn number(&self, node: NodePtr) -> Result<BigInt, NodeError> {
        Ok(BigInt::from_signed_bytes_be(self.atom(node)?))
    }

    pub fn list_iter(&self, node: NodePtr) -> ListIter<'_> {
        ListIter { a: self, node }
    }

    /// Collects the elements of a nil-terminated list.
    pub fn list(&self, node: NodePtr) -> Result<Vec<NodePtr>, NodeError> {
        let mut iter = self.list_iter(node);
        let items: Vec<NodePtr> = iter.by_ref().collect();
        if self.is_nil(iter.terminator()) {
            Ok(items)
        } else {
            Err(NodeError::ExpectedPair)
        }
    }

    pub fn atom_count(&self) -> usize {
        self.atom_vec.len()
    }

    pub fn pair_count(&self) -> usize {
        self.pair_vec.len()
    }

    /// Number of atom payload bytes in use, not counting the pre-allocated `one`.
    pub fn heap_size(&self) -> usize {
        self.u8s.len() - 1
    }
}

/// Walks the `first` elements of a right-nested list.
///
/// Iteration stops at the first atom, which is available through
/// [`ListIter::terminator`] afterwards.
#[derive(Debug, Clone)]
pub struct ListIter<'a> {
    a: &'a Allocator,
    node: NodePtr,
}

impl ListIter<'_> {
    pub fn terminator(&self) -> NodePtr {
        self.node
    }
}

impl Iterator for ListIter<'_> {
    type Item = NodePtr;

    fn next(&mut self) -> Option<NodePtr> {
        match self.a.sexp(self.node) {
            SExp::Pair(first, rest) => {
                self.node = rest;
                Some(first)
            }
            SExp::Atom => None,
        }
    }
}

/// Deep structural equality of two trees, possibly from different allocators.
pub fn node_eq(a: &Allocator, left: NodePtr, b: &Allocator, right: NodePtr) -> bool {
    let same_allocator = std::ptr::eq(a, b);
    let mut stack = vec![(left, right)];

    while let Some((l, r)) = stack.pop() {
        if same_allocator && l == r {
            continue;
        }
        match (a.sexp(l), b.sexp(r)) {
            (SExp::Atom, SExp::Atom) => {
                if a.atom(l) != b.atom(r) {
                    return false;
                }
            }
            (SExp::Pair(l_first, l_rest), SExp::Pair(r_first, r_rest)) => {
                stack.push((l_rest, r_rest));
                stack.push((l_first, r_first));
            }
            _ => return false,
        }
    }
    true
}
