use num_bigint::BigInt;

use crate::{Allocator, NodeError, NodePtr, encode_number};

/// Builds a tree in an [`Allocator`] out of a Rust value.
///
/// * `()` and `None` become nil
/// * integers become their minimal two's complement atom
/// * strings and [`Bytes`] become atoms of their bytes
/// * 2-tuples become pairs
/// * slices, arrays and vectors become nil-terminated lists
pub trait ToNode {
    fn to_node(&self, a: &mut Allocator) -> Result<NodePtr, NodeError>;
}

macro_rules! node_primitive {
    ($primitive:ty) => {
        impl ToNode for $primitive {
            #[allow(unused_comparisons, clippy::absurd_extreme_comparisons)]
            fn to_node(&self, a: &mut Allocator) -> Result<NodePtr, NodeError> {
                a.new_atom(&encode_number(&self.to_be_bytes(), *self < 0))
            }
        }
    };
}

node_primitive!(u8);
node_primitive!(i8);
node_primitive!(u16);
node_primitive!(i16);
node_primitive!(u32);
node_primitive!(i32);
node_primitive!(u64);
node_primitive!(i64);
node_primitive!(u128);
node_primitive!(i128);
node_primitive!(usize);
node_primitive!(isize);

impl ToNode for BigInt {
    fn to_node(&self, a: &mut Allocator) -> Result<NodePtr, NodeError> {
        a.new_number(self)
    }
}

impl ToNode for bool {
    fn to_node(&self, a: &mut Allocator) -> Result<NodePtr, NodeError> {
        Ok(if *self { a.one() } else { a.nil() })
    }
}

impl ToNode for NodePtr {
    fn to_node(&self, _a: &mut Allocator) -> Result<NodePtr, NodeError> {
        Ok(*self)
    }
}

impl<T> ToNode for &T
where
    T: ToNode + ?Sized,
{
    fn to_node(&self, a: &mut Allocator) -> Result<NodePtr, NodeError> {
        T::to_node(*self, a)
    }
}

impl ToNode for () {
    fn to_node(&self, a: &mut Allocator) -> Result<NodePtr, NodeError> {
        Ok(a.nil())
    }
}

impl<A, B> ToNode for (A, B)
where
    A: ToNode,
    B: ToNode,
{
    fn to_node(&self, a: &mut Allocator) -> Result<NodePtr, NodeError> {
        let first = self.0.to_node(a)?;
        let rest = self.1.to_node(a)?;
        a.new_pair(first, rest)
    }
}

impl<T> ToNode for Option<T>
where
    T: ToNode,
{
    fn to_node(&self, a: &mut Allocator) -> Result<NodePtr, NodeError> {
        match self {
            Some(value) => value.to_node(a),
            None => Ok(a.nil()),
        }
    }
}

impl<T> ToNode for [T]
where
    T: ToNode,
{
    fn to_node(&self, a: &mut Allocator) -> Result<NodePtr, NodeError> {
        let mut result = a.nil();
        for item in self.iter().rev() {
            let value = item.to_node(a)?;
            result = a.new_pair(value, result)?;
        }
        Ok(result)
    }
}

impl<T, const LEN: usize> ToNode for [T; LEN]
where
    T: ToNode,
{
    fn to_node(&self, a: &mut Allocator) -> Result<NodePtr, NodeError> {
        self.as_slice().to_node(a)
    }
}

impl<T> ToNode for Vec<T>
where
    T: ToNode,
{
    fn to_node(&self, a: &mut Allocator) -> Result<NodePtr, NodeError> {
        self.as_slice().to_node(a)
    }
}

impl ToNode for str {
    fn to_node(&self, a: &mut Allocator) -> Result<NodePtr, NodeError> {
        a.new_atom(self.as_bytes())
    }
}

impl ToNode for String {
    fn to_node(&self, a: &mut Allocator) -> Result<NodePtr, NodeError> {
        self.as_str().to_node(a)
    }
}

/// An opaque byte string. Unlike `Vec<u8>`, which is a list of small
/// integers, this converts to a single atom.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for Bytes {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl ToNode for Bytes {
    fn to_node(&self, a: &mut Allocator) -> Result<NodePtr, NodeError> {
        a.new_atom(&self.0)
    }
}
