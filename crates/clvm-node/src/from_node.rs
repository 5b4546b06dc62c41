use num_bigint::BigInt;

use crate::{Allocator, Bytes, FromNodeError, NodePtr, decode_number};

/// The inverse of [`ToNode`](crate::ToNode): reads a Rust value out of a tree.
pub trait FromNode: Sized {
    fn from_node(a: &Allocator, node: NodePtr) -> Result<Self, FromNodeError>;
}

macro_rules! node_primitive {
    ($primitive:ty, $signed:expr) => {
        impl FromNode for $primitive {
            fn from_node(a: &Allocator, node: NodePtr) -> Result<Self, FromNodeError> {
                const LEN: usize = std::mem::size_of::<$primitive>();

                let atom = a.atom(node)?;
                let Some(bytes) = decode_number(atom, $signed) else {
                    return Err(FromNodeError::WrongAtomLength {
                        expected: LEN,
                        found: atom.len(),
                    });
                };
                Ok(<$primitive>::from_be_bytes(bytes))
            }
        }
    };
}

node_primitive!(u8, false);
node_primitive!(i8, true);
node_primitive!(u16, false);
node_primitive!(i16, true);
node_primitive!(u32, false);
node_primitive!(i32, true);
node_primitive!(u64, false);
node_primitive!(i64, true);
node_primitive!(u128, false);
node_primitive!(i128, true);
node_primitive!(usize, false);
node_primitive!(isize, true);

impl FromNode for BigInt {
    fn from_node(a: &Allocator, node: NodePtr) -> Result<Self, FromNodeError> {
        Ok(a.number(node)?)
    }
}

impl FromNode for bool {
    fn from_node(a: &Allocator, node: NodePtr) -> Result<Self, FromNodeError> {
        match a.atom(node)? {
            [] => Ok(false),
            [1] => Ok(true),
            _ => Err(FromNodeError::Custom(
                "expected boolean value of either `()` or `1`".to_string(),
            )),
        }
    }
}

impl FromNode for NodePtr {
    fn from_node(_a: &Allocator, node: NodePtr) -> Result<Self, FromNodeError> {
        Ok(node)
    }
}

impl FromNode for () {
    fn from_node(a: &Allocator, node: NodePtr) -> Result<Self, FromNodeError> {
        if a.is_nil(node) {
            Ok(())
        } else {
            Err(FromNodeError::Custom("expected nil".to_string()))
        }
    }
}

impl<A, B> FromNode for (A, B)
where
    A: FromNode,
    B: FromNode,
{
    fn from_node(a: &Allocator, node: NodePtr) -> Result<Self, FromNodeError> {
        let (first, rest) = a.pair(node)?;
        Ok((A::from_node(a, first)?, B::from_node(a, rest)?))
    }
}

impl<T> FromNode for Option<T>
where
    T: FromNode,
{
    fn from_node(a: &Allocator, node: NodePtr) -> Result<Self, FromNodeError> {
        if a.is_nil(node) {
            Ok(None)
        } else {
            T::from_node(a, node).map(Some)
        }
    }
}

impl<T> FromNode for Vec<T>
where
    T: FromNode,
{
    fn from_node(a: &Allocator, node: NodePtr) -> Result<Self, FromNodeError> {
        a.list(node)?
            .into_iter()
            .map(|item| T::from_node(a, item))
            .collect()
    }
}

impl FromNode for String {
    fn from_node(a: &Allocator, node: NodePtr) -> Result<Self, FromNodeError> {
        Ok(String::from_utf8(a.atom(node)?.to_vec())?)
    }
}

impl FromNode for Bytes {
    fn from_node(a: &Allocator, node: NodePtr) -> Result<Self, FromNodeError> {
        Ok(Bytes::new(a.atom(node)?.to_vec()))
    }
}
