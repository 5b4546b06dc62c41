use std::fmt;
use std::ops::Deref;

use clvm_node::{Allocator, NodePtr};

use crate::decode::node_from_bytes_backrefs;
use crate::encode::{node_to_bytes, node_to_bytes_backrefs};
use crate::flags::ALLOW_BACKREFS;
use crate::scan::serialized_length_from_bytes_flags;
use crate::{Error, Result};

/// The serialization of exactly one tree, possibly using back-references.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SerializedNode(Vec<u8>);

impl Default for SerializedNode {
    fn default() -> Self {
        Self(vec![0x80])
    }
}

impl SerializedNode {
    pub fn from_node(a: &Allocator, node: NodePtr) -> Result<Self> {
        Ok(Self(node_to_bytes(a, node)?))
    }

    pub fn from_node_backrefs(a: &Allocator, node: NodePtr) -> Result<Self> {
        Ok(Self(node_to_bytes_backrefs(a, node)?))
    }

    /// Takes the value at the front of `buf`, returning it together with
    /// whatever follows it.
    pub fn parse(buf: &[u8]) -> Result<(Self, &[u8])> {
        let len = serialized_length_from_bytes_flags(buf, ALLOW_BACKREFS)?;
        let (value, rest) = buf.split_at(len as usize);
        Ok((Self(value.to_vec()), rest))
    }

    pub fn to_node(&self, a: &mut Allocator) -> Result<NodePtr> {
        node_from_bytes_backrefs(a, &self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl TryFrom<Vec<u8>> for SerializedNode {
    type Error = Error;

    /// The bytes must hold one value and nothing else.
    fn try_from(value: Vec<u8>) -> Result<Self> {
        let len = serialized_length_from_bytes_flags(&value, ALLOW_BACKREFS)?;
        if len != value.len() as u64 {
            return Err(Error::MalformedInput("trailing bytes after value"));
        }
        Ok(Self(value))
    }
}

impl TryFrom<&[u8]> for SerializedNode {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self> {
        Self::try_from(value.to_vec())
    }
}

impl From<SerializedNode> for Vec<u8> {
    fn from(value: SerializedNode) -> Self {
        value.0
    }
}

impl AsRef<[u8]> for SerializedNode {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for SerializedNode {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for SerializedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::SerializedNode;

    impl Serialize for SerializedNode {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&format!("0x{}", hex::encode(&self.0)))
            } else {
                serializer.serialize_bytes(&self.0)
            }
        }
    }

    struct BytesVisitor;

    impl Visitor<'_> for BytesVisitor {
        type Value = Vec<u8>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a serialized tree, as bytes or a hex string")
        }

        fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E> {
            Ok(v.to_vec())
        }

        fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E> {
            Ok(v)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let v = v
                .strip_prefix("0x")
                .or_else(|| v.strip_prefix("0X"))
                .unwrap_or(v);
            hex::decode(v).map_err(de::Error::custom)
        }
    }

    impl<'de> Deserialize<'de> for SerializedNode {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let bytes = if deserializer.is_human_readable() {
                deserializer.deserialize_str(BytesVisitor)?
            } else {
                deserializer.deserialize_byte_buf(BytesVisitor)?
            };
            SerializedNode::try_from(bytes).map_err(de::Error::custom)
        }
    }
}
