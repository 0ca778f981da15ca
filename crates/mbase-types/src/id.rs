//! Content-addressed identifiers.
//!
//! Both [`RevisionId`] and [`ContentId`] are 32-byte BLAKE3 digests. They are
//! distinct types so a revision can never be confused with the content of a
//! path inside it. Ordering on either type is the byte-wise ordering of the
//! digest: it is stable and canonical, but carries no meaning about history.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

macro_rules! digest_id {
    ($(#[$meta:meta])* $name:ident, $domain:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; 32]);

        impl $name {
            /// Compute an identifier from raw bytes (domain-separated BLAKE3).
            pub fn from_bytes(data: &[u8]) -> Self {
                let mut hasher = blake3::Hasher::new();
                hasher.update($domain);
                hasher.update(data);
                Self(*hasher.finalize().as_bytes())
            }

            /// Create an identifier from a pre-computed hash.
            pub const fn from_hash(hash: [u8; 32]) -> Self {
                Self(hash)
            }

            /// The raw 32-byte hash.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Hex-encoded string representation.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Short hex representation (first 8 characters).
            pub fn short_hex(&self) -> String {
                hex::encode(&self.0[..4])
            }

            /// Parse from a 64-character hex string.
            pub fn from_hex(s: &str) -> Result<Self, TypeError> {
                let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
                if bytes.len() != 32 {
                    return Err(TypeError::InvalidLength {
                        expected: 32,
                        actual: bytes.len(),
                    });
                }
                let mut arr = [0u8; 32];
                arr.copy_from_slice(&bytes);
                Ok(Self(arr))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.short_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

digest_id!(
    /// Identifier of an immutable revision in the history graph.
    RevisionId,
    b"mbase:revision\0"
);

digest_id!(
    /// Identifier of the content stored at a path inside a revision.
    ///
    /// Two revisions that hold byte-identical content at a path report the
    /// same `ContentId`, which is how merge-base selection detects
    /// content-identical candidates.
    ContentId,
    b"mbase:content\0"
);
