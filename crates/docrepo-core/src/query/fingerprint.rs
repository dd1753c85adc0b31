//! Deterministic descriptor fingerprinting for the derived-query cache.
#![allow(clippy::cast_possible_truncation)]

use crate::query::descriptor::ArgShape;
use sha2::{Digest, Sha256};
use std::fmt;

///
/// DescriptorFingerprint
///
/// Stable identity of one method descriptor + declared argument shape.
/// Two registrations with equal fingerprints share one parsed template.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DescriptorFingerprint([u8; 32]);

impl DescriptorFingerprint {
    /// Compute the fingerprint of `method` declared with `shape`.
    #[must_use]
    pub fn of(method: &str, shape: &[ArgShape]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"descfp:v1");

        write_tag(&mut hasher, 0x01);
        write_str(&mut hasher, method);

        write_tag(&mut hasher, 0x02);
        write_u32(&mut hasher, shape.len() as u32);
        for arg in shape {
            write_tag(&mut hasher, arg.tag());
        }

        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);

        Self(out)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        crate::cursor::codec::encode_hex(&self.0)
    }
}

impl fmt::Display for DescriptorFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

fn write_str(hasher: &mut Sha256, value: &str) {
    write_u32(hasher, value.len() as u32);
    hasher.update(value.as_bytes());
}

fn write_u32(hasher: &mut Sha256, value: u32) {
    hasher.update(value.to_be_bytes());
}

fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}

///
/// TESTS
///
