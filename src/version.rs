use bytes::{BufMut, Bytes, BytesMut};
use std::cmp::PartialEq;
use std::fmt::Debug;

use crate::errors::{Error, Result};

/// The Bolt protocol version negotiated with the server during the handshake.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub enum Version {
    V4,
    V4_1,
    V4_2,
    V4_3,
    V4_4,
}

impl Version {
    /// The four 4-byte version proposals sent during the handshake, highest first.
    pub fn supported_versions() -> Bytes {
        let mut bytes = BytesMut::with_capacity(16);
        let versions: [u32; 4] = [0x0004_0404, 0x0003_0404, 0x0104, 0x0004];
        for version in versions.iter() {
            bytes.put_u32(*version);
        }
        bytes.freeze()
    }

    pub fn parse(version_bytes: [u8; 4]) -> Result<Version> {
        match u32::from_be_bytes(version_bytes) {
            0 => Err(Error::ProtocolMismatch(0)),
            0x0404 => Ok(Version::V4_4),
            0x0304 => Ok(Version::V4_3),
            0x0204 => Ok(Version::V4_2),
            260 => Ok(Version::V4_1),
            4 => Ok(Version::V4),
            other => Err(Error::UnsupportedVersion(
                (other >> 8) as u8,
                (other & 0xFF) as u8,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_version() {
        assert_eq!(Version::parse([0, 0, 1, 4]).unwrap(), Version::V4_1);
        assert_eq!(Version::parse([0, 0, 0, 4]).unwrap(), Version::V4);
    }

    #[test]
    fn should_reject_unrecognized_handshake_reply() {
        assert!(matches!(
            Version::parse([0, 0, 0, 0]),
            Err(Error::ProtocolMismatch(0))
        ));
    }
}
