use crate::errors::Result;
use crate::version::Version;
use bytes::*;
use std::mem;

pub const MARKER: u8 = 0xB0;
pub const SIGNATURE: u8 = 0x13;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Rollback;

impl Rollback {
    pub fn new() -> Rollback {
        Rollback {}
    }

    pub(crate) fn into_bytes(self, _version: Version) -> Result<Bytes> {
        let mut bytes = BytesMut::with_capacity(mem::size_of::<u8>() + mem::size_of::<u8>());
        bytes.put_u8(MARKER);
        bytes.put_u8(SIGNATURE);
        Ok(bytes.freeze())
    }
}

impl Default for Rollback {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_rollback() {
        let rollback = Rollback::new();

        let bytes: Bytes = rollback.into_bytes(Version::V4_1).unwrap();

        assert_eq!(bytes, Bytes::from_static(&[MARKER, SIGNATURE]));
    }
}
