use crate::errors::Result;
use crate::version::Version;
use bytes::*;
use std::mem;

pub const MARKER: u8 = 0xB0;
pub const SIGNATURE: u8 = 0x0F;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Reset;

impl Reset {
    pub fn new() -> Reset {
        Reset
    }

    pub(crate) fn into_bytes(self, _version: Version) -> Result<Bytes> {
        let mut bytes = BytesMut::with_capacity(mem::size_of::<u8>() + mem::size_of::<u8>());
        bytes.put_u8(MARKER);
        bytes.put_u8(SIGNATURE);
        Ok(bytes.freeze())
    }
}

impl Default for Reset {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_reset() {
        let reset = Reset::new();

        let bytes: Bytes = reset.into_bytes(Version::V4_1).unwrap();

        assert_eq!(bytes, Bytes::from_static(&[MARKER, SIGNATURE]));
    }
}
