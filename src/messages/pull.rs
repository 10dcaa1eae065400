use crate::errors::Result;
use crate::types::BoltMap;
use crate::version::Version;
use bytes::*;
use std::mem;

pub const MARKER: u8 = 0xB1;
pub const SIGNATURE: u8 = 0x3F;

#[derive(Debug, PartialEq, Clone)]
pub struct Pull {
    extra: BoltMap,
}

impl Default for Pull {
    fn default() -> Self {
        Pull::new(-1, -1)
    }
}

impl Pull {
    pub fn new(n: i64, qid: i64) -> Pull {
        let mut extra = BoltMap::default();
        extra.put("n".into(), n.into());
        extra.put("qid".into(), qid.into());
        Pull { extra }
    }

    pub(crate) fn into_bytes(self, version: Version) -> Result<Bytes> {
        let extra: Bytes = self.extra.into_bytes(version)?;
        let mut bytes =
            BytesMut::with_capacity(mem::size_of::<u8>() + mem::size_of::<u8>() + extra.len());
        bytes.put_u8(MARKER);
        bytes.put_u8(SIGNATURE);
        bytes.put(extra);
        Ok(bytes.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn should_serialize_pull_message() {
        let pull = Pull::new(42, 1);
        let bytes: Bytes = pull.into_bytes(Version::V4_1).unwrap();
        let (marker_signature, extra) = bytes.split_at(2);
        assert_eq!(marker_signature, &[MARKER, SIGNATURE]);
        let extra: BoltMap = BoltMap::parse(
            Version::V4_1,
            Rc::new(RefCell::new(Bytes::copy_from_slice(extra))),
        )
        .unwrap();

        assert_eq!(extra.get::<i64>("n").unwrap(), 42);
        assert_eq!(extra.get::<i64>("qid").unwrap(), 1);
    }

    #[test]
    fn should_serialize_pull_with_default_value() {
        let pull = Pull::default();
        let bytes: Bytes = pull.into_bytes(Version::V4_1).unwrap();
        let (marker_signature, extra) = bytes.split_at(2);
        assert_eq!(marker_signature, &[MARKER, SIGNATURE]);
        let extra: BoltMap = BoltMap::parse(
            Version::V4_1,
            Rc::new(RefCell::new(Bytes::copy_from_slice(extra))),
        )
        .unwrap();

        assert_eq!(extra.get::<i64>("n").unwrap(), 255);
        assert_eq!(extra.get::<i64>("qid").unwrap(), 255);
    }
}
