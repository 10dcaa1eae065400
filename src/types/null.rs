use crate::errors::{Error, Result};
use crate::version::Version;
use bytes::*;
use std::cell::RefCell;
use std::rc::Rc;

pub const MARKER: u8 = 0xC0;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct BoltNull;

impl Default for BoltNull {
    fn default() -> Self {
        BoltNull
    }
}

impl BoltNull {
    pub fn can_parse(_: Version, input: Rc<RefCell<Bytes>>) -> bool {
        input.borrow()[0] == MARKER
    }

    pub fn parse(_: Version, input: Rc<RefCell<Bytes>>) -> Result<BoltNull> {
        let marker = input.borrow_mut().get_u8();
        if marker != MARKER {
            return Err(Error::InvalidTypeMarker("invalid null marker".into()));
        }
        Ok(BoltNull)
    }

    pub(crate) fn into_bytes(self, _: Version) -> Result<Bytes> {
        Ok(Bytes::from_static(&[MARKER]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;

    #[test]
    fn should_serialize_null() {
        let null = BoltNull::default();
        let b: Bytes = null.into_bytes(Version::V4_1).unwrap();
        assert_eq!(&b[..], &[0xC0]);
    }
}
