use crate::errors::{Neo4jError, Result};
use crate::version::Version;
use bytes::Bytes;
use std::cell::RefCell;
use std::rc::Rc;

pub const MARKER: u8 = 0xB0;
pub const SIGNATURE: u8 = 0x7E;

#[derive(Debug, PartialEq, Clone)]
pub struct Ignore;

impl Ignore {
    pub(crate) fn into_error(self) -> Neo4jError {
        Neo4jError::new(
            "Neo.ServerError.Ignored".into(),
            "The request was ignored by the server because it is in a FAILED or INTERRUPTED state"
                .into(),
        )
    }

    pub(crate) fn can_parse(_version: Version, input: Rc<RefCell<Bytes>>) -> bool {
        let marker: u8 = input.borrow()[0];
        let signature: u8 = input.borrow()[1];
        marker == MARKER && signature == SIGNATURE
    }

    pub(crate) fn parse(_version: Version, input: Rc<RefCell<Bytes>>) -> Result<Ignore> {
        let _marker = input.borrow_mut().get_u8();
        let _signature = input.borrow_mut().get_u8();
        Ok(Ignore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_deserialize_ignored() {
        let data = Bytes::from_static(&[0xB0, 0x7E]);

        let ignored = Ignore::parse(Version::V4_1, Rc::new(RefCell::new(data))).unwrap();
        let err = ignored.into_error();

        assert_eq!(err.code(), "Neo.ServerError.Ignored");
        assert_eq!(
            err.message(),
            "The request was ignored by the server because it is in a FAILED or INTERRUPTED state"
        );
    }
}
