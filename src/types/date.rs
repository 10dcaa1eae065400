use crate::errors::{Error, Result};
use crate::types::*;
use crate::version::Version;
use bytes::*;
use chrono::{Duration, NaiveDate};
use std::cell::RefCell;
use std::convert::TryInto;
use std::mem;
use std::rc::Rc;

pub const MARKER: u8 = 0xB1;
pub const SIGNATURE: u8 = 0x44;

#[derive(Debug, PartialEq, Clone)]
pub struct BoltDate {
    days: BoltInteger,
}

impl BoltDate {
    pub fn can_parse(_: Version, input: Rc<RefCell<Bytes>>) -> bool {
        let slice = input.borrow();
        slice.len() >= 2 && slice[0] == MARKER && slice[1] == SIGNATURE
    }

    pub fn parse(version: Version, input: Rc<RefCell<Bytes>>) -> Result<BoltDate> {
        let marker = input.borrow_mut().get_u8();
        let signature = input.borrow_mut().get_u8();
        if marker != MARKER || signature != SIGNATURE {
            return Err(Error::InvalidTypeMarker(
                "invalid date marker/signature".into(),
            ));
        }

        let days = BoltInteger::parse(version, input)?;
        Ok(BoltDate { days })
    }

    pub(crate) fn into_bytes(self, version: Version) -> Result<Bytes> {
        let days = self.days.into_bytes(version)?;

        let mut bytes = BytesMut::with_capacity(mem::size_of::<u8>() * 2 + days.len());
        bytes.put_u8(MARKER);
        bytes.put_u8(SIGNATURE);
        bytes.put(days);
        Ok(bytes.freeze())
    }
}

impl Into<BoltDate> for NaiveDate {
    fn into(self) -> BoltDate {
        let epoch = NaiveDate::from_ymd(1970, 1, 1);
        let days = (self - epoch).num_days().into();
        BoltDate { days }
    }
}

impl TryInto<NaiveDate> for BoltDate {
    type Error = Error;

    fn try_into(self) -> Result<NaiveDate> {
        let epoch = NaiveDate::from_ymd(1970, 1, 1);
        let days = Duration::days(self.days.value);
        epoch
            .checked_add_signed(days)
            .ok_or(Error::ConverstionError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;
    use bytes::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn should_serialize_a_date() {
        let date: BoltDate = NaiveDate::from_ymd(2010, 1, 1).into();
        assert_eq!(
            date.into_bytes(Version::V4_1).unwrap(),
            Bytes::from_static(&[0xB1, 0x44, 0xC9, 0x39, 0x12])
        );
    }

    #[test]
    fn should_deserialize_a_date() {
        let bytes = Rc::new(RefCell::new(Bytes::from_static(&[
            0xB1, 0x44, 0xC9, 0x39, 0x12,
        ])));

        let date: NaiveDate = BoltDate::parse(Version::V4_1, bytes)
            .unwrap()
            .try_into()
            .unwrap();

        assert_eq!(date.to_string(), "2010-01-01");
    }
}
