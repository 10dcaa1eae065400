#![allow(clippy::from_over_into)]

use crate::errors::{Error, Result};
use crate::types::*;
use crate::version::Version;
use bytes::*;
use chrono::{FixedOffset, NaiveTime, Offset, Timelike};
use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

pub const TIME_MARKER: u8 = 0xB2;
pub const TIME_SIGNATURE: u8 = 0x54;

pub const LOCAL_TIME_MARKER: u8 = 0xB1;
pub const LOCAL_TIME_SIGNATURE: u8 = 0x74;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct BoltTime {
    nanoseconds: BoltInteger,
    tz_offset_seconds: BoltInteger,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct BoltLocalTime {
    nanoseconds: BoltInteger,
}

impl BoltTime {
    pub fn can_parse(_: Version, input: Rc<RefCell<Bytes>>) -> bool {
        let slice = input.borrow();
        slice.len() >= 2 && slice[0] == TIME_MARKER && slice[1] == TIME_SIGNATURE
    }

    pub fn parse(version: Version, input: Rc<RefCell<Bytes>>) -> Result<BoltTime> {
        let marker = input.borrow_mut().get_u8();
        let signature = input.borrow_mut().get_u8();
        if marker != TIME_MARKER || signature != TIME_SIGNATURE {
            return Err(Error::InvalidTypeMarker(
                "invalid time marker/signature".into(),
            ));
        }

        let nanoseconds = BoltInteger::parse(version, input.clone())?;
        let tz_offset_seconds = BoltInteger::parse(version, input)?;

        Ok(BoltTime {
            nanoseconds,
            tz_offset_seconds,
        })
    }

    pub(crate) fn into_bytes(self, version: Version) -> Result<Bytes> {
        let nanoseconds = self.nanoseconds.into_bytes(version)?;
        let tz_offset_seconds = self.tz_offset_seconds.into_bytes(version)?;

        let mut bytes = BytesMut::with_capacity(
            mem::size_of::<u8>() * 2 + nanoseconds.len() + tz_offset_seconds.len(),
        );
        bytes.put_u8(TIME_MARKER);
        bytes.put_u8(TIME_SIGNATURE);
        bytes.put(nanoseconds);
        bytes.put(tz_offset_seconds);
        Ok(bytes.freeze())
    }
}

impl BoltLocalTime {
    pub fn can_parse(_: Version, input: Rc<RefCell<Bytes>>) -> bool {
        let slice = input.borrow();
        slice.len() >= 2 && slice[0] == LOCAL_TIME_MARKER && slice[1] == LOCAL_TIME_SIGNATURE
    }

    pub fn parse(version: Version, input: Rc<RefCell<Bytes>>) -> Result<BoltLocalTime> {
        let marker = input.borrow_mut().get_u8();
        let signature = input.borrow_mut().get_u8();
        if marker != LOCAL_TIME_MARKER || signature != LOCAL_TIME_SIGNATURE {
            return Err(Error::InvalidTypeMarker(
                "invalid local time marker/signature".into(),
            ));
        }

        let nanoseconds = BoltInteger::parse(version, input)?;

        Ok(BoltLocalTime { nanoseconds })
    }

    pub(crate) fn into_bytes(self, version: Version) -> Result<Bytes> {
        let nanoseconds = self.nanoseconds.into_bytes(version)?;

        let mut bytes = BytesMut::with_capacity(mem::size_of::<u8>() * 2 + nanoseconds.len());
        bytes.put_u8(LOCAL_TIME_MARKER);
        bytes.put_u8(LOCAL_TIME_SIGNATURE);
        bytes.put(nanoseconds);
        Ok(bytes.freeze())
    }
}

impl From<(NaiveTime, FixedOffset)> for BoltTime {
    fn from(value: (NaiveTime, FixedOffset)) -> Self {
        let seconds_from_midnight = value.0.num_seconds_from_midnight() as i64;
        let nanoseconds = seconds_from_midnight * 1_000_000_000 + value.0.nanosecond() as i64;
        BoltTime {
            nanoseconds: nanoseconds.into(),
            tz_offset_seconds: value.1.fix().local_minus_utc().into(),
        }
    }
}

impl From<BoltTime> for (NaiveTime, FixedOffset) {
    fn from(value: BoltTime) -> Self {
        let nanos = value.nanoseconds.value;
        let seconds = (nanos / 1_000_000_000) as u32;
        let nanoseconds = (nanos % 1_000_000_000) as u32;

        let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanoseconds)
            .unwrap_or_else(|| {
                panic!(
                    "invalid number of seconds {} or nanoseconds {}",
                    seconds, nanoseconds
                )
            });
        let offset = FixedOffset::east_opt(value.tz_offset_seconds.value as i32)
            .unwrap_or_else(|| panic!("invald timezone offset {}", value.tz_offset_seconds.value));

        (time, offset)
    }
}

impl From<NaiveTime> for BoltLocalTime {
    fn from(value: NaiveTime) -> Self {
        let seconds_from_midnight = value.num_seconds_from_midnight() as i64;
        let nanoseconds = seconds_from_midnight * 1_000_000_000 + value.nanosecond() as i64;
        BoltLocalTime {
            nanoseconds: nanoseconds.into(),
        }
    }
}

impl From<BoltLocalTime> for NaiveTime {
    fn from(value: BoltLocalTime) -> Self {
        let nanos = value.nanoseconds.value;
        let seconds = (nanos / 1_000_000_000) as u32;
        let nanoseconds = (nanos % 1_000_000_000) as u32;
        NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanoseconds).unwrap_or_else(|| {
            panic!(
                "invalid number of seconds {} and nanoseconds {}",
                seconds, nanoseconds
            )
        })
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
    fn should_serialize_time() {
        let time = NaiveTime::from_hms_nano_opt(7, 8, 9, 100).unwrap();
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();

        let time: BoltTime = (time, offset).into();

        assert_eq!(
            time.into_bytes(Version::V4_1).unwrap(),
            Bytes::from_static(&[
                0xB2, 0x54, 0xCB, 0x00, 0x00, 0x17, 0x5D, 0x2F, 0xB8, 0x3A, 0x64, 0xC9, 0x1C, 0x20,
            ])
        );
    }

    #[test]
    fn should_deserialize_time() {
        let bytes = Rc::new(RefCell::new(Bytes::from_static(&[
            0xB2, 0x54, 0xCB, 0x00, 0x00, 0x17, 0x5D, 0x2F, 0xB8, 0x3A, 0x64, 0xC9, 0x1C, 0x20,
        ])));

        let (time, offset) = BoltTime::parse(Version::V4_1, bytes)
            .unwrap()
            .try_into()
            .unwrap();

        assert_eq!(time.to_string(), "07:08:09.000000100");
        assert_eq!(offset, FixedOffset::east_opt(2 * 3600).unwrap());
    }

    #[test]
    fn should_serialize_local_time() {
        let naive_time = NaiveTime::from_hms_nano_opt(7, 8, 9, 100).unwrap();

        let time: BoltLocalTime = naive_time.into();

        assert_eq!(
            time.into_bytes(Version::V4_1).unwrap(),
            Bytes::from_static(&[
                0xB1, 0x74, 0xCB, 0x00, 0x00, 0x17, 0x5D, 0x2F, 0xB8, 0x3A, 0x64,
            ])
        );
    }

    #[test]
    fn should_deserialize_local_time() {
        let bytes = Rc::new(RefCell::new(Bytes::from_static(&[
            0xB1, 0x74, 0xCB, 0x00, 0x00, 0x17, 0x5D, 0x2F, 0xB8, 0x3A, 0x64,
        ])));

        let time: NaiveTime = BoltLocalTime::parse(Version::V4_1, bytes)
            .unwrap()
            .try_into()
            .unwrap();

        assert_eq!(time.to_string(), "07:08:09.000000100");
    }
}
