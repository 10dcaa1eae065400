use crate::errors::{Error, Result};
use crate::types::*;
use crate::version::Version;
use bytes::*;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Timelike};
use std::cell::RefCell;
use std::convert::TryInto;
use std::mem;
use std::rc::Rc;

pub const DATETIME_MARKER: u8 = 0xB3;
pub const DATETIME_SIGNATURE: u8 = 0x46;

pub const LOCAL_DATETIME_MARKER: u8 = 0xB2;
pub const LOCAL_DATETIME_SIGNATURE: u8 = 0x64;

pub const DATETIME_ZONE_ID_MARKER: u8 = 0xB3;
pub const DATETIME_ZONE_ID_SIGNATURE: u8 = 0x66;

#[derive(Debug, PartialEq, Clone)]
pub struct BoltDateTime {
    seconds: BoltInteger,
    nanoseconds: BoltInteger,
    tz_offset_seconds: BoltInteger,
}

#[derive(Debug, PartialEq, Clone)]
pub struct BoltLocalDateTime {
    seconds: BoltInteger,
    nanoseconds: BoltInteger,
}

#[derive(Debug, PartialEq, Clone)]
pub struct BoltDateTimeZoneId {
    seconds: BoltInteger,
    nanoseconds: BoltInteger,
    tz_id: BoltString,
}

impl BoltDateTime {
    pub fn can_parse(_: Version, input: Rc<RefCell<Bytes>>) -> bool {
        let slice = input.borrow();
        slice.len() >= 2 && slice[0] == DATETIME_MARKER && slice[1] == DATETIME_SIGNATURE
    }

    pub fn parse(version: Version, input: Rc<RefCell<Bytes>>) -> Result<BoltDateTime> {
        let marker = input.borrow_mut().get_u8();
        let signature = input.borrow_mut().get_u8();
        if marker != DATETIME_MARKER || signature != DATETIME_SIGNATURE {
            return Err(Error::InvalidTypeMarker(
                "invalid datetime marker/signature".into(),
            ));
        }

        let seconds = BoltInteger::parse(version, input.clone())?;
        let nanoseconds = BoltInteger::parse(version, input.clone())?;
        let tz_offset_seconds = BoltInteger::parse(version, input)?;

        Ok(BoltDateTime {
            seconds,
            nanoseconds,
            tz_offset_seconds,
        })
    }

    pub(crate) fn into_bytes(self, version: Version) -> Result<Bytes> {
        let seconds = self.seconds.into_bytes(version)?;
        let nanoseconds = self.nanoseconds.into_bytes(version)?;
        let tz_offset_seconds = self.tz_offset_seconds.into_bytes(version)?;

        let mut bytes = BytesMut::with_capacity(
            mem::size_of::<u8>() * 2 + seconds.len() + nanoseconds.len() + tz_offset_seconds.len(),
        );
        bytes.put_u8(DATETIME_MARKER);
        bytes.put_u8(DATETIME_SIGNATURE);
        bytes.put(seconds);
        bytes.put(nanoseconds);
        bytes.put(tz_offset_seconds);
        Ok(bytes.freeze())
    }
}

impl BoltLocalDateTime {
    pub fn can_parse(_: Version, input: Rc<RefCell<Bytes>>) -> bool {
        let slice = input.borrow();
        slice.len() >= 2 && slice[0] == LOCAL_DATETIME_MARKER && slice[1] == LOCAL_DATETIME_SIGNATURE
    }

    pub fn parse(version: Version, input: Rc<RefCell<Bytes>>) -> Result<BoltLocalDateTime> {
        let marker = input.borrow_mut().get_u8();
        let signature = input.borrow_mut().get_u8();
        if marker != LOCAL_DATETIME_MARKER || signature != LOCAL_DATETIME_SIGNATURE {
            return Err(Error::InvalidTypeMarker(
                "invalid local datetime marker/signature".into(),
            ));
        }

        let seconds = BoltInteger::parse(version, input.clone())?;
        let nanoseconds = BoltInteger::parse(version, input)?;

        Ok(BoltLocalDateTime {
            seconds,
            nanoseconds,
        })
    }

    pub(crate) fn into_bytes(self, version: Version) -> Result<Bytes> {
        let seconds = self.seconds.into_bytes(version)?;
        let nanoseconds = self.nanoseconds.into_bytes(version)?;

        let mut bytes = BytesMut::with_capacity(
            mem::size_of::<u8>() * 2 + seconds.len() + nanoseconds.len(),
        );
        bytes.put_u8(LOCAL_DATETIME_MARKER);
        bytes.put_u8(LOCAL_DATETIME_SIGNATURE);
        bytes.put(seconds);
        bytes.put(nanoseconds);
        Ok(bytes.freeze())
    }
}

impl BoltDateTimeZoneId {
    pub fn can_parse(_: Version, input: Rc<RefCell<Bytes>>) -> bool {
        let slice = input.borrow();
        slice.len() >= 2
            && slice[0] == DATETIME_ZONE_ID_MARKER
            && slice[1] == DATETIME_ZONE_ID_SIGNATURE
    }

    pub fn parse(version: Version, input: Rc<RefCell<Bytes>>) -> Result<BoltDateTimeZoneId> {
        let marker = input.borrow_mut().get_u8();
        let signature = input.borrow_mut().get_u8();
        if marker != DATETIME_ZONE_ID_MARKER || signature != DATETIME_ZONE_ID_SIGNATURE {
            return Err(Error::InvalidTypeMarker(
                "invalid datetime-with-zone-id marker/signature".into(),
            ));
        }

        let seconds = BoltInteger::parse(version, input.clone())?;
        let nanoseconds = BoltInteger::parse(version, input.clone())?;
        let tz_id = BoltString::parse(version, input)?;

        Ok(BoltDateTimeZoneId {
            seconds,
            nanoseconds,
            tz_id,
        })
    }

    pub(crate) fn into_bytes(self, version: Version) -> Result<Bytes> {
        let seconds = self.seconds.into_bytes(version)?;
        let nanoseconds = self.nanoseconds.into_bytes(version)?;
        let tz_id = self.tz_id.into_bytes(version)?;

        let mut bytes = BytesMut::with_capacity(
            mem::size_of::<u8>() * 2 + seconds.len() + nanoseconds.len() + tz_id.len(),
        );
        bytes.put_u8(DATETIME_ZONE_ID_MARKER);
        bytes.put_u8(DATETIME_ZONE_ID_SIGNATURE);
        bytes.put(seconds);
        bytes.put(nanoseconds);
        bytes.put(tz_id);
        Ok(bytes.freeze())
    }
}

impl Into<BoltDateTimeZoneId> for (NaiveDateTime, &str) {
    fn into(self) -> BoltDateTimeZoneId {
        let seconds = self.0.timestamp().into();
        let nanoseconds = (self.0.timestamp_subsec_nanos() as i64).into();
        BoltDateTimeZoneId {
            seconds,
            nanoseconds,
            tz_id: self.1.into(),
        }
    }
}

impl TryInto<(NaiveDateTime, String)> for BoltDateTimeZoneId {
    type Error = Error;

    fn try_into(self) -> Result<(NaiveDateTime, String)> {
        let datetime =
            NaiveDateTime::from_timestamp(self.seconds.value, self.nanoseconds.value as u32);
        Ok((datetime, self.tz_id.into()))
    }
}

impl Into<BoltLocalDateTime> for NaiveDateTime {
    fn into(self) -> BoltLocalDateTime {
        let seconds = self.timestamp().into();
        let nanoseconds = (self.nanosecond() as i64).into();

        BoltLocalDateTime {
            seconds,
            nanoseconds,
        }
    }
}

impl TryInto<NaiveDateTime> for BoltLocalDateTime {
    type Error = Error;

    fn try_into(self) -> Result<NaiveDateTime> {
        Ok(NaiveDateTime::from_timestamp(
            self.seconds.value,
            self.nanoseconds.value as u32,
        ))
    }
}

impl Into<BoltDateTime> for DateTime<FixedOffset> {
    fn into(self) -> BoltDateTime {
        let seconds = (self.timestamp() + self.offset().fix().local_minus_utc() as i64).into();
        let nanoseconds = (self.nanosecond() as i64).into();
        let tz_offset_seconds = self.offset().fix().local_minus_utc().into();

        BoltDateTime {
            seconds,
            nanoseconds,
            tz_offset_seconds,
        }
    }
}

impl TryInto<DateTime<FixedOffset>> for BoltDateTime {
    type Error = Error;

    fn try_into(self) -> Result<DateTime<FixedOffset>> {
        let seconds = self.seconds.value - self.tz_offset_seconds.value;
        let datetime = NaiveDateTime::from_timestamp(seconds, self.nanoseconds.value as u32);
        Ok(DateTime::from_utc(
            datetime,
            FixedOffset::east(self.tz_offset_seconds.value as i32),
        ))
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
    fn should_serialize_a_datetime() {
        let date: BoltDateTime = DateTime::parse_from_rfc2822("Wed, 24 Jun 2015 12:50:35 +0100")
            .unwrap()
            .into();

        assert_eq!(
            date.into_bytes(Version::V4_1).unwrap(),
            Bytes::from_static(&[
                0xB3, 0x46, 0xCA, 0x55, 0x8A, 0xA7, 0x9B, 0x00, 0xC9, 0x0E, 0x10,
            ])
        );
    }

    #[test]
    fn should_deserialize_a_datetime() {
        let bytes = Rc::new(RefCell::new(Bytes::from_static(&[
            0xB3, 0x46, 0xCA, 0x55, 0x8A, 0xA7, 0x9B, 0x00, 0xC9, 0x0E, 0x10,
        ])));

        let datetime: DateTime<FixedOffset> = BoltDateTime::parse(Version::V4_1, bytes)
            .unwrap()
            .try_into()
            .unwrap();

        assert_eq!(datetime.to_rfc2822(), "Wed, 24 Jun 2015 12:50:35 +0100");
    }

    #[test]
    fn should_serialize_a_localdatetime() {
        let date: BoltLocalDateTime =
            NaiveDateTime::parse_from_str("2015-07-01 08:59:60.123", "%Y-%m-%d %H:%M:%S%.f")
                .unwrap()
                .into();
        assert_eq!(
            date.into_bytes(Version::V4_1).unwrap(),
            Bytes::from_static(&[
                0xB2, 0x64, 0xCA, 0x55, 0x93, 0xAC, 0x0F, 0xCA, 0x42, 0xEF, 0x9E, 0xC0,
            ])
        );
    }

    #[test]
    fn should_deserialize_a_localdatetime() {
        let bytes = Rc::new(RefCell::new(Bytes::from_static(&[
            0xB2, 0x64, 0xCA, 0x55, 0x93, 0xAC, 0x0F, 0xCA, 0x42, 0xEF, 0x9E, 0xC0,
        ])));

        let datetime: NaiveDateTime = BoltLocalDateTime::parse(Version::V4_1, bytes)
            .unwrap()
            .try_into()
            .unwrap();

        assert_eq!(datetime.to_string(), "2015-07-01 08:59:60.123");
    }

    #[test]
    fn should_serialize_a_datetime_with_zoneid() {
        let datetime =
            NaiveDateTime::parse_from_str("2015-07-01 08:59:60.123", "%Y-%m-%d %H:%M:%S%.f")
                .unwrap();

        let date: BoltDateTimeZoneId = (datetime, "Europe/Paris").into();

        assert_eq!(
            date.into_bytes(Version::V4_1).unwrap(),
            Bytes::from_static(&[
                0xB3, 0x66, 0xCA, 0x55, 0x93, 0xAC, 0x0F, 0xCA, 0x42, 0xEF, 0x9E, 0xC0, 0x8C, 0x45,
                0x75, 0x72, 0x6F, 0x70, 0x65, 0x2F, 0x50, 0x61, 0x72, 0x69, 0x73,
            ])
        );
    }

    #[test]
    fn should_deserialize_a_datetime_with_zoneid() {
        let bytes = Rc::new(RefCell::new(Bytes::from_static(&[
            0xB3, 0x66, 0xCA, 0x55, 0x93, 0xAC, 0x0F, 0xCA, 0x42, 0xEF, 0x9E, 0xC0, 0x8C, 0x45,
            0x75, 0x72, 0x6F, 0x70, 0x65, 0x2F, 0x50, 0x61, 0x72, 0x69, 0x73,
        ])));

        let (datetime, zone_id) = BoltDateTimeZoneId::parse(Version::V4_1, bytes)
            .unwrap()
            .try_into()
            .unwrap();

        assert_eq!(datetime.to_string(), "2015-07-01 08:59:60.123");
        assert_eq!(zone_id, "Europe/Paris");
    }
}
