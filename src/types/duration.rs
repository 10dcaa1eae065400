use crate::errors::{Error, Result};
use crate::types::*;
use crate::version::Version;
use bytes::*;
use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

pub const MARKER: u8 = 0xB4;
pub const SIGNATURE: u8 = 0x45;

#[derive(Debug, PartialEq, Clone)]
pub struct BoltDuration {
    months: BoltInteger,
    days: BoltInteger,
    seconds: BoltInteger,
    nanoseconds: BoltInteger,
}

impl BoltDuration {
    pub fn can_parse(_: Version, input: Rc<RefCell<Bytes>>) -> bool {
        let slice = input.borrow();
        slice.len() >= 2 && slice[0] == MARKER && slice[1] == SIGNATURE
    }

    pub fn parse(version: Version, input: Rc<RefCell<Bytes>>) -> Result<BoltDuration> {
        let marker = input.borrow_mut().get_u8();
        let signature = input.borrow_mut().get_u8();
        if marker != MARKER || signature != SIGNATURE {
            return Err(Error::InvalidTypeMarker(
                "invalid duration marker/signature".into(),
            ));
        }

        let months = BoltInteger::parse(version, input.clone())?;
        let days = BoltInteger::parse(version, input.clone())?;
        let seconds = BoltInteger::parse(version, input.clone())?;
        let nanoseconds = BoltInteger::parse(version, input)?;

        Ok(BoltDuration::new(months, days, seconds, nanoseconds))
    }

    pub(crate) fn into_bytes(self, version: Version) -> Result<Bytes> {
        let months = self.months.into_bytes(version)?;
        let days = self.days.into_bytes(version)?;
        let seconds = self.seconds.into_bytes(version)?;
        let nanoseconds = self.nanoseconds.into_bytes(version)?;

        let mut bytes = BytesMut::with_capacity(
            mem::size_of::<u8>() * 2
                + months.len()
                + days.len()
                + seconds.len()
                + nanoseconds.len(),
        );
        bytes.put_u8(MARKER);
        bytes.put_u8(SIGNATURE);
        bytes.put(months);
        bytes.put(days);
        bytes.put(seconds);
        bytes.put(nanoseconds);
        Ok(bytes.freeze())
    }
}

impl BoltDuration {
    pub fn new(
        months: BoltInteger,
        days: BoltInteger,
        seconds: BoltInteger,
        nanoseconds: BoltInteger,
    ) -> Self {
        BoltDuration {
            months,
            days,
            seconds,
            nanoseconds,
        }
    }
}

impl Into<BoltDuration> for std::time::Duration {
    fn into(self) -> BoltDuration {
        let seconds = self.as_secs();
        let nanos = self.subsec_nanos();
        BoltDuration::new(
            0.into(),
            0.into(),
            (seconds as i64).into(),
            (nanos as i64).into(),
        )
    }
}

impl Into<std::time::Duration> for BoltDuration {
    fn into(self) -> std::time::Duration {
        //TODO: clarify month issue
        let seconds =
            self.seconds.value + (self.days.value * 24 * 3600) + (self.months.value * 2_629_800);
        std::time::Duration::new(seconds as u64, self.nanoseconds.value as u32)
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
    fn should_serialize_a_duration() {
        let duration = BoltDuration::new(12.into(), 2.into(), 30.into(), 700.into());

        let bytes: Bytes = duration.into_bytes(Version::V4_1).unwrap();

        assert_eq!(
            bytes,
            Bytes::from_static(&[0xB4, 0x45, 0x0C, 0x02, 0x1E, 0xC9, 0x02, 0xBC,])
        );
    }

    #[test]
    fn should_deserialize_a_duration() {
        let bytes = Rc::new(RefCell::new(Bytes::from_static(&[
            0xB4, 0x45, 0x0C, 0x02, 0x1E, 0xC9, 0x02, 0xBC,
        ])));

        let duration: BoltDuration = BoltDuration::parse(Version::V4_1, bytes).unwrap();

        assert_eq!(duration.months.value, 12);
        assert_eq!(duration.days.value, 2);
        assert_eq!(duration.seconds.value, 30);
        assert_eq!(duration.nanoseconds.value, 700);
    }
}
