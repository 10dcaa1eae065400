use crate::errors::*;
use crate::types::*;
use crate::version::Version;
use bytes::*;
use std::cell::RefCell;
use std::convert::{TryFrom, TryInto};
use std::mem;
use std::rc::Rc;

pub const MARKER_2D: u8 = 0xB3;
pub const SIGNATURE_2D: u8 = 0x58;

pub const MARKER_3D: u8 = 0xB4;
pub const SIGNATURE_3D: u8 = 0x59;

#[derive(Debug, PartialEq, Clone)]
pub struct BoltPoint2D {
    pub sr_id: BoltInteger,
    pub x: BoltFloat,
    pub y: BoltFloat,
}

#[derive(Debug, PartialEq, Clone)]
pub struct BoltPoint3D {
    pub sr_id: BoltInteger,
    pub x: BoltFloat,
    pub y: BoltFloat,
    pub z: BoltFloat,
}

impl BoltPoint2D {
    pub fn can_parse(_: Version, input: Rc<RefCell<Bytes>>) -> bool {
        let slice = input.borrow();
        slice.len() >= 2 && slice[0] == MARKER_2D && slice[1] == SIGNATURE_2D
    }

    pub fn parse(version: Version, input: Rc<RefCell<Bytes>>) -> Result<BoltPoint2D> {
        let marker = input.borrow_mut().get_u8();
        let signature = input.borrow_mut().get_u8();
        if marker != MARKER_2D || signature != SIGNATURE_2D {
            return Err(Error::InvalidTypeMarker(
                "invalid 2d point marker/signature".into(),
            ));
        }

        let sr_id = BoltInteger::parse(version, input.clone())?;
        let x = BoltFloat::try_from(input.clone())?;
        let y = BoltFloat::try_from(input)?;

        Ok(BoltPoint2D { sr_id, x, y })
    }

    pub(crate) fn into_bytes(self, version: Version) -> Result<Bytes> {
        let sr_id = self.sr_id.into_bytes(version)?;
        let x: Bytes = self.x.try_into()?;
        let y: Bytes = self.y.try_into()?;

        let mut bytes = BytesMut::with_capacity(
            mem::size_of::<u8>() * 2 + sr_id.len() + x.len() + y.len(),
        );
        bytes.put_u8(MARKER_2D);
        bytes.put_u8(SIGNATURE_2D);
        bytes.put(sr_id);
        bytes.put(x);
        bytes.put(y);
        Ok(bytes.freeze())
    }
}

impl BoltPoint3D {
    pub fn can_parse(_: Version, input: Rc<RefCell<Bytes>>) -> bool {
        let slice = input.borrow();
        slice.len() >= 2 && slice[0] == MARKER_3D && slice[1] == SIGNATURE_3D
    }

    pub fn parse(version: Version, input: Rc<RefCell<Bytes>>) -> Result<BoltPoint3D> {
        let marker = input.borrow_mut().get_u8();
        let signature = input.borrow_mut().get_u8();
        if marker != MARKER_3D || signature != SIGNATURE_3D {
            return Err(Error::InvalidTypeMarker(
                "invalid 3d point marker/signature".into(),
            ));
        }

        let sr_id = BoltInteger::parse(version, input.clone())?;
        let x = BoltFloat::try_from(input.clone())?;
        let y = BoltFloat::try_from(input.clone())?;
        let z = BoltFloat::try_from(input)?;

        Ok(BoltPoint3D { sr_id, x, y, z })
    }

    pub(crate) fn into_bytes(self, version: Version) -> Result<Bytes> {
        let sr_id = self.sr_id.into_bytes(version)?;
        let x: Bytes = self.x.try_into()?;
        let y: Bytes = self.y.try_into()?;
        let z: Bytes = self.z.try_into()?;

        let mut bytes = BytesMut::with_capacity(
            mem::size_of::<u8>() * 2 + sr_id.len() + x.len() + y.len() + z.len(),
        );
        bytes.put_u8(MARKER_3D);
        bytes.put_u8(SIGNATURE_3D);
        bytes.put(sr_id);
        bytes.put(x);
        bytes.put(y);
        bytes.put(z);
        Ok(bytes.freeze())
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
    fn should_serialize_2d_point() {
        let sr_id = BoltInteger::new(42);
        let x = BoltFloat::new(1.0);
        let y = BoltFloat::new(2.0);

        let point = BoltPoint2D { sr_id, x, y };

        let bytes: Bytes = point.into_bytes(Version::V4_1).unwrap();

        assert_eq!(
            &bytes[..],
            Bytes::from_static(&[
                0xB3, 0x58, 0x2A, 0xC1, 0x3F, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC1, 0x40,
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            ])
        );
    }

    #[test]
    fn should_deserialize_2d_point() {
        let input = Rc::new(RefCell::new(Bytes::from_static(&[
            0xB3, 0x58, 0x2A, 0xC1, 0x3F, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC1, 0x40,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ])));

        let point: BoltPoint2D = BoltPoint2D::parse(Version::V4_1, input).unwrap();

        assert_eq!(point.sr_id, BoltInteger::new(42));
        assert_eq!(point.x, BoltFloat::new(1.0));
        assert_eq!(point.y, BoltFloat::new(2.0));
    }

    #[test]
    fn should_serialize_3d_point() {
        let sr_id = BoltInteger::new(42);
        let x = BoltFloat::new(1.0);
        let y = BoltFloat::new(2.0);
        let z = BoltFloat::new(3.0);

        let point = BoltPoint3D { sr_id, x, y, z };

        let bytes: Bytes = point.into_bytes(Version::V4_1).unwrap();

        assert_eq!(
            &bytes[..],
            Bytes::from_static(&[
                0xB4, 0x59, 0x2A, 0xC1, 0x3F, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC1, 0x40,
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC1, 0x40, 0x08, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00,
            ])
        );
    }

    #[test]
    fn should_deserialize_3d_point() {
        let input = Rc::new(RefCell::new(Bytes::from_static(&[
            0xB4, 0x59, 0x2A, 0xC1, 0x3F, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC1, 0x40,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC1, 0x40, 0x08, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ])));

        let point: BoltPoint3D = BoltPoint3D::parse(Version::V4_1, input).unwrap();

        assert_eq!(point.sr_id, BoltInteger::new(42));
        assert_eq!(point.x, BoltFloat::new(1.0));
        assert_eq!(point.y, BoltFloat::new(2.0));
        assert_eq!(point.z, BoltFloat::new(3.0));
    }
}
