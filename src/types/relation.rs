use crate::errors::*;
use crate::types::*;
use crate::version::Version;
use bytes::*;
use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

pub const REL_MARKER: u8 = 0xB5;
pub const REL_SIGNATURE: u8 = 0x52;

pub const UNBOUND_REL_MARKER: u8 = 0xB3;
pub const UNBOUND_REL_SIGNATURE: u8 = 0x72;

#[derive(Debug, PartialEq, Clone)]
pub struct BoltRelation {
    pub id: BoltInteger,
    pub start_node_id: BoltInteger,
    pub end_node_id: BoltInteger,
    pub typ: BoltString,
    pub properties: BoltMap,
}

#[derive(Debug, PartialEq, Clone)]
pub struct BoltUnboundedRelation {
    pub id: BoltInteger,
    pub typ: BoltString,
    pub properties: BoltMap,
}

impl BoltUnboundedRelation {
    pub fn new(id: BoltInteger, typ: BoltString, properties: BoltMap) -> Self {
        BoltUnboundedRelation {
            id,
            typ,
            properties,
        }
    }
}

impl BoltRelation {
    pub fn get<T: std::convert::TryFrom<BoltType>>(&self, key: &str) -> Option<T> {
        self.properties.get(key)
    }

    pub fn can_parse(_: Version, input: Rc<RefCell<Bytes>>) -> bool {
        let slice = input.borrow();
        slice.len() >= 2 && slice[0] == REL_MARKER && slice[1] == REL_SIGNATURE
    }

    pub fn parse(version: Version, input: Rc<RefCell<Bytes>>) -> Result<BoltRelation> {
        let marker = input.borrow_mut().get_u8();
        let signature = input.borrow_mut().get_u8();
        if marker != REL_MARKER || signature != REL_SIGNATURE {
            return Err(Error::InvalidTypeMarker(
                "invalid relationship marker/signature".into(),
            ));
        }

        let id = BoltInteger::parse(version, input.clone())?;
        let start_node_id = BoltInteger::parse(version, input.clone())?;
        let end_node_id = BoltInteger::parse(version, input.clone())?;
        let typ = BoltString::parse(version, input.clone())?;
        let properties = BoltMap::parse(version, input)?;

        Ok(BoltRelation {
            id,
            start_node_id,
            end_node_id,
            typ,
            properties,
        })
    }

    pub(crate) fn into_bytes(self, version: Version) -> Result<Bytes> {
        let id = self.id.into_bytes(version)?;
        let start_node_id = self.start_node_id.into_bytes(version)?;
        let end_node_id = self.end_node_id.into_bytes(version)?;
        let typ = self.typ.into_bytes(version)?;
        let properties = self.properties.into_bytes(version)?;

        let mut bytes = BytesMut::with_capacity(
            mem::size_of::<u8>() * 2
                + id.len()
                + start_node_id.len()
                + end_node_id.len()
                + typ.len()
                + properties.len(),
        );
        bytes.put_u8(REL_MARKER);
        bytes.put_u8(REL_SIGNATURE);
        bytes.put(id);
        bytes.put(start_node_id);
        bytes.put(end_node_id);
        bytes.put(typ);
        bytes.put(properties);
        Ok(bytes.freeze())
    }
}

impl BoltUnboundedRelation {
    pub fn get<T: std::convert::TryFrom<BoltType>>(&self, key: &str) -> Option<T> {
        self.properties.get(key)
    }

    pub fn can_parse(_: Version, input: Rc<RefCell<Bytes>>) -> bool {
        let slice = input.borrow();
        slice.len() >= 2 && slice[0] == UNBOUND_REL_MARKER && slice[1] == UNBOUND_REL_SIGNATURE
    }

    pub fn parse(version: Version, input: Rc<RefCell<Bytes>>) -> Result<BoltUnboundedRelation> {
        let marker = input.borrow_mut().get_u8();
        let signature = input.borrow_mut().get_u8();
        if marker != UNBOUND_REL_MARKER || signature != UNBOUND_REL_SIGNATURE {
            return Err(Error::InvalidTypeMarker(
                "invalid unbounded relationship marker/signature".into(),
            ));
        }

        let id = BoltInteger::parse(version, input.clone())?;
        let typ = BoltString::parse(version, input.clone())?;
        let properties = BoltMap::parse(version, input)?;

        Ok(BoltUnboundedRelation::new(id, typ, properties))
    }

    pub(crate) fn into_bytes(self, version: Version) -> Result<Bytes> {
        let id = self.id.into_bytes(version)?;
        let typ = self.typ.into_bytes(version)?;
        let properties = self.properties.into_bytes(version)?;

        let mut bytes = BytesMut::with_capacity(
            mem::size_of::<u8>() * 2 + id.len() + typ.len() + properties.len(),
        );
        bytes.put_u8(UNBOUND_REL_MARKER);
        bytes.put_u8(UNBOUND_REL_SIGNATURE);
        bytes.put(id);
        bytes.put(typ);
        bytes.put(properties);
        Ok(bytes.freeze())
    }
}

impl Into<BoltType> for BoltRelation {
    fn into(self) -> BoltType {
        BoltType::Relation(self)
    }
}

impl Into<BoltType> for BoltUnboundedRelation {
    fn into(self) -> BoltType {
        BoltType::UnboundedRelation(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn should_serialize_a_relation() {
        let id = BoltInteger::new(42);
        let start_node_id = BoltInteger::new(1);
        let end_node_id = BoltInteger::new(2);
        let typ = BoltString::new("rel");
        let properties = vec![("name".into(), "Mark".into())].into_iter().collect();

        let relation = BoltRelation {
            id,
            start_node_id,
            end_node_id,
            typ,
            properties,
        };

        let bytes: Bytes = relation.into_bytes(Version::V4_1).unwrap();

        assert_eq!(
            bytes,
            Bytes::from_static(&[
                0xB5, 0x52, 0x2A, 0x01, 0x02, 0x83, 0x72, 0x65, 0x6C, 0xA1, 0x84, 0x6E, 0x61, 0x6D,
                0x65, 0x84, 0x4D, 0x61, 0x72, 0x6B,
            ])
        );
    }

    #[test]
    fn should_deserialize_a_relation() {
        let input = Rc::new(RefCell::new(Bytes::from_static(&[
            0xB5, 0x52, 0x2A, 0x01, 0x02, 0x83, 0x72, 0x65, 0x6C, 0xA1, 0x84, 0x6E, 0x61, 0x6D,
            0x65, 0x84, 0x4D, 0x61, 0x72, 0x6B,
        ])));

        let relation: BoltRelation = BoltRelation::parse(Version::V4_1, input).unwrap();

        assert_eq!(relation.id, BoltInteger::new(42));
        assert_eq!(relation.start_node_id, BoltInteger::new(1));
        assert_eq!(relation.end_node_id, BoltInteger::new(2));
        assert_eq!(relation.typ, BoltString::new("rel"));
        assert_eq!(
            relation.properties,
            vec![("name".into(), "Mark".into())].into_iter().collect()
        );
    }

    #[test]
    fn should_serialize_an_unbounded_relation() {
        let id = BoltInteger::new(42);
        let typ = BoltString::new("rel");
        let properties = vec![("name".into(), "Mark".into())].into_iter().collect();
        let relation = BoltUnboundedRelation::new(id, typ, properties);

        let bytes: Bytes = relation.into_bytes(Version::V4_1).unwrap();

        assert_eq!(
            bytes,
            Bytes::from_static(&[
                0xB3, 0x72, 0x2A, 0x83, 0x72, 0x65, 0x6C, 0xA1, 0x84, 0x6E, 0x61, 0x6D, 0x65, 0x84,
                0x4D, 0x61, 0x72, 0x6B,
            ])
        );
    }

    #[test]
    fn should_deserialize_an_unbounded_relation() {
        let input = Rc::new(RefCell::new(Bytes::from_static(&[
            0xB3, 0x72, 0x2A, 0x83, 0x72, 0x65, 0x6C, 0xA1, 0x84, 0x6E, 0x61, 0x6D, 0x65, 0x84,
            0x4D, 0x61, 0x72, 0x6B,
        ])));

        let relation: BoltUnboundedRelation =
            BoltUnboundedRelation::parse(Version::V4_1, input).unwrap();

        assert_eq!(relation.id, BoltInteger::new(42));
        assert_eq!(relation.typ, BoltString::new("rel"));
        assert_eq!(
            relation.properties,
            vec![("name".into(), "Mark".into())].into_iter().collect()
        );
    }
}
