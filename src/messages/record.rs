use crate::errors::Result;
use crate::types::{BoltList, BoltType};
use crate::version::Version;
use bytes::Bytes;
use std::cell::RefCell;
use std::rc::Rc;

pub const MARKER: u8 = 0xB1;
pub const SIGNATURE: u8 = 0x71;

#[derive(Debug, PartialEq, Clone)]
pub struct Record {
    pub data: BoltList,
}

impl Record {
    pub fn new(data: BoltList) -> Record {
        Record { data }
    }

    pub(crate) fn can_parse(_version: Version, input: Rc<RefCell<Bytes>>) -> bool {
        let marker: u8 = input.borrow()[0];
        let signature: u8 = input.borrow()[1];
        (MARKER..=(MARKER | 0x0F)).contains(&marker) && signature == SIGNATURE
    }

    pub(crate) fn parse(version: Version, input: Rc<RefCell<Bytes>>) -> Result<Record> {
        let _marker = input.borrow_mut().get_u8();
        let _signature = input.borrow_mut().get_u8();
        Ok(Record {
            data: BoltList::parse(version, input)?,
        })
    }
}

impl IntoIterator for Record {
    type Item = BoltType;
    type IntoIter = std::vec::IntoIter<Self::Item>;
    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl From<Record> for Vec<BoltType> {
    fn from(record: Record) -> Self {
        record.data.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_deserialize_record_message() {
        let bytes = Rc::new(RefCell::new(Bytes::from_static(&[
            MARKER, SIGNATURE, 0x92, 0x81, 0x61, 0x81, 0x62,
        ])));

        let record = Record::parse(Version::V4_1, bytes).unwrap();

        assert_eq!(record.data.len(), 2);
    }
}
