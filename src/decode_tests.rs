#![cfg(test)]
use super::decode::*;
use hex_literal::hex;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Negint8(u8),
    Negint16(u16),
    Negint32(u32),
    Negint64(u64),
    Bytes(Vec<u8>),
    BytesStart,
    Text(Vec<u8>),
    TextStart,
    ArrayStart(u64),
    IndefArrayStart,
    MapStart(u64),
    IndefMapStart,
    Tag(u64),
    Bool(bool),
    Null,
    Undefined,
    Simple(u8),
    Float2(f32),
    Float4(f32),
    Float8(f64),
    Break,
}

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
}

impl Callbacks for Recorder {
    fn uint8(&mut self, value: u8) {
        self.events.push(Event::Uint8(value))
    }

    fn uint16(&mut self, value: u16) {
        self.events.push(Event::Uint16(value))
    }

    fn uint32(&mut self, value: u32) {
        self.events.push(Event::Uint32(value))
    }

    fn uint64(&mut self, value: u64) {
        self.events.push(Event::Uint64(value))
    }

    fn negint8(&mut self, value: u8) {
        self.events.push(Event::Negint8(value))
    }

    fn negint16(&mut self, value: u16) {
        self.events.push(Event::Negint16(value))
    }

    fn negint32(&mut self, value: u32) {
        self.events.push(Event::Negint32(value))
    }

    fn negint64(&mut self, value: u64) {
        self.events.push(Event::Negint64(value))
    }

    fn byte_string(&mut self, data: &[u8]) {
        self.events.push(Event::Bytes(data.to_vec()))
    }

    fn byte_string_start(&mut self) {
        self.events.push(Event::BytesStart)
    }

    fn string(&mut self, data: &[u8]) {
        self.events.push(Event::Text(data.to_vec()))
    }

    fn string_start(&mut self) {
        self.events.push(Event::TextStart)
    }

    fn array_start(&mut self, size: u64) {
        self.events.push(Event::ArrayStart(size))
    }

    fn indef_array_start(&mut self) {
        self.events.push(Event::IndefArrayStart)
    }

    fn map_start(&mut self, size: u64) {
        self.events.push(Event::MapStart(size))
    }

    fn indef_map_start(&mut self) {
        self.events.push(Event::IndefMapStart)
    }

    fn tag(&mut self, value: u64) {
        self.events.push(Event::Tag(value))
    }

    fn boolean(&mut self, value: bool) {
        self.events.push(Event::Bool(value))
    }

    fn null(&mut self) {
        self.events.push(Event::Null)
    }

    fn undefined(&mut self) {
        self.events.push(Event::Undefined)
    }

    fn simple(&mut self, value: u8) {
        self.events.push(Event::Simple(value))
    }

    fn float2(&mut self, value: f32) {
        self.events.push(Event::Float2(value))
    }

    fn float4(&mut self, value: f32) {
        self.events.push(Event::Float4(value))
    }

    fn float8(&mut self, value: f64) {
        self.events.push(Event::Float8(value))
    }

    fn indef_break(&mut self) {
        self.events.push(Event::Break)
    }
}

fn decode_single(data: &[u8]) -> (Event, usize) {
    let mut recorder = Recorder::default();
    let read = decode_one(data, &mut recorder).unwrap();
    assert_eq!(recorder.events.len(), 1);
    (recorder.events.remove(0), read)
}

fn decode_err(data: &[u8]) -> Error {
    let mut recorder = Recorder::default();
    let e = decode_one(data, &mut recorder).unwrap_err();
    assert!(recorder.events.is_empty());
    e
}

#[test]
fn unsigned_widths() {
    assert_eq!(decode_single(&hex!("00")), (Event::Uint8(0), 1));
    assert_eq!(decode_single(&hex!("0a")), (Event::Uint8(10), 1));
    assert_eq!(decode_single(&hex!("17")), (Event::Uint8(23), 1));
    assert_eq!(decode_single(&hex!("1818")), (Event::Uint8(24), 2));
    assert_eq!(decode_single(&hex!("1903e8")), (Event::Uint16(1000), 3));
    assert_eq!(
        decode_single(&hex!("1a000f4240")),
        (Event::Uint32(1_000_000), 5)
    );
    assert_eq!(
        decode_single(&hex!("1b000000e8d4a51000")),
        (Event::Uint64(1_000_000_000_000), 9)
    );
    assert_eq!(
        decode_single(&hex!("1bffffffffffffffff")),
        (Event::Uint64(u64::MAX), 9)
    );
    // The width tracks the encoding class, not the smallest width that
    // would fit the value
    assert_eq!(decode_single(&hex!("190005")), (Event::Uint16(5), 3));
    assert_eq!(decode_single(&hex!("1a00000005")), (Event::Uint32(5), 5));
}

#[test]
fn negative_widths() {
    assert_eq!(decode_single(&hex!("20")), (Event::Negint8(0), 1));
    assert_eq!(decode_single(&hex!("29")), (Event::Negint8(9), 1));
    assert_eq!(decode_single(&hex!("3863")), (Event::Negint8(99), 2));
    assert_eq!(decode_single(&hex!("3903e7")), (Event::Negint16(999), 3));
    assert_eq!(
        decode_single(&hex!("3a000f423f")),
        (Event::Negint32(999_999), 5)
    );
    assert_eq!(
        decode_single(&hex!("3bffffffffffffffff")),
        (Event::Negint64(u64::MAX), 9)
    );
}

#[test]
fn strings() {
    assert_eq!(decode_single(&hex!("40")), (Event::Bytes(vec![]), 1));
    assert_eq!(
        decode_single(&hex!("4401020304")),
        (Event::Bytes(hex!("01020304").to_vec()), 5)
    );
    assert_eq!(
        decode_single(&hex!("5803010203")),
        (Event::Bytes(hex!("010203").to_vec()), 5)
    );
    assert_eq!(decode_single(&hex!("60")), (Event::Text(vec![]), 1));
    assert_eq!(
        decode_single(&hex!("6449455446")),
        (Event::Text(b"IETF".to_vec()), 5)
    );
    assert_eq!(decode_single(&hex!("5f")), (Event::BytesStart, 1));
    assert_eq!(decode_single(&hex!("7f")), (Event::TextStart, 1));
    // Only the chunk itself is consumed, not whatever follows it
    assert_eq!(
        decode_single(&hex!("42010203")),
        (Event::Bytes(hex!("0102").to_vec()), 3)
    );
}

#[test]
fn containers_and_tags() {
    assert_eq!(decode_single(&hex!("80")), (Event::ArrayStart(0), 1));
    assert_eq!(decode_single(&hex!("83010203")), (Event::ArrayStart(3), 1));
    assert_eq!(decode_single(&hex!("9819")), (Event::ArrayStart(25), 2));
    assert_eq!(decode_single(&hex!("9f")), (Event::IndefArrayStart, 1));
    assert_eq!(decode_single(&hex!("a2")), (Event::MapStart(2), 1));
    assert_eq!(decode_single(&hex!("b820")), (Event::MapStart(32), 2));
    assert_eq!(decode_single(&hex!("bf")), (Event::IndefMapStart, 1));
    assert_eq!(decode_single(&hex!("c0")), (Event::Tag(0), 1));
    assert_eq!(decode_single(&hex!("d818")), (Event::Tag(24), 2));
    assert_eq!(
        decode_single(&hex!("db0000000100000000")),
        (Event::Tag(1 << 32), 9)
    );
    assert_eq!(decode_single(&hex!("ff")), (Event::Break, 1));
}

#[test]
fn simple_values_and_floats() {
    assert_eq!(decode_single(&hex!("f4")), (Event::Bool(false), 1));
    assert_eq!(decode_single(&hex!("f5")), (Event::Bool(true), 1));
    assert_eq!(decode_single(&hex!("f6")), (Event::Null, 1));
    assert_eq!(decode_single(&hex!("f7")), (Event::Undefined, 1));
    assert_eq!(decode_single(&hex!("f0")), (Event::Simple(16), 1));
    assert_eq!(decode_single(&hex!("f820")), (Event::Simple(32), 2));
    assert_eq!(decode_single(&hex!("f8ff")), (Event::Simple(255), 2));
    assert_eq!(decode_single(&hex!("f90000")), (Event::Float2(0.0), 3));
    assert_eq!(decode_single(&hex!("f93c00")), (Event::Float2(1.0), 3));
    assert_eq!(decode_single(&hex!("f93e00")), (Event::Float2(1.5), 3));
    assert_eq!(decode_single(&hex!("f97bff")), (Event::Float2(65504.0), 3));
    assert_eq!(decode_single(&hex!("f9c400")), (Event::Float2(-4.0), 3));
    // Subnormals are scaled into binary32
    assert_eq!(
        decode_single(&hex!("f90001")),
        (Event::Float2(2f32.powi(-24)), 3)
    );
    assert_eq!(
        decode_single(&hex!("f97c00")),
        (Event::Float2(f32::INFINITY), 3)
    );
    assert_eq!(
        decode_single(&hex!("f9fc00")),
        (Event::Float2(f32::NEG_INFINITY), 3)
    );
    assert!(matches!(
        decode_single(&hex!("f97e00")),
        (Event::Float2(v), 3) if v.is_nan()
    ));
    assert_eq!(
        decode_single(&hex!("fa47c35000")),
        (Event::Float4(100000.0), 5)
    );
    assert_eq!(
        decode_single(&hex!("fa7f7fffff")),
        (Event::Float4(f32::MAX), 5)
    );
    assert_eq!(
        decode_single(&hex!("fb3ff199999999999a")),
        (Event::Float8(1.1), 9)
    );
    assert_eq!(
        decode_single(&hex!("fbc010666666666666")),
        (Event::Float8(-4.1), 9)
    );
}

#[test]
fn reserved_encodings() {
    // Reserved additional-information values on every major type
    for ib in [
        0x1c, 0x1d, 0x1e, 0x3c, 0x3d, 0x3e, 0x5c, 0x7c, 0x9c, 0xbc, 0xdc, 0xfc, 0xfd, 0xfe,
    ] {
        assert!(
            matches!(decode_err(&[ib]), Error::ReservedAdditionalInfo(_)),
            "initial byte {ib:#04x}"
        );
    }
    // Indefinite-length marker on types that do not admit one
    assert_eq!(decode_err(&hex!("1f")), Error::InvalidIndefinite(0));
    assert_eq!(decode_err(&hex!("3f")), Error::InvalidIndefinite(1));
    assert_eq!(decode_err(&hex!("df")), Error::InvalidIndefinite(6));
    // Two-byte simple values overlapping the one-byte range
    assert_eq!(decode_err(&hex!("f800")), Error::InvalidSimpleValue(0));
    assert_eq!(decode_err(&hex!("f814")), Error::InvalidSimpleValue(20));
    assert_eq!(decode_err(&hex!("f81f")), Error::InvalidSimpleValue(31));
}

#[test]
fn not_enough_data() {
    assert_eq!(decode_err(&[]), Error::NotEnoughData);
    for data in [
        &hex!("18") as &[u8],
        &hex!("1903"),
        &hex!("1a000f42"),
        &hex!("1b00000000000000"),
        &hex!("38"),
        &hex!("44010203"),
        &hex!("5803"),
        &hex!("62c3"),
        &hex!("7801"),
        &hex!("98"),
        &hex!("b9ff"),
        &hex!("d8"),
        &hex!("f8"),
        &hex!("f900"),
        &hex!("fa000000"),
        &hex!("fb00000000000000"),
    ] {
        assert_eq!(decode_err(data), Error::NotEnoughData, "{data:02x?}");
    }
}
