use super::loaders;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("Not enough data for encoded item")]
    NotEnoughData,

    #[error("Reserved additional-information value {0}")]
    ReservedAdditionalInfo(u8),

    #[error("Indefinite-length marker is not valid for major type {0}")]
    InvalidIndefinite(u8),

    #[error("Invalid two-byte simple value {0}")]
    InvalidSimpleValue(u8),
}

/// Streaming decode events, one per encoded data item header.
///
/// Every operation defaults to a no-op, so a consumer only implements the
/// events it cares about. Integer events carry the narrowest width that
/// covers the encoding class of the argument, not of its value.
pub trait Callbacks {
    fn uint8(&mut self, _value: u8) {}
    fn uint16(&mut self, _value: u16) {}
    fn uint32(&mut self, _value: u32) {}
    fn uint64(&mut self, _value: u64) {}

    fn negint8(&mut self, _value: u8) {}
    fn negint16(&mut self, _value: u16) {}
    fn negint32(&mut self, _value: u32) {}
    fn negint64(&mut self, _value: u64) {}

    fn byte_string(&mut self, _data: &[u8]) {}
    fn byte_string_start(&mut self) {}

    fn string(&mut self, _data: &[u8]) {}
    fn string_start(&mut self) {}

    fn array_start(&mut self, _size: u64) {}
    fn indef_array_start(&mut self) {}

    fn map_start(&mut self, _size: u64) {}
    fn indef_map_start(&mut self) {}

    fn tag(&mut self, _value: u64) {}

    fn boolean(&mut self, _value: bool) {}
    fn null(&mut self) {}
    fn undefined(&mut self) {}
    fn simple(&mut self, _value: u8) {}

    fn float2(&mut self, _value: f32) {}
    fn float4(&mut self, _value: f32) {}
    fn float8(&mut self, _value: f64) {}

    fn indef_break(&mut self) {}
}

fn parse_uint_minor(minor: u8, data: &[u8]) -> Result<(u64, usize), Error> {
    match minor {
        24 => Ok((loaders::load_u8(data)? as u64, 1)),
        25 => Ok((loaders::load_u16(data)? as u64, 2)),
        26 => Ok((loaders::load_u32(data)? as u64, 4)),
        27 => Ok((loaders::load_u64(data)?, 8)),
        minor if minor < 24 => Ok((minor as u64, 0)),
        minor => Err(Error::ReservedAdditionalInfo(minor)),
    }
}

fn parse_data_minor(minor: u8, data: &[u8]) -> Result<(&[u8], usize), Error> {
    let (data_len, len) = parse_uint_minor(minor, data)?;
    match (len as u64).checked_add(data_len) {
        Some(end) if end <= data.len() as u64 => Ok((&data[len..end as usize], end as usize)),
        _ => Err(Error::NotEnoughData),
    }
}

/// Decode the next data item header from the front of `data`, invoking
/// exactly one callback, and return the number of bytes consumed.
///
/// A string header consumes its immediate payload as well; container
/// contents are left in the buffer for subsequent calls. On error no
/// callback is invoked and nothing is consumed.
pub fn decode_one<C: Callbacks>(data: &[u8], callbacks: &mut C) -> Result<usize, Error> {
    let Some(&ib) = data.first() else {
        return Err(Error::NotEnoughData);
    };
    match (ib >> 5, ib & 0x1F) {
        (0, 31) => Err(Error::InvalidIndefinite(0)),
        (0, minor) => {
            let (value, len) = parse_uint_minor(minor, &data[1..])?;
            match minor {
                27 => callbacks.uint64(value),
                26 => callbacks.uint32(value as u32),
                25 => callbacks.uint16(value as u16),
                _ => callbacks.uint8(value as u8),
            }
            Ok(len + 1)
        }
        (1, 31) => Err(Error::InvalidIndefinite(1)),
        (1, minor) => {
            let (value, len) = parse_uint_minor(minor, &data[1..])?;
            match minor {
                27 => callbacks.negint64(value),
                26 => callbacks.negint32(value as u32),
                25 => callbacks.negint16(value as u16),
                _ => callbacks.negint8(value as u8),
            }
            Ok(len + 1)
        }
        (2, 31) => {
            callbacks.byte_string_start();
            Ok(1)
        }
        (2, minor) => {
            let (chunk, len) = parse_data_minor(minor, &data[1..])?;
            callbacks.byte_string(chunk);
            Ok(len + 1)
        }
        (3, 31) => {
            callbacks.string_start();
            Ok(1)
        }
        (3, minor) => {
            let (chunk, len) = parse_data_minor(minor, &data[1..])?;
            callbacks.string(chunk);
            Ok(len + 1)
        }
        (4, 31) => {
            callbacks.indef_array_start();
            Ok(1)
        }
        (4, minor) => {
            let (size, len) = parse_uint_minor(minor, &data[1..])?;
            callbacks.array_start(size);
            Ok(len + 1)
        }
        (5, 31) => {
            callbacks.indef_map_start();
            Ok(1)
        }
        (5, minor) => {
            let (size, len) = parse_uint_minor(minor, &data[1..])?;
            callbacks.map_start(size);
            Ok(len + 1)
        }
        (6, 31) => Err(Error::InvalidIndefinite(6)),
        (6, minor) => {
            let (value, len) = parse_uint_minor(minor, &data[1..])?;
            callbacks.tag(value);
            Ok(len + 1)
        }
        (7, 20) => {
            callbacks.boolean(false);
            Ok(1)
        }
        (7, 21) => {
            callbacks.boolean(true);
            Ok(1)
        }
        (7, 22) => {
            callbacks.null();
            Ok(1)
        }
        (7, 23) => {
            callbacks.undefined();
            Ok(1)
        }
        (7, minor @ 0..=19) => {
            callbacks.simple(minor);
            Ok(1)
        }
        (7, 24) => {
            let value = loaders::load_u8(&data[1..])?;
            if value < 32 {
                return Err(Error::InvalidSimpleValue(value));
            }
            callbacks.simple(value);
            Ok(2)
        }
        (7, 25) => {
            let value = loaders::load_float2(&data[1..])?;
            callbacks.float2(value);
            Ok(3)
        }
        (7, 26) => {
            let value = loaders::load_float4(&data[1..])?;
            callbacks.float4(value);
            Ok(5)
        }
        (7, 27) => {
            let value = loaders::load_float8(&data[1..])?;
            callbacks.float8(value);
            Ok(9)
        }
        (7, 31) => {
            callbacks.indef_break();
            Ok(1)
        }
        (7, minor) => Err(Error::ReservedAdditionalInfo(minor)),
        (8.., _) => unreachable!(),
    }
}
