use super::{
    decode,
    item::{Array, Bytes, Int, Item, Map, Special, Tag, Text},
};
use std::rc::Rc;
use thiserror::Error;

/// Caller-visible load failure classes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("Empty input")]
    NoData,

    #[error("Input ends in the middle of an item")]
    NotEnoughData,

    #[error("Reserved or malformed encoding")]
    Malformed,

    #[error("Allocation failed")]
    MemError,

    #[error("Misplaced break or illegal nesting")]
    Syntax,
}

/// A load failure and the input offset of the item at which it was
/// detected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at offset {position}")]
pub struct Error {
    pub kind: ErrorKind,
    pub position: usize,
}

/// A partially-constructed container awaiting further events.
enum Frame {
    Array {
        array: Array,
        remaining: Option<usize>,
    },
    Map {
        map: Map,
        remaining: Option<usize>,
        key: Option<Rc<Item>>,
    },
    Tag {
        value: u64,
    },
    Bytes(Bytes),
    Text(Text),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    OutOfMemory,
    Syntax,
}

/// Assembles a complete item tree from streaming decode events using a
/// pushdown stack of open containers. Faults are sticky; the load driver
/// checks after every decode step and aborts at the first one.
#[derive(Default)]
struct Builder {
    root: Option<Item>,
    stack: Vec<Frame>,
    fault: Option<Fault>,
}

impl Builder {
    /// Route a completed item: with an empty stack it becomes the root,
    /// otherwise it is appended to the innermost open container, popping
    /// every frame the append completes.
    fn push(&mut self, item: Item) {
        let mut completed = item;
        loop {
            match self.stack.last_mut() {
                None => {
                    self.root = Some(completed);
                    return;
                }
                Some(Frame::Tag { value }) => {
                    let value = *value;
                    self.stack.pop();
                    completed = Item::Tag(Tag::new(value, completed));
                }
                Some(Frame::Array { array, remaining }) => {
                    if array.push(completed).is_err() {
                        self.fault = Some(Fault::OutOfMemory);
                        return;
                    }
                    let done = match remaining {
                        Some(n) => {
                            *n -= 1;
                            *n == 0
                        }
                        None => false,
                    };
                    if !done {
                        return;
                    }
                    let Some(Frame::Array { array, .. }) = self.stack.pop() else {
                        return;
                    };
                    completed = Item::Array(array);
                }
                Some(Frame::Map {
                    map,
                    remaining,
                    key,
                }) => match key.take() {
                    None => {
                        *key = Some(Rc::new(completed));
                        return;
                    }
                    Some(key) => {
                        if map.add(key, completed).is_err() {
                            self.fault = Some(Fault::OutOfMemory);
                            return;
                        }
                        let done = match remaining {
                            Some(n) => {
                                *n -= 1;
                                *n == 0
                            }
                            None => false,
                        };
                        if !done {
                            return;
                        }
                        let Some(Frame::Map { map, .. }) = self.stack.pop() else {
                            return;
                        };
                        completed = Item::Map(map);
                    }
                },
                Some(Frame::Bytes(bytes)) => {
                    if !matches!(&completed, Item::Bytes(chunk) if chunk.is_definite())
                        || bytes.add_chunk(completed).is_err()
                    {
                        self.fault = Some(Fault::Syntax);
                    }
                    return;
                }
                Some(Frame::Text(text)) => {
                    if !matches!(&completed, Item::Text(chunk) if chunk.is_definite())
                        || text.add_chunk(completed).is_err()
                    {
                        self.fault = Some(Fault::Syntax);
                    }
                    return;
                }
            }
        }
    }

    fn start_array(&mut self, size: u64) {
        let Ok(size) = usize::try_from(size) else {
            self.fault = Some(Fault::OutOfMemory);
            return;
        };
        match Array::definite(size) {
            Ok(array) if size == 0 => self.push(Item::Array(array)),
            Ok(array) => self.stack.push(Frame::Array {
                array,
                remaining: Some(size),
            }),
            Err(_) => self.fault = Some(Fault::OutOfMemory),
        }
    }

    fn start_map(&mut self, size: u64) {
        let Ok(size) = usize::try_from(size) else {
            self.fault = Some(Fault::OutOfMemory);
            return;
        };
        match Map::definite(size) {
            Ok(map) if size == 0 => self.push(Item::Map(map)),
            Ok(map) => self.stack.push(Frame::Map {
                map,
                remaining: Some(size),
                key: None,
            }),
            Err(_) => self.fault = Some(Fault::OutOfMemory),
        }
    }

    /// Open a chunked string frame. Chunked strings do not nest, so a
    /// string frame on top of another string frame is a syntax fault.
    fn start_string(&mut self, frame: Frame) {
        if matches!(self.stack.last(), Some(Frame::Bytes(_) | Frame::Text(_))) {
            self.fault = Some(Fault::Syntax);
        } else {
            self.stack.push(frame);
        }
    }
}

impl decode::Callbacks for Builder {
    fn uint8(&mut self, value: u8) {
        self.push(Item::Unsigned(Int::u8(value)))
    }

    fn uint16(&mut self, value: u16) {
        self.push(Item::Unsigned(Int::u16(value)))
    }

    fn uint32(&mut self, value: u32) {
        self.push(Item::Unsigned(Int::u32(value)))
    }

    fn uint64(&mut self, value: u64) {
        self.push(Item::Unsigned(Int::u64(value)))
    }

    fn negint8(&mut self, value: u8) {
        self.push(Item::Negative(Int::u8(value)))
    }

    fn negint16(&mut self, value: u16) {
        self.push(Item::Negative(Int::u16(value)))
    }

    fn negint32(&mut self, value: u32) {
        self.push(Item::Negative(Int::u32(value)))
    }

    fn negint64(&mut self, value: u64) {
        self.push(Item::Negative(Int::u64(value)))
    }

    fn byte_string(&mut self, data: &[u8]) {
        self.push(Item::Bytes(Bytes::definite(data)))
    }

    fn byte_string_start(&mut self) {
        self.start_string(Frame::Bytes(Bytes::indefinite()))
    }

    fn string(&mut self, data: &[u8]) {
        self.push(Item::Text(Text::definite(data)))
    }

    fn string_start(&mut self) {
        self.start_string(Frame::Text(Text::indefinite()))
    }

    fn array_start(&mut self, size: u64) {
        self.start_array(size)
    }

    fn indef_array_start(&mut self) {
        self.stack.push(Frame::Array {
            array: Array::indefinite(),
            remaining: None,
        });
    }

    fn map_start(&mut self, size: u64) {
        self.start_map(size)
    }

    fn indef_map_start(&mut self) {
        self.stack.push(Frame::Map {
            map: Map::indefinite(),
            remaining: None,
            key: None,
        });
    }

    fn tag(&mut self, value: u64) {
        self.stack.push(Frame::Tag { value });
    }

    fn boolean(&mut self, value: bool) {
        self.push(Item::bool(value))
    }

    fn null(&mut self) {
        self.push(Item::null())
    }

    fn undefined(&mut self) {
        self.push(Item::undefined())
    }

    fn simple(&mut self, value: u8) {
        self.push(Item::Special(Special::Simple(value)))
    }

    fn float2(&mut self, value: f32) {
        self.push(Item::Special(Special::Half(value)))
    }

    fn float4(&mut self, value: f32) {
        self.push(Item::Special(Special::Single(value)))
    }

    fn float8(&mut self, value: f64) {
        self.push(Item::Special(Special::Double(value)))
    }

    fn indef_break(&mut self) {
        match self.stack.pop() {
            None => self.fault = Some(Fault::Syntax),
            Some(Frame::Array {
                array,
                remaining: None,
            }) => self.push(Item::Array(array)),
            Some(Frame::Map {
                map,
                remaining: None,
                key: None,
            }) => self.push(Item::Map(map)),
            Some(Frame::Bytes(bytes)) => self.push(Item::Bytes(bytes)),
            Some(Frame::Text(text)) => self.push(Item::Text(text)),
            Some(_) => self.fault = Some(Fault::Syntax),
        }
    }
}

/// Parse exactly one complete item from the front of `data`.
///
/// Trailing bytes after the first complete item are left unread; whether
/// they are acceptable is the caller's decision.
pub fn load(data: &[u8]) -> Result<Item, Error> {
    if data.is_empty() {
        return Err(Error {
            kind: ErrorKind::NoData,
            position: 0,
        });
    }

    let mut builder = Builder::default();
    let mut position = 0;

    loop {
        if position >= data.len() {
            return Err(Error {
                kind: ErrorKind::NotEnoughData,
                position,
            });
        }

        let read = match decode::decode_one(&data[position..], &mut builder) {
            Ok(read) => read,
            Err(decode::Error::NotEnoughData) => {
                return Err(Error {
                    kind: ErrorKind::NotEnoughData,
                    position,
                });
            }
            Err(_) => {
                return Err(Error {
                    kind: ErrorKind::Malformed,
                    position,
                });
            }
        };

        match builder.fault {
            Some(Fault::OutOfMemory) => {
                return Err(Error {
                    kind: ErrorKind::MemError,
                    position,
                });
            }
            Some(Fault::Syntax) => {
                return Err(Error {
                    kind: ErrorKind::Syntax,
                    position,
                });
            }
            None => position += read,
        }

        if builder.stack.is_empty() {
            if let Some(root) = builder.root.take() {
                return Ok(root);
            }
        }
    }
}
