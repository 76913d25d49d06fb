use std::{collections::TryReserveError, rc::Rc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Definite-length container already holds its declared number of entries")]
    Full,

    #[error("Chunked strings only accept definite-length chunks of the same type")]
    InvalidChunk,

    #[error(transparent)]
    OutOfMemory(#[from] TryReserveError),
}

/// Width of the encoded argument of an integer item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    U8,
    U16,
    U32,
    U64,
}

/// An integer payload together with its encoded width.
///
/// For negative items the stored value is the raw magnitude `m`; the
/// logical value is `-1 - m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Int {
    width: IntWidth,
    value: u64,
}

impl Int {
    pub fn u8(value: u8) -> Self {
        Self {
            width: IntWidth::U8,
            value: value as u64,
        }
    }

    pub fn u16(value: u16) -> Self {
        Self {
            width: IntWidth::U16,
            value: value as u64,
        }
    }

    pub fn u32(value: u32) -> Self {
        Self {
            width: IntWidth::U32,
            value: value as u64,
        }
    }

    pub fn u64(value: u64) -> Self {
        Self {
            width: IntWidth::U64,
            value,
        }
    }

    pub fn width(&self) -> IntWidth {
        self.width
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

/// A byte string: a definite run of bytes, or an ordered sequence of
/// definite chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct Bytes {
    repr: BytesRepr,
}

#[derive(Debug, Clone, PartialEq)]
enum BytesRepr {
    Definite(Vec<u8>),
    Chunked(Vec<Rc<Item>>),
}

impl Bytes {
    /// A definite-length byte string taking ownership of `data`.
    pub fn definite(data: impl Into<Vec<u8>>) -> Self {
        Self {
            repr: BytesRepr::Definite(data.into()),
        }
    }

    /// An empty indefinite-length (chunked) byte string.
    pub fn indefinite() -> Self {
        Self {
            repr: BytesRepr::Chunked(Vec::new()),
        }
    }

    pub fn is_definite(&self) -> bool {
        matches!(self.repr, BytesRepr::Definite(_))
    }

    /// Payload length in bytes, summed over chunks when chunked.
    pub fn len(&self) -> usize {
        match &self.repr {
            BytesRepr::Definite(data) => data.len(),
            BytesRepr::Chunked(chunks) => chunk_bytes(chunks).map(<[u8]>::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The backing buffer of a definite string.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.repr {
            BytesRepr::Definite(data) => Some(data),
            BytesRepr::Chunked(_) => None,
        }
    }

    pub fn chunks(&self) -> &[Rc<Item>] {
        match &self.repr {
            BytesRepr::Definite(_) => &[],
            BytesRepr::Chunked(chunks) => chunks,
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks().len()
    }

    /// Append a chunk, adopting the caller's reference. The chunk must be a
    /// definite-length byte string, and `self` must be chunked.
    pub fn add_chunk(&mut self, chunk: impl Into<Rc<Item>>) -> Result<(), Error> {
        let chunk = chunk.into();
        let BytesRepr::Chunked(chunks) = &mut self.repr else {
            return Err(Error::Full);
        };
        match chunk.as_ref() {
            Item::Bytes(b) if b.is_definite() => {
                chunks.push(chunk);
                Ok(())
            }
            _ => Err(Error::InvalidChunk),
        }
    }

    fn copy(&self) -> Result<Self, Error> {
        Ok(match &self.repr {
            BytesRepr::Definite(data) => Bytes::definite(data.clone()),
            BytesRepr::Chunked(chunks) => Bytes {
                repr: BytesRepr::Chunked(copy_chunks(chunks)?),
            },
        })
    }

    fn flatten(&self) -> Self {
        match &self.repr {
            BytesRepr::Definite(data) => Bytes::definite(data.clone()),
            BytesRepr::Chunked(chunks) => {
                let mut data = Vec::with_capacity(self.len());
                for chunk in chunk_bytes(chunks) {
                    data.extend_from_slice(chunk);
                }
                Bytes::definite(data)
            }
        }
    }
}

fn chunk_bytes(chunks: &[Rc<Item>]) -> impl Iterator<Item = &[u8]> + '_ {
    chunks.iter().filter_map(|chunk| match chunk.as_ref() {
        Item::Bytes(b) => b.data(),
        _ => None,
    })
}

/// A text string. The payload is raw UTF-8 bytes, not validated beyond
/// their length; the codepoint count tallies UTF-8 lead bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    repr: TextRepr,
}

#[derive(Debug, Clone, PartialEq)]
enum TextRepr {
    Definite { data: Vec<u8>, codepoints: usize },
    Chunked(Vec<Rc<Item>>),
}

impl Text {
    /// A definite-length text string taking ownership of `data`.
    pub fn definite(data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        let codepoints = count_codepoints(&data);
        Self {
            repr: TextRepr::Definite { data, codepoints },
        }
    }

    /// An empty indefinite-length (chunked) text string.
    pub fn indefinite() -> Self {
        Self {
            repr: TextRepr::Chunked(Vec::new()),
        }
    }

    pub fn is_definite(&self) -> bool {
        matches!(self.repr, TextRepr::Definite { .. })
    }

    /// Payload length in bytes, summed over chunks when chunked.
    pub fn len(&self) -> usize {
        match &self.repr {
            TextRepr::Definite { data, .. } => data.len(),
            TextRepr::Chunked(chunks) => text_chunks(chunks).map(Text::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn codepoint_count(&self) -> usize {
        match &self.repr {
            TextRepr::Definite { codepoints, .. } => *codepoints,
            TextRepr::Chunked(chunks) => text_chunks(chunks).map(Text::codepoint_count).sum(),
        }
    }

    /// The backing buffer of a definite string.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.repr {
            TextRepr::Definite { data, .. } => Some(data),
            TextRepr::Chunked(_) => None,
        }
    }

    pub fn chunks(&self) -> &[Rc<Item>] {
        match &self.repr {
            TextRepr::Definite { .. } => &[],
            TextRepr::Chunked(chunks) => chunks,
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks().len()
    }

    /// Append a chunk, adopting the caller's reference. The chunk must be a
    /// definite-length text string, and `self` must be chunked.
    pub fn add_chunk(&mut self, chunk: impl Into<Rc<Item>>) -> Result<(), Error> {
        let chunk = chunk.into();
        let TextRepr::Chunked(chunks) = &mut self.repr else {
            return Err(Error::Full);
        };
        match chunk.as_ref() {
            Item::Text(t) if t.is_definite() => {
                chunks.push(chunk);
                Ok(())
            }
            _ => Err(Error::InvalidChunk),
        }
    }

    fn copy(&self) -> Result<Self, Error> {
        Ok(match &self.repr {
            TextRepr::Definite { data, .. } => Text::definite(data.clone()),
            TextRepr::Chunked(chunks) => Text {
                repr: TextRepr::Chunked(copy_chunks(chunks)?),
            },
        })
    }

    fn flatten(&self) -> Self {
        match &self.repr {
            TextRepr::Definite { data, .. } => Text::definite(data.clone()),
            TextRepr::Chunked(chunks) => {
                let mut data = Vec::with_capacity(self.len());
                for chunk in text_chunks(chunks) {
                    data.extend_from_slice(chunk.data().unwrap_or(&[]));
                }
                Text::definite(data)
            }
        }
    }
}

fn text_chunks(chunks: &[Rc<Item>]) -> impl Iterator<Item = &Text> + '_ {
    chunks.iter().filter_map(|chunk| match chunk.as_ref() {
        Item::Text(t) => Some(t),
        _ => None,
    })
}

fn count_codepoints(data: &[u8]) -> usize {
    data.iter().filter(|&&b| (b & 0xC0) != 0x80).count()
}

fn copy_chunks(chunks: &[Rc<Item>]) -> Result<Vec<Rc<Item>>, Error> {
    let mut out = Vec::new();
    out.try_reserve_exact(chunks.len())?;
    for chunk in chunks {
        out.push(Rc::new(chunk.copy()?));
    }
    Ok(out)
}

/// An ordered sequence of item references.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    items: Vec<Rc<Item>>,
    limit: Option<usize>,
}

impl Array {
    /// A definite-length array expecting exactly `size` entries. The entry
    /// table is reserved up front, so a hostile declared size fails here
    /// rather than on append.
    pub fn definite(size: usize) -> Result<Self, Error> {
        let mut items = Vec::new();
        items.try_reserve_exact(size)?;
        Ok(Self {
            items,
            limit: Some(size),
        })
    }

    pub fn indefinite() -> Self {
        Self {
            items: Vec::new(),
            limit: None,
        }
    }

    pub fn is_definite(&self) -> bool {
        self.limit.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Rc<Item>] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Rc<Item>> {
        self.items.get(index)
    }

    /// Append an entry, adopting the caller's reference.
    pub fn push(&mut self, item: impl Into<Rc<Item>>) -> Result<(), Error> {
        if let Some(limit) = self.limit {
            if self.items.len() >= limit {
                return Err(Error::Full);
            }
        }
        self.items.push(item.into());
        Ok(())
    }

    fn copy(&self) -> Result<Self, Error> {
        let mut items = Vec::new();
        items.try_reserve_exact(self.items.len())?;
        for item in &self.items {
            items.push(Rc::new(item.copy()?));
        }
        Ok(Self {
            items,
            limit: self.limit,
        })
    }

    fn copy_definite(&self) -> Result<Self, Error> {
        let mut res = Array::definite(self.items.len())?;
        for item in &self.items {
            res.push(item.copy_definite()?)?;
        }
        Ok(res)
    }
}

/// An ordered sequence of key/value pairs. Duplicate keys are permitted and
/// encoded order is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    pairs: Vec<(Rc<Item>, Rc<Item>)>,
    limit: Option<usize>,
}

impl Map {
    /// A definite-length map expecting exactly `size` pairs.
    pub fn definite(size: usize) -> Result<Self, Error> {
        let mut pairs = Vec::new();
        pairs.try_reserve_exact(size)?;
        Ok(Self {
            pairs,
            limit: Some(size),
        })
    }

    pub fn indefinite() -> Self {
        Self {
            pairs: Vec::new(),
            limit: None,
        }
    }

    pub fn is_definite(&self) -> bool {
        self.limit.is_some()
    }

    /// Number of key/value pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(Rc<Item>, Rc<Item>)] {
        &self.pairs
    }

    /// Append a pair, adopting both references.
    pub fn add(
        &mut self,
        key: impl Into<Rc<Item>>,
        value: impl Into<Rc<Item>>,
    ) -> Result<(), Error> {
        if let Some(limit) = self.limit {
            if self.pairs.len() >= limit {
                return Err(Error::Full);
            }
        }
        self.pairs.push((key.into(), value.into()));
        Ok(())
    }

    fn copy(&self) -> Result<Self, Error> {
        let mut pairs = Vec::new();
        pairs.try_reserve_exact(self.pairs.len())?;
        for (key, value) in &self.pairs {
            pairs.push((Rc::new(key.copy()?), Rc::new(value.copy()?)));
        }
        Ok(Self {
            pairs,
            limit: self.limit,
        })
    }

    fn copy_definite(&self) -> Result<Self, Error> {
        let mut res = Map::definite(self.pairs.len())?;
        for (key, value) in &self.pairs {
            res.add(key.copy_definite()?, value.copy_definite()?)?;
        }
        Ok(res)
    }
}

/// A tag wrapping exactly one child item.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    value: u64,
    item: Rc<Item>,
}

impl Tag {
    /// Build a tag around `item`, adopting the caller's reference.
    pub fn new(value: u64, item: impl Into<Rc<Item>>) -> Self {
        Self {
            value,
            item: item.into(),
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn item(&self) -> &Rc<Item> {
        &self.item
    }
}

/// Simple values and floating-point payloads of major type 7.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Special {
    /// A simple value code; 20 to 23 are false, true, null and undefined.
    Simple(u8),
    /// A half-precision float, expanded to binary32.
    Half(f32),
    Single(f32),
    Double(f64),
}

impl Special {
    pub const FALSE: u8 = 20;
    pub const TRUE: u8 = 21;
    pub const NULL: u8 = 22;
    pub const UNDEFINED: u8 = 23;

    pub fn bool(value: bool) -> Self {
        Special::Simple(if value { Self::TRUE } else { Self::FALSE })
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Special::Simple(Self::FALSE) => Some(false),
            Special::Simple(Self::TRUE) => Some(true),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Special::Simple(Self::NULL))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Special::Simple(Self::UNDEFINED))
    }

    pub fn simple_value(&self) -> Option<u8> {
        match self {
            Special::Simple(value) => Some(*value),
            _ => None,
        }
    }

    /// The float payload, widened to binary64.
    pub fn float(&self) -> Option<f64> {
        match self {
            Special::Half(value) | Special::Single(value) => Some(*value as f64),
            Special::Double(value) => Some(*value),
            Special::Simple(_) => None,
        }
    }
}

/// A decoded CBOR data item.
///
/// Composite items hold shared (`Rc`) references to their children, so
/// cloning a handle shares the subtree; [`Item::copy`] reproduces it with
/// fresh nodes instead. Dropping the last handle to an item frees it and
/// releases each of its children exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Unsigned(Int),
    Negative(Int),
    Bytes(Bytes),
    Text(Text),
    Array(Array),
    Map(Map),
    Tag(Tag),
    Special(Special),
}

impl Item {
    pub fn bool(value: bool) -> Self {
        Item::Special(Special::bool(value))
    }

    pub fn null() -> Self {
        Item::Special(Special::Simple(Special::NULL))
    }

    pub fn undefined() -> Self {
        Item::Special(Special::Simple(Special::UNDEFINED))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Item::Special(s) => s.as_bool(),
            _ => None,
        }
    }

    /// Whether the item carries a definite length. Items that are not
    /// strings or containers are always definite.
    pub fn is_definite(&self) -> bool {
        match self {
            Item::Bytes(b) => b.is_definite(),
            Item::Text(t) => t.is_definite(),
            Item::Array(a) => a.is_definite(),
            Item::Map(m) => m.is_definite(),
            _ => true,
        }
    }

    /// Deep copy, preserving indefinite-length structure and chunk
    /// boundaries.
    pub fn copy(&self) -> Result<Item, Error> {
        Ok(match self {
            Item::Unsigned(value) => Item::Unsigned(*value),
            Item::Negative(value) => Item::Negative(*value),
            Item::Bytes(b) => Item::Bytes(b.copy()?),
            Item::Text(t) => Item::Text(t.copy()?),
            Item::Array(a) => Item::Array(a.copy()?),
            Item::Map(m) => Item::Map(m.copy()?),
            Item::Tag(t) => Item::Tag(Tag::new(t.value(), t.item().copy()?)),
            Item::Special(s) => Item::Special(*s),
        })
    }

    /// Deep copy that collapses chunked strings to contiguous definite
    /// buffers and indefinite containers to definite containers of the
    /// observed size. Integer, float and tag payloads are preserved.
    pub fn copy_definite(&self) -> Result<Item, Error> {
        Ok(match self {
            Item::Unsigned(value) => Item::Unsigned(*value),
            Item::Negative(value) => Item::Negative(*value),
            Item::Bytes(b) => Item::Bytes(b.flatten()),
            Item::Text(t) => Item::Text(t.flatten()),
            Item::Array(a) => Item::Array(a.copy_definite()?),
            Item::Map(m) => Item::Map(m.copy_definite()?),
            Item::Tag(t) => Item::Tag(Tag::new(t.value(), t.item().copy_definite()?)),
            Item::Special(s) => Item::Special(*s),
        })
    }
}
