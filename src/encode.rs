use super::item::{Int, IntWidth, Item, Special};

/// Serializes an item tree back to bytes.
///
/// Integer and float widths recorded on the items are reproduced verbatim,
/// as are definite/indefinite structure and chunk boundaries. Length and
/// tag arguments are emitted in their shortest form.
#[derive(Default)]
pub struct Encoder {
    data: Vec<u8>,
}

impl Encoder {
    fn emit_uint_minor(&mut self, major: u8, val: u64) {
        if val < 24 {
            self.data.push((major << 5) | (val as u8));
        } else if val <= u8::MAX as u64 {
            self.data.push((major << 5) | 24);
            self.data.push(val as u8);
        } else if val <= u16::MAX as u64 {
            self.data.push((major << 5) | 25);
            self.data.extend((val as u16).to_be_bytes());
        } else if val <= u32::MAX as u64 {
            self.data.push((major << 5) | 26);
            self.data.extend((val as u32).to_be_bytes());
        } else {
            self.data.push((major << 5) | 27);
            self.data.extend(val.to_be_bytes());
        }
    }

    fn emit_int(&mut self, major: u8, value: &Int) {
        match value.width() {
            IntWidth::U8 if value.value() < 24 => {
                self.data.push((major << 5) | (value.value() as u8));
            }
            IntWidth::U8 => {
                self.data.push((major << 5) | 24);
                self.data.push(value.value() as u8);
            }
            IntWidth::U16 => {
                self.data.push((major << 5) | 25);
                self.data.extend((value.value() as u16).to_be_bytes());
            }
            IntWidth::U32 => {
                self.data.push((major << 5) | 26);
                self.data.extend((value.value() as u32).to_be_bytes());
            }
            IntWidth::U64 => {
                self.data.push((major << 5) | 27);
                self.data.extend(value.value().to_be_bytes());
            }
        }
    }

    pub fn emit(&mut self, item: &Item) {
        match item {
            Item::Unsigned(value) => self.emit_int(0, value),
            Item::Negative(value) => self.emit_int(1, value),
            Item::Bytes(b) => {
                if let Some(data) = b.data() {
                    self.emit_uint_minor(2, data.len() as u64);
                    self.data.extend_from_slice(data);
                } else {
                    self.data.push((2 << 5) | 31);
                    for chunk in b.chunks() {
                        self.emit(chunk);
                    }
                    self.data.push(0xFF);
                }
            }
            Item::Text(t) => {
                if let Some(data) = t.data() {
                    self.emit_uint_minor(3, data.len() as u64);
                    self.data.extend_from_slice(data);
                } else {
                    self.data.push((3 << 5) | 31);
                    for chunk in t.chunks() {
                        self.emit(chunk);
                    }
                    self.data.push(0xFF);
                }
            }
            Item::Array(a) => {
                if a.is_definite() {
                    self.emit_uint_minor(4, a.len() as u64);
                } else {
                    self.data.push((4 << 5) | 31);
                }
                for entry in a.items() {
                    self.emit(entry);
                }
                if !a.is_definite() {
                    self.data.push(0xFF);
                }
            }
            Item::Map(m) => {
                if m.is_definite() {
                    self.emit_uint_minor(5, m.len() as u64);
                } else {
                    self.data.push((5 << 5) | 31);
                }
                for (key, value) in m.pairs() {
                    self.emit(key);
                    self.emit(value);
                }
                if !m.is_definite() {
                    self.data.push(0xFF);
                }
            }
            Item::Tag(t) => {
                self.emit_uint_minor(6, t.value());
                self.emit(t.item());
            }
            Item::Special(s) => match s {
                Special::Simple(value) if *value < 24 => self.data.push((7 << 5) | *value),
                Special::Simple(value) => {
                    self.data.push((7 << 5) | 24);
                    self.data.push(*value);
                }
                Special::Half(value) => {
                    self.data.push((7 << 5) | 25);
                    self.data.extend(half::f16::from_f32(*value).to_be_bytes());
                }
                Special::Single(value) => {
                    self.data.push((7 << 5) | 26);
                    self.data.extend(value.to_be_bytes());
                }
                Special::Double(value) => {
                    self.data.push((7 << 5) | 27);
                    self.data.extend(value.to_be_bytes());
                }
            },
        }
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Serialize a single item tree.
pub fn emit(item: &Item) -> Vec<u8> {
    let mut e = Encoder::default();
    e.emit(item);
    e.into_data()
}
