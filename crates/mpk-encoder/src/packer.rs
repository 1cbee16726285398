use mpk_types::{TextEncoding, Value};
use mpk_wire::marker::{FIXCOLLECTION_MAX, FIXSTR_MAX, NEG_FIXINT_MIN, POS_FIXINT_MAX, byte};

use crate::error::EncodeError;

/// Marker set for one length-prefixed family.
struct LengthFamily {
    /// Base marker and largest inline length, for families with a fix form.
    fix: Option<(u8, usize)>,
    m8: Option<u8>,
    m16: u8,
    m32: u8,
}

const STR: LengthFamily = LengthFamily {
    fix: Some((byte::FIXSTR_BASE, FIXSTR_MAX)),
    m8: Some(byte::STR8),
    m16: byte::STR16,
    m32: byte::STR32,
};

const BIN: LengthFamily = LengthFamily {
    fix: None,
    m8: Some(byte::BIN8),
    m16: byte::BIN16,
    m32: byte::BIN32,
};

const ARRAY: LengthFamily = LengthFamily {
    fix: Some((byte::FIXARRAY_BASE, FIXCOLLECTION_MAX)),
    m8: None,
    m16: byte::ARRAY16,
    m32: byte::ARRAY32,
};

const MAP: LengthFamily = LengthFamily {
    fix: Some((byte::FIXMAP_BASE, FIXCOLLECTION_MAX)),
    m8: None,
    m16: byte::MAP16,
    m32: byte::MAP32,
};

/// MessagePack packer. Every method appends one value (or one container
/// header) in the smallest wire form that holds it.
///
/// Methods chain on `&mut Self`. Errors do not break the chain: the
/// first one is kept and returned by [`finish`](Self::finish).
///
/// ```rust
/// use mpk_encoder::Packer;
///
/// let bytes = Packer::new()
///     .map_header(1)
///     .str("ids")
///     .array_header(2)
///     .uint(1)
///     .int(-1)
///     .finish()
///     .unwrap();
/// assert_eq!(bytes, [0x81, 0xa3, b'i', b'd', b's', 0x92, 0x01, 0xff]);
/// ```
///
/// Container headers only announce a count; the caller appends exactly
/// that many elements (twice as many for maps, keys and values
/// interleaved).
#[derive(Debug, Default)]
pub struct Packer {
    buf: Vec<u8>,
    error: Option<EncodeError>,
}

impl Packer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            error: None,
        }
    }

    /// Bytes packed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn fail(&mut self, error: EncodeError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn marker_with(&mut self, marker: u8, payload: &[u8]) {
        self.buf.push(marker);
        self.buf.extend_from_slice(payload);
    }

    fn length_header(&mut self, len: usize, family: &LengthFamily) {
        if let Some((base, _)) = family.fix.filter(|&(_, max)| len <= max) {
            // at most 31, fits the low bits of the marker
            let n = u8::try_from(len).unwrap_or_default();
            self.buf.push(base | n);
            return;
        }
        if let (Some(m8), Ok(n)) = (family.m8, u8::try_from(len)) {
            self.marker_with(m8, &[n]);
        } else if let Ok(n) = u16::try_from(len) {
            self.marker_with(family.m16, &n.to_be_bytes());
        } else if let Ok(n) = u32::try_from(len) {
            self.marker_with(family.m32, &n.to_be_bytes());
        } else {
            self.fail(EncodeError::TooLong { len });
        }
    }

    pub fn nil(&mut self) -> &mut Self {
        self.buf.push(byte::NIL);
        self
    }

    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.buf.push(if value { byte::TRUE } else { byte::FALSE });
        self
    }

    /// Pack an unsigned integer as a positive fixint or uint8/16/32/64.
    pub fn uint(&mut self, value: u64) -> &mut Self {
        if value <= u64::from(POS_FIXINT_MAX) {
            self.buf.extend_from_slice(&value.to_be_bytes()[7..]);
        } else if let Ok(n) = u8::try_from(value) {
            self.marker_with(byte::U8, &[n]);
        } else if let Ok(n) = u16::try_from(value) {
            self.marker_with(byte::U16, &n.to_be_bytes());
        } else if let Ok(n) = u32::try_from(value) {
            self.marker_with(byte::U32, &n.to_be_bytes());
        } else {
            self.marker_with(byte::U64, &value.to_be_bytes());
        }
        self
    }

    /// Pack a signed integer. Non-negative values take the unsigned
    /// forms, so `int(5)` and `uint(5)` produce the same bytes.
    pub fn int(&mut self, value: i64) -> &mut Self {
        if let Ok(n) = u64::try_from(value) {
            return self.uint(n);
        }
        if value >= i64::from(NEG_FIXINT_MIN) {
            self.buf.extend_from_slice(&value.to_be_bytes()[7..]);
        } else if let Ok(n) = i8::try_from(value) {
            self.marker_with(byte::I8, &n.to_be_bytes());
        } else if let Ok(n) = i16::try_from(value) {
            self.marker_with(byte::I16, &n.to_be_bytes());
        } else if let Ok(n) = i32::try_from(value) {
            self.marker_with(byte::I32, &n.to_be_bytes());
        } else {
            self.marker_with(byte::I64, &value.to_be_bytes());
        }
        self
    }

    pub fn f32(&mut self, value: f32) -> &mut Self {
        self.marker_with(byte::F32, &value.to_be_bytes());
        self
    }

    pub fn f64(&mut self, value: f64) -> &mut Self {
        self.marker_with(byte::F64, &value.to_be_bytes());
        self
    }

    /// Pack a UTF-8 string.
    pub fn str(&mut self, value: &str) -> &mut Self {
        self.str_bytes(value.as_bytes())
    }

    /// Pack a string as `encoding` bytes under a str marker.
    pub fn str_with(&mut self, value: &str, encoding: TextEncoding) -> &mut Self {
        match encoding.encode(value) {
            Ok(bytes) => self.str_bytes(&bytes),
            Err(e) => {
                self.fail(e.into());
                self
            }
        }
    }

    /// Pack raw bytes under a str marker without checking them.
    pub fn str_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.length_header(bytes.len(), &STR);
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn bin(&mut self, bytes: &[u8]) -> &mut Self {
        self.length_header(bytes.len(), &BIN);
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn array_header(&mut self, len: usize) -> &mut Self {
        self.length_header(len, &ARRAY);
        self
    }

    pub fn map_header(&mut self, len: usize) -> &mut Self {
        self.length_header(len, &MAP);
        self
    }

    /// Pack an extension value, using a fixext marker when the payload
    /// is 1, 2, 4, 8 or 16 bytes long.
    pub fn ext(&mut self, type_id: i8, data: &[u8]) -> &mut Self {
        let type_byte = type_id.to_be_bytes()[0];
        let fixed = match data.len() {
            1 => Some(byte::FIXEXT1),
            2 => Some(byte::FIXEXT2),
            4 => Some(byte::FIXEXT4),
            8 => Some(byte::FIXEXT8),
            16 => Some(byte::FIXEXT16),
            _ => None,
        };
        if let Some(marker) = fixed {
            self.marker_with(marker, &[type_byte]);
        } else if let Ok(n) = u8::try_from(data.len()) {
            self.marker_with(byte::EXT8, &[n, type_byte]);
        } else if let Ok(n) = u16::try_from(data.len()) {
            self.marker_with(byte::EXT16, &n.to_be_bytes());
            self.buf.push(type_byte);
        } else if let Ok(n) = u32::try_from(data.len()) {
            self.marker_with(byte::EXT32, &n.to_be_bytes());
            self.buf.push(type_byte);
        } else {
            self.fail(EncodeError::TooLong { len: data.len() });
            return self;
        }
        self.buf.extend_from_slice(data);
        self
    }

    /// Pack a whole [`Value`] tree.
    pub fn value(&mut self, value: &Value) -> &mut Self {
        match value {
            Value::Nil => self.nil(),
            Value::Bool(b) => self.bool(*b),
            Value::UInt(n) => self.uint(*n),
            Value::Int(n) => self.int(*n),
            Value::F32(x) => self.f32(*x),
            Value::F64(x) => self.f64(*x),
            Value::Str(bytes) => self.str_bytes(bytes),
            Value::Bin(bytes) => self.bin(bytes),
            Value::Array(items) => {
                self.array_header(items.len());
                for item in items {
                    self.value(item);
                }
                self
            }
            Value::Map(entries) => {
                self.map_header(entries.len());
                for (k, v) in entries {
                    self.value(k).value(v);
                }
                self
            }
            Value::Ext { type_id, data } => self.ext(*type_id, data),
        }
    }

    /// Take the packed bytes, leaving the packer empty and reusable.
    ///
    /// # Errors
    ///
    /// The first error raised since the last `finish`. The partial output
    /// is discarded.
    pub fn finish(&mut self) -> Result<Vec<u8>, EncodeError> {
        let bytes = std::mem::take(&mut self.buf);
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(bytes),
        }
    }
}

/// Pack a single value.
///
/// # Errors
///
/// [`EncodeError::TooLong`] if any length exceeds the wire limit.
pub fn pack(value: &Value) -> Result<Vec<u8>, EncodeError> {
    Packer::new().value(value).finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_of(packer: &mut Packer) -> String {
        hex::encode(packer.finish().unwrap())
    }

    // ── Smallest wire form ──────────────────────────────────────────────

    #[test]
    fn unsigned_boundaries() {
        let mut p = Packer::new();
        assert_eq!(hex_of(p.uint(0)), "00");
        assert_eq!(hex_of(p.uint(127)), "7f");
        assert_eq!(hex_of(p.uint(128)), "cc80");
        assert_eq!(hex_of(p.uint(256)), "cd0100");
        assert_eq!(hex_of(p.uint(65_536)), "ce00010000");
        assert_eq!(hex_of(p.uint(1 << 32)), "cf0000000100000000");
    }

    #[test]
    fn signed_boundaries() {
        let mut p = Packer::new();
        assert_eq!(hex_of(p.int(5)), "05");
        assert_eq!(hex_of(p.int(-1)), "ff");
        assert_eq!(hex_of(p.int(-32)), "e0");
        assert_eq!(hex_of(p.int(-33)), "d0df");
        assert_eq!(hex_of(p.int(-129)), "d1ff7f");
        assert_eq!(hex_of(p.int(-32_769)), "d2ffff7fff");
        assert_eq!(hex_of(p.int(i64::MIN)), "d38000000000000000");
    }

    #[test]
    fn strings_and_binary() {
        let mut p = Packer::new();
        assert_eq!(hex_of(p.str("")), "a0");
        assert_eq!(hex_of(p.str("hi")), "a26869");
        let long = "x".repeat(32);
        assert_eq!(&hex_of(p.str(&long))[..4], "d920");
        assert_eq!(hex_of(p.bin(&[1, 2])), "c4020102");
        let big = vec![0u8; 300];
        assert_eq!(&hex_of(p.bin(&big))[..6], "c5012c");
    }

    #[test]
    fn container_headers() {
        let mut p = Packer::new();
        assert_eq!(hex_of(p.array_header(15)), "9f");
        assert_eq!(hex_of(p.array_header(16)), "dc0010");
        assert_eq!(hex_of(p.map_header(0)), "80");
        assert_eq!(hex_of(p.map_header(70_000)), "df00011170");
    }

    #[test]
    fn extension_forms() {
        let mut p = Packer::new();
        assert_eq!(hex_of(p.ext(1, &[0xaa])), "d401aa");
        assert_eq!(hex_of(p.ext(-1, &[0; 4])), "d6ff00000000");
        assert_eq!(hex_of(p.ext(2, &[0xaa, 0xbb, 0xcc])), "c70302aabbcc");
        assert_eq!(hex_of(p.ext(3, &[])), "c70003");
    }

    #[test]
    fn floats_keep_their_width() {
        let mut p = Packer::new();
        assert_eq!(hex_of(p.f32(1.5)), "ca3fc00000");
        assert_eq!(hex_of(p.f64(1.5)), "cb3ff8000000000000");
    }

    // ── Values and errors ───────────────────────────────────────────────

    #[test]
    fn value_tree() {
        let value = Value::Map(vec![(
            Value::from("a"),
            Value::Array(vec![Value::Nil, Value::Bool(true), Value::integer(-2)]),
        )]);
        assert_eq!(hex::encode(pack(&value).unwrap()), "81a16193c0c3fe");
    }

    #[test]
    fn text_encodings() {
        let mut p = Packer::new();
        assert_eq!(hex_of(p.str_with("A", TextEncoding::Utf16Be)), "a20041");
        assert_eq!(hex_of(p.str_with("é", TextEncoding::Latin1)), "a1e9");
    }

    #[test]
    fn first_error_is_reported_at_finish() {
        let mut p = Packer::new();
        p.uint(1).str_with("é", TextEncoding::Ascii).uint(2);
        assert!(matches!(p.finish(), Err(EncodeError::Text(_))));
        // the packer is clean again
        assert_eq!(hex_of(p.uint(3)), "03");
    }
}
