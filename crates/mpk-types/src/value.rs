use std::fmt;

use crate::shape::Shape;

/// A fully decoded MessagePack value.
///
/// Integers are normalised by sign rather than wire width: any
/// non-negative integer decodes to [`Value::UInt`], any negative one to
/// [`Value::Int`]. So `0x01`, `0xcc 0x01` and `0xd0 0x01` all compare
/// equal as `UInt(1)`.
///
/// `Str` keeps the raw payload bytes; use [`Value::as_str`] for a
/// validated UTF-8 view, or decode with an explicit
/// [`TextEncoding`](crate::TextEncoding).
///
/// ```text
/// ┌──────────────┬──────────────────────────────┐
/// │ Variant      │ Wire families                │
/// ├──────────────┼──────────────────────────────┤
/// │ Nil          │ nil                          │
/// │ Bool         │ true, false                  │
/// │ UInt / Int   │ fixints, uint*, int*         │
/// │ F32 / F64    │ float32, float64             │
/// │ Str          │ fixstr, str8/16/32           │
/// │ Bin          │ bin8/16/32                   │
/// │ Array        │ fixarray, array16/32         │
/// │ Map          │ fixmap, map16/32             │
/// │ Ext          │ fixext*, ext8/16/32          │
/// └──────────────┴──────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
  Nil,
  Bool(bool),
  UInt(u64),
  Int(i64),
  F32(f32),
  F64(f64),
  Str(Vec<u8>),
  Bin(Vec<u8>),
  Array(Vec<Value>),
  /// Entries in wire order. Duplicate keys are kept.
  Map(Vec<(Value, Value)>),
  Ext { type_id: i8, data: Vec<u8> },
}

impl Value {
  /// Build an integer value from a signed quantity, normalising sign.
  #[must_use]
  pub fn integer(n: i64) -> Self {
    u64::try_from(n).map_or(Self::Int(n), Self::UInt)
  }

  /// The shape a direct extraction would need to read this value.
  #[must_use]
  pub fn shape(&self) -> Shape {
    match self {
      Self::Nil => Shape::Nil,
      Self::Bool(_) => Shape::Boolean,
      Self::UInt(_) | Self::Int(_) => Shape::Integer,
      Self::F32(_) | Self::F64(_) => Shape::Float,
      Self::Str(_) | Self::Bin(_) => Shape::Raw,
      Self::Array(_) => Shape::Array,
      Self::Map(_) => Shape::Map,
      Self::Ext { .. } => Shape::Ext,
    }
  }

  #[must_use]
  pub fn is_nil(&self) -> bool {
    matches!(self, Self::Nil)
  }

  #[must_use]
  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Bool(b) => Some(*b),
      _ => None,
    }
  }

  #[must_use]
  pub fn as_u64(&self) -> Option<u64> {
    match self {
      Self::UInt(n) => Some(*n),
      _ => None,
    }
  }

  #[must_use]
  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Self::UInt(n) => i64::try_from(*n).ok(),
      Self::Int(n) => Some(*n),
      _ => None,
    }
  }

  #[must_use]
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::F32(f) => Some(f64::from(*f)),
      Self::F64(f) => Some(*f),
      _ => None,
    }
  }

  /// UTF-8 view of a `Str` payload. `None` for other variants or
  /// invalid UTF-8.
  #[must_use]
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::Str(bytes) => std::str::from_utf8(bytes).ok(),
      _ => None,
    }
  }

  /// Payload of a `Str` or `Bin`.
  #[must_use]
  pub fn as_bytes(&self) -> Option<&[u8]> {
    match self {
      Self::Str(bytes) | Self::Bin(bytes) => Some(bytes),
      _ => None,
    }
  }

  #[must_use]
  pub fn as_array(&self) -> Option<&[Value]> {
    match self {
      Self::Array(items) => Some(items),
      _ => None,
    }
  }

  #[must_use]
  pub fn as_map(&self) -> Option<&[(Value, Value)]> {
    match self {
      Self::Map(entries) => Some(entries),
      _ => None,
    }
  }

  /// Structural equality that compares floats by bit pattern, so a NaN
  /// equals the same NaN. `==` follows IEEE 754 instead.
  #[must_use]
  pub fn identical(&self, other: &Value) -> bool {
    match (self, other) {
      (Self::F32(a), Self::F32(b)) => a.to_bits() == b.to_bits(),
      (Self::F64(a), Self::F64(b)) => a.to_bits() == b.to_bits(),
      (Self::Array(a), Self::Array(b)) => {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.identical(y))
      }
      (Self::Map(a), Self::Map(b)) => {
        a.len() == b.len()
          && a
            .iter()
            .zip(b)
            .all(|((ak, av), (bk, bv))| ak.identical(bk) && av.identical(bv))
      }
      _ => self == other,
    }
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Self::Bool(b)
  }
}

impl From<u64> for Value {
  fn from(n: u64) -> Self {
    Self::UInt(n)
  }
}

impl From<i64> for Value {
  fn from(n: i64) -> Self {
    Self::integer(n)
  }
}

impl From<f64> for Value {
  fn from(f: f64) -> Self {
    Self::F64(f)
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Self::Str(s.as_bytes().to_vec())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Self::Str(s.into_bytes())
  }
}

impl From<Vec<Value>> for Value {
  fn from(items: Vec<Value>) -> Self {
    Self::Array(items)
  }
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
  for b in bytes {
    write!(f, "{b:02x}")?;
  }
  Ok(())
}

/// Compact, JSON-like rendering. Strings are shown lossily as UTF-8,
/// binary and extension payloads as hex.
impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Nil => f.write_str("nil"),
      Self::Bool(b) => write!(f, "{b}"),
      Self::UInt(n) => write!(f, "{n}"),
      Self::Int(n) => write!(f, "{n}"),
      Self::F32(x) => write!(f, "{x:?}"),
      Self::F64(x) => write!(f, "{x:?}"),
      Self::Str(bytes) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
      Self::Bin(bytes) => {
        f.write_str("bin(")?;
        write_hex(f, bytes)?;
        f.write_str(")")
      }
      Self::Array(items) => {
        f.write_str("[")?;
        for (i, item) in items.iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{item}")?;
        }
        f.write_str("]")
      }
      Self::Map(entries) => {
        f.write_str("{")?;
        for (i, (k, v)) in entries.iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{k}: {v}")?;
        }
        f.write_str("}")
      }
      Self::Ext { type_id, data } => {
        write!(f, "ext({type_id}, ")?;
        write_hex(f, data)?;
        f.write_str(")")
      }
    }
  }
}
