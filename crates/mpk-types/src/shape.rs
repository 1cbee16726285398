use std::fmt;

use mpk_wire::Marker;

/// The shape a direct extraction expects at the cursor.
///
/// A direct operation compares the leading marker against its shape and
/// reports a type mismatch naming the shape when they disagree.
///
/// ```text
/// ┌──────────┬───────────────────────────────────────────┐
/// │ Shape    │ Accepted markers                          │
/// ├──────────┼───────────────────────────────────────────┤
/// │ Nil      │ 0xc0                                      │
/// │ Boolean  │ 0xc2, 0xc3                                │
/// │ Integer  │ fixints, u8-u64, i8-i64                   │
/// │ Float    │ f32, f64                                  │
/// │ Raw      │ fixstr, str8-32, bin8-32                  │
/// │ Array    │ fixarray, array16, array32                │
/// │ Map      │ fixmap, map16, map32                      │
/// │ Ext      │ fixext1-16, ext8-32                       │
/// │ Any      │ everything except 0xc1                    │
/// └──────────┴───────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
  Nil,
  Boolean,
  Integer,
  Float,
  Raw,
  Array,
  Map,
  Ext,
  Any,
}

impl Shape {
  /// Whether a value starting with `marker` has this shape.
  #[must_use]
  pub fn accepts(self, marker: Marker) -> bool {
    match self {
      Self::Nil => marker == Marker::Nil,
      Self::Boolean => matches!(marker, Marker::True | Marker::False),
      Self::Integer => marker.family() == "integer",
      Self::Float => matches!(marker, Marker::F32 | Marker::F64),
      Self::Raw => matches!(marker.family(), "str" | "bin"),
      Self::Array => marker.family() == "array",
      Self::Map => marker.family() == "map",
      Self::Ext => marker.family() == "ext",
      Self::Any => marker != Marker::Reserved,
    }
  }

  #[must_use]
  pub fn name(self) -> &'static str {
    match self {
      Self::Nil => "nil",
      Self::Boolean => "boolean",
      Self::Integer => "integer",
      Self::Float => "float",
      Self::Raw => "raw (str or bin)",
      Self::Array => "array",
      Self::Map => "map",
      Self::Ext => "ext",
      Self::Any => "any value",
    }
  }
}

impl fmt::Display for Shape {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}
