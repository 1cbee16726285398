// Every MessagePack value starts with a single marker byte. Some markers
// carry their payload inline (fixint, fixstr length, fixarray length...),
// the rest announce how many prefix bytes follow.

/// Raw marker byte constants.
pub mod byte {
    pub const NIL: u8 = 0xc0;
    pub const RESERVED: u8 = 0xc1;
    pub const FALSE: u8 = 0xc2;
    pub const TRUE: u8 = 0xc3;
    pub const BIN8: u8 = 0xc4;
    pub const BIN16: u8 = 0xc5;
    pub const BIN32: u8 = 0xc6;
    pub const EXT8: u8 = 0xc7;
    pub const EXT16: u8 = 0xc8;
    pub const EXT32: u8 = 0xc9;
    pub const F32: u8 = 0xca;
    pub const F64: u8 = 0xcb;
    pub const U8: u8 = 0xcc;
    pub const U16: u8 = 0xcd;
    pub const U32: u8 = 0xce;
    pub const U64: u8 = 0xcf;
    pub const I8: u8 = 0xd0;
    pub const I16: u8 = 0xd1;
    pub const I32: u8 = 0xd2;
    pub const I64: u8 = 0xd3;
    pub const FIXEXT1: u8 = 0xd4;
    pub const FIXEXT2: u8 = 0xd5;
    pub const FIXEXT4: u8 = 0xd6;
    pub const FIXEXT8: u8 = 0xd7;
    pub const FIXEXT16: u8 = 0xd8;
    pub const STR8: u8 = 0xd9;
    pub const STR16: u8 = 0xda;
    pub const STR32: u8 = 0xdb;
    pub const ARRAY16: u8 = 0xdc;
    pub const ARRAY32: u8 = 0xdd;
    pub const MAP16: u8 = 0xde;
    pub const MAP32: u8 = 0xdf;

    pub const FIXMAP_BASE: u8 = 0x80;
    pub const FIXARRAY_BASE: u8 = 0x90;
    pub const FIXSTR_BASE: u8 = 0xa0;
}

/// Largest value that fits a positive fixint marker.
pub const POS_FIXINT_MAX: u8 = 0x7f;

/// Smallest value that fits a negative fixint marker (-32).
pub const NEG_FIXINT_MIN: i8 = -32;

/// Largest length a fixstr can carry.
pub const FIXSTR_MAX: usize = 31;

/// Largest length a fixarray or fixmap can carry.
pub const FIXCOLLECTION_MAX: usize = 15;

/// Decoded form of a marker byte.
///
/// ```text
/// ┌────────────┬──────────────────────┬─────────────────────────────┐
/// │ Byte range │ Marker               │ Payload                     │
/// ├────────────┼──────────────────────┼─────────────────────────────┤
/// │ 0x00-0x7f  │ PosFixInt(n)         │ none, value inline          │
/// │ 0x80-0x8f  │ FixMap(n)            │ n key/value pairs           │
/// │ 0x90-0x9f  │ FixArray(n)          │ n elements                  │
/// │ 0xa0-0xbf  │ FixStr(n)            │ n bytes                     │
/// │ 0xc0-0xdf  │ one variant per byte │ see `prefix_len`            │
/// │ 0xe0-0xff  │ NegFixInt(n)         │ none, value inline          │
/// └────────────┴──────────────────────┴─────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    PosFixInt(u8),
    FixMap(u8),
    FixArray(u8),
    FixStr(u8),
    Nil,
    Reserved,
    False,
    True,
    Bin8,
    Bin16,
    Bin32,
    Ext8,
    Ext16,
    Ext32,
    F32,
    F64,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    FixExt1,
    FixExt2,
    FixExt4,
    FixExt8,
    FixExt16,
    Str8,
    Str16,
    Str32,
    Array16,
    Array32,
    Map16,
    Map32,
    NegFixInt(i8),
}

impl Marker {
    /// Classify a raw marker byte. Every byte maps to exactly one variant.
    #[must_use]
    pub fn from_u8(b: u8) -> Self {
        match b {
            0x00..=0x7f => Self::PosFixInt(b),
            0x80..=0x8f => Self::FixMap(b & 0x0f),
            0x90..=0x9f => Self::FixArray(b & 0x0f),
            0xa0..=0xbf => Self::FixStr(b & 0x1f),
            byte::NIL => Self::Nil,
            byte::RESERVED => Self::Reserved,
            byte::FALSE => Self::False,
            byte::TRUE => Self::True,
            byte::BIN8 => Self::Bin8,
            byte::BIN16 => Self::Bin16,
            byte::BIN32 => Self::Bin32,
            byte::EXT8 => Self::Ext8,
            byte::EXT16 => Self::Ext16,
            byte::EXT32 => Self::Ext32,
            byte::F32 => Self::F32,
            byte::F64 => Self::F64,
            byte::U8 => Self::U8,
            byte::U16 => Self::U16,
            byte::U32 => Self::U32,
            byte::U64 => Self::U64,
            byte::I8 => Self::I8,
            byte::I16 => Self::I16,
            byte::I32 => Self::I32,
            byte::I64 => Self::I64,
            byte::FIXEXT1 => Self::FixExt1,
            byte::FIXEXT2 => Self::FixExt2,
            byte::FIXEXT4 => Self::FixExt4,
            byte::FIXEXT8 => Self::FixExt8,
            byte::FIXEXT16 => Self::FixExt16,
            byte::STR8 => Self::Str8,
            byte::STR16 => Self::Str16,
            byte::STR32 => Self::Str32,
            byte::ARRAY16 => Self::Array16,
            byte::ARRAY32 => Self::Array32,
            byte::MAP16 => Self::Map16,
            byte::MAP32 => Self::Map32,
            // 0xe0..=0xff: the byte is the two's complement value itself
            _ => Self::NegFixInt(i8::from_be_bytes([b])),
        }
    }

    /// Number of big-endian bytes that follow the marker before the
    /// payload (or, for scalars, the value itself).
    ///
    /// | Marker                        | Prefix |
    /// |-------------------------------|--------|
    /// | fix*, nil, bool, reserved     | 0      |
    /// | u8/i8, bin8, str8             | 1      |
    /// | ext8                          | 1 + 1 type byte |
    /// | u16/i16, bin16, str16, *16    | 2      |
    /// | ext16                         | 2 + 1  |
    /// | u32/i32/f32, bin32, str32, *32| 4      |
    /// | ext32                         | 4 + 1  |
    /// | u64/i64/f64                   | 8      |
    /// | fixext N                      | 1 type byte |
    #[must_use]
    pub fn prefix_len(self) -> usize {
        match self {
            Self::U8 | Self::I8 | Self::Bin8 | Self::Str8 => 1,
            Self::FixExt1 | Self::FixExt2 | Self::FixExt4 | Self::FixExt8 | Self::FixExt16 => 1,
            Self::Ext8 | Self::U16 | Self::I16 | Self::Bin16 | Self::Str16 => 2,
            Self::Array16 | Self::Map16 => 2,
            Self::Ext16 => 3,
            Self::U32 | Self::I32 | Self::F32 | Self::Bin32 | Self::Str32 => 4,
            Self::Array32 | Self::Map32 => 4,
            Self::Ext32 => 5,
            Self::U64 | Self::I64 | Self::F64 => 8,
            _ => 0,
        }
    }

    /// Human-readable family name, used in type-mismatch diagnostics.
    #[must_use]
    pub fn family(self) -> &'static str {
        match self {
            Self::PosFixInt(_) | Self::NegFixInt(_) => "integer",
            Self::U8 | Self::U16 | Self::U32 | Self::U64 => "integer",
            Self::I8 | Self::I16 | Self::I32 | Self::I64 => "integer",
            Self::FixMap(_) | Self::Map16 | Self::Map32 => "map",
            Self::FixArray(_) | Self::Array16 | Self::Array32 => "array",
            Self::FixStr(_) | Self::Str8 | Self::Str16 | Self::Str32 => "str",
            Self::Bin8 | Self::Bin16 | Self::Bin32 => "bin",
            Self::Ext8 | Self::Ext16 | Self::Ext32 => "ext",
            Self::FixExt1 | Self::FixExt2 | Self::FixExt4 | Self::FixExt8 | Self::FixExt16 => "ext",
            Self::Nil => "nil",
            Self::Reserved => "reserved",
            Self::False | Self::True => "boolean",
            Self::F32 | Self::F64 => "float",
        }
    }

    /// Payload size carried by a fixext marker, if this is one.
    #[must_use]
    pub fn fixext_len(self) -> Option<u32> {
        match self {
            Self::FixExt1 => Some(1),
            Self::FixExt2 => Some(2),
            Self::FixExt4 => Some(4),
            Self::FixExt8 => Some(8),
            Self::FixExt16 => Some(16),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_ranges_carry_inline_payload() {
        assert_eq!(Marker::from_u8(0x00), Marker::PosFixInt(0));
        assert_eq!(Marker::from_u8(0x7f), Marker::PosFixInt(127));
        assert_eq!(Marker::from_u8(0x83), Marker::FixMap(3));
        assert_eq!(Marker::from_u8(0x9f), Marker::FixArray(15));
        assert_eq!(Marker::from_u8(0xbf), Marker::FixStr(31));
        assert_eq!(Marker::from_u8(0xe0), Marker::NegFixInt(-32));
        assert_eq!(Marker::from_u8(0xff), Marker::NegFixInt(-1));
    }

    #[test]
    fn single_byte_markers() {
        assert_eq!(Marker::from_u8(0xc0), Marker::Nil);
        assert_eq!(Marker::from_u8(0xc1), Marker::Reserved);
        assert_eq!(Marker::from_u8(0xc3), Marker::True);
        assert_eq!(Marker::from_u8(0xdb), Marker::Str32);
        assert_eq!(Marker::from_u8(0xdf), Marker::Map32);
    }

    #[test]
    fn prefix_lengths() {
        assert_eq!(Marker::Nil.prefix_len(), 0);
        assert_eq!(Marker::Str8.prefix_len(), 1);
        assert_eq!(Marker::Ext8.prefix_len(), 2);
        assert_eq!(Marker::Ext16.prefix_len(), 3);
        assert_eq!(Marker::Ext32.prefix_len(), 5);
        assert_eq!(Marker::F64.prefix_len(), 8);
        assert_eq!(Marker::FixExt16.prefix_len(), 1);
    }

    #[test]
    fn families_name_the_shape() {
        assert_eq!(Marker::from_u8(0xa5).family(), "str");
        assert_eq!(Marker::from_u8(0xc4).family(), "bin");
        assert_eq!(Marker::from_u8(0xd0).family(), "integer");
        assert_eq!(Marker::from_u8(0xc2).family(), "boolean");
    }
}
