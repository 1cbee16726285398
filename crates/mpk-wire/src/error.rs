/// Low-level framing errors raised while reading MessagePack markers,
/// length prefixes and fixed-width payloads.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Input ended before a complete marker, prefix or payload could be read.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// The never-used marker byte 0xC1 was encountered.
    #[error("reserved marker 0xC1 at offset {offset}")]
    ReservedMarker { offset: usize },

    /// A declared str/bin/ext/array/map length exceeds the configured limit.
    #[error("declared length {len} exceeds limit {limit}")]
    LengthLimit { len: usize, limit: usize },

    /// Containers nested deeper than the decoder allows.
    #[error("nesting depth exceeds limit {limit}")]
    DepthLimit { limit: usize },

    /// An integer on the wire does not fit the requested Rust type.
    #[error("integer does not fit in {target}")]
    IntegerOverflow { target: &'static str },
}
