use crate::text::TextEncoding;

/// Errors raised while interpreting decoded bytes as typed Rust values.
///
/// These sit one level above `mpk_wire::WireError`: the framing was fine,
/// but the payload does not make sense for the requested interpretation.
///
/// ```text
/// ┌─────────────────────────────────────────────────────┐
/// │ TypeError (this crate)                              │
/// │   ├── InvalidText for bytes illegal in an encoding  │
/// │   ├── Unencodable for chars an encoding can't hold  │
/// │   └── UnknownEncoding for unrecognised labels       │
/// └─────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
  /// The payload bytes are not valid in the requested text encoding.
  #[error("invalid {encoding} text at byte {position}")]
  InvalidText {
    encoding: TextEncoding,
    position: usize,
  },

  /// A character cannot be represented in the target encoding.
  #[error("character {ch:?} cannot be encoded as {encoding}")]
  Unencodable { encoding: TextEncoding, ch: char },

  /// A text encoding label did not match any supported encoding.
  #[error("unknown text encoding label: {label}")]
  UnknownEncoding { label: String },
}
