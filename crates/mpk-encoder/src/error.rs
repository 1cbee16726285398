use mpk_types::TypeError;

/// Errors that can occur while packing values.
///
/// The packer never fails mid-chain; the first error is kept and
/// returned by [`Packer::finish`](crate::Packer::finish).
///
/// Error hierarchy:
///
/// ```text
///   EncodeError
///   ├── TooLong            ← str/bin/ext length or element count over u32
///   └── Text(TypeError)    ← string not representable in the chosen encoding
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("length {len} exceeds the 32-bit wire limit")]
    TooLong { len: usize },

    #[error(transparent)]
    Text(#[from] TypeError),
}
