use crate::error::WireError;

/// Read an unsigned big-endian integer of `width` bytes (1, 2, 4 or 8)
/// starting at `offset`.
///
/// # Returns
///
/// The value widened to `u64`.
///
/// # Errors
///
/// [`WireError::UnexpectedEof`] if fewer than `width` bytes remain. The
/// reported offset is the position of the first missing byte.
///
/// # Wire format examples
///
/// | Bytes                    | Width | Value  |
/// |--------------------------|-------|--------|
/// | `[0x2A]`                 | 1     | 42     |
/// | `[0x01, 0x00]`           | 2     | 256    |
/// | `[0x00, 0x01, 0x00, 0x00]` | 4   | 65536  |
pub fn read_uint(buf: &[u8], offset: usize, width: usize) -> Result<u64, WireError> {
    debug_assert!(matches!(width, 1 | 2 | 4 | 8));
    let end = offset + width;
    if buf.len() < end {
        return Err(WireError::UnexpectedEof { offset: buf.len() });
    }

    Ok(buf[offset..end]
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

/// Read a signed big-endian integer of `width` bytes, sign-extending
/// to `i64`.
///
/// # Errors
///
/// [`WireError::UnexpectedEof`] if fewer than `width` bytes remain.
#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
pub fn read_int(buf: &[u8], offset: usize, width: usize) -> Result<i64, WireError> {
    let raw = read_uint(buf, offset, width)?;
    Ok(match width {
        1 => i64::from(raw as u8 as i8),
        2 => i64::from(raw as u16 as i16),
        4 => i64::from(raw as u32 as i32),
        _ => raw as i64,
    })
}

/// Read a big-endian IEEE 754 single.
///
/// # Errors
///
/// [`WireError::UnexpectedEof`] if fewer than 4 bytes remain.
#[allow(clippy::cast_possible_truncation)]
pub fn read_f32(buf: &[u8], offset: usize) -> Result<f32, WireError> {
    read_uint(buf, offset, 4).map(|raw| f32::from_bits(raw as u32))
}

/// Read a big-endian IEEE 754 double.
///
/// # Errors
///
/// [`WireError::UnexpectedEof`] if fewer than 8 bytes remain.
pub fn read_f64(buf: &[u8], offset: usize) -> Result<f64, WireError> {
    read_uint(buf, offset, 8).map(f64::from_bits)
}
