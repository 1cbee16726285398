//! MessagePack decoding primitives over a [`ByteView`].
//!
//! Parsing works on a plain slice and never blocks. When a parse comes
//! up short it reports the exact total byte count it needs, and the
//! caller asks the view to pull that many bytes before parsing again.
//!
//! ```text
//!   view.available() ──parse──▶ Step::Done(value, used) ──▶ view.consume(used)
//!                          │
//!                          └───▶ Step::NeedMore(n) ──▶ view.fill_to(n) ──▶ parse again
//! ```
//!
//! Two entry families sit on top:
//!
//! - [`try_decode_one`] for the lazy sequence: running out of bytes is
//!   [`Decoded::Incomplete`], never an error.
//! - `read_*` for direct extraction: a marker that does not match the
//!   requested shape is [`UnpackError::TypeMismatch`], running out of
//!   bytes is [`UnpackError::Truncated`]. Neither consumes anything.

use mpk_types::{Shape, TextEncoding, Value};
use mpk_wire::be;
use mpk_wire::{Marker, WireError};

use crate::config::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH};
use crate::error::UnpackError;
use crate::view::ByteView;

/// Decoder safety limits, checked before allocating or reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
  /// Largest declared str/bin/ext length or array/map count.
  pub max_length: usize,
  /// Deepest container nesting.
  pub max_depth: usize,
}

impl Default for Limits {
  fn default() -> Self {
    Self {
      max_length: DEFAULT_MAX_LENGTH,
      max_depth: DEFAULT_MAX_DEPTH,
    }
  }
}

/// Outcome of one lazy decode attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum Decoded {
  /// A complete value was decoded and its bytes consumed.
  Value(Value),
  /// The view ran out before a complete value. Nothing was consumed.
  Incomplete,
}

/// Result of a slice parse.
enum Step<T> {
  /// Parsed value and the offset just past it.
  Done(T, usize),
  /// Total bytes the slice must hold before the parse can progress.
  NeedMore(usize),
}

/// Unwrap a `Step::Done` or return the `NeedMore` from the enclosing fn.
macro_rules! step {
  ($e:expr) => {
    match $e {
      Step::Done(value, next) => (value, next),
      Step::NeedMore(needed) => return Ok(Step::NeedMore(needed)),
    }
  };
}

/// A marker plus its fixed-width prefix, without any payload.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Head {
  Nil,
  Bool(bool),
  UInt(u64),
  Int(i64),
  F32(f32),
  F64(f64),
  Str(u32),
  Bin(u32),
  Array(u32),
  Map(u32),
  Ext(i8, u32),
}

fn read_len(buf: &[u8], offset: usize, width: usize) -> Result<u32, WireError> {
  let raw = be::read_uint(buf, offset, width)?;
  u32::try_from(raw).map_err(|_| WireError::IntegerOverflow { target: "u32" })
}

fn check_len(len: u32, limits: Limits) -> Result<u32, WireError> {
  let declared = len as usize;
  if declared > limits.max_length {
    return Err(WireError::LengthLimit {
      len: declared,
      limit: limits.max_length,
    });
  }
  Ok(len)
}

/// Parse the marker and prefix starting at `offset`.
fn head_at(buf: &[u8], offset: usize, limits: Limits) -> Result<Step<Head>, WireError> {
  let Some(&byte) = buf.get(offset) else {
    return Ok(Step::NeedMore(offset + 1));
  };
  let marker = Marker::from_u8(byte);
  let p = offset + 1;
  let next = p + marker.prefix_len();
  if buf.len() < next {
    return Ok(Step::NeedMore(next));
  }

  let head = match marker {
    Marker::PosFixInt(n) => Head::UInt(u64::from(n)),
    Marker::NegFixInt(n) => Head::Int(i64::from(n)),
    Marker::Nil => Head::Nil,
    Marker::Reserved => return Err(WireError::ReservedMarker { offset }),
    Marker::False => Head::Bool(false),
    Marker::True => Head::Bool(true),
    Marker::U8 | Marker::U16 | Marker::U32 | Marker::U64 => {
      Head::UInt(be::read_uint(buf, p, marker.prefix_len())?)
    }
    Marker::I8 | Marker::I16 | Marker::I32 | Marker::I64 => {
      Head::Int(be::read_int(buf, p, marker.prefix_len())?)
    }
    Marker::F32 => Head::F32(be::read_f32(buf, p)?),
    Marker::F64 => Head::F64(be::read_f64(buf, p)?),
    Marker::FixStr(n) => Head::Str(check_len(u32::from(n), limits)?),
    Marker::Str8 | Marker::Str16 | Marker::Str32 => {
      Head::Str(check_len(read_len(buf, p, marker.prefix_len())?, limits)?)
    }
    Marker::Bin8 | Marker::Bin16 | Marker::Bin32 => {
      Head::Bin(check_len(read_len(buf, p, marker.prefix_len())?, limits)?)
    }
    Marker::FixArray(n) => Head::Array(check_len(u32::from(n), limits)?),
    Marker::Array16 | Marker::Array32 => {
      Head::Array(check_len(read_len(buf, p, marker.prefix_len())?, limits)?)
    }
    Marker::FixMap(n) => Head::Map(check_len(u32::from(n), limits)?),
    Marker::Map16 | Marker::Map32 => {
      Head::Map(check_len(read_len(buf, p, marker.prefix_len())?, limits)?)
    }
    Marker::FixExt1 | Marker::FixExt2 | Marker::FixExt4 | Marker::FixExt8 | Marker::FixExt16 => {
      let len = marker.fixext_len().unwrap_or_default();
      Head::Ext(i8::from_be_bytes([buf[p]]), check_len(len, limits)?)
    }
    Marker::Ext8 | Marker::Ext16 | Marker::Ext32 => {
      // length first, then the type byte
      let width = marker.prefix_len() - 1;
      let len = check_len(read_len(buf, p, width)?, limits)?;
      Head::Ext(i8::from_be_bytes([buf[p + width]]), len)
    }
  };
  Ok(Step::Done(head, next))
}

fn payload_at(buf: &[u8], offset: usize, len: u32) -> Step<&[u8]> {
  let end = offset + len as usize;
  match buf.get(offset..end) {
    Some(payload) => Step::Done(payload, end),
    None => Step::NeedMore(end),
  }
}

/// Parse one complete value starting at `offset`.
fn value_at(buf: &[u8], offset: usize, limits: Limits, depth: usize) -> Result<Step<Value>, WireError> {
  let (head, mut pos) = step!(head_at(buf, offset, limits)?);
  let value = match head {
    Head::Nil => Value::Nil,
    Head::Bool(b) => Value::Bool(b),
    Head::UInt(n) => Value::UInt(n),
    Head::Int(n) => Value::integer(n),
    Head::F32(x) => Value::F32(x),
    Head::F64(x) => Value::F64(x),
    Head::Str(len) => {
      let (payload, next) = step!(payload_at(buf, pos, len));
      pos = next;
      Value::Str(payload.to_vec())
    }
    Head::Bin(len) => {
      let (payload, next) = step!(payload_at(buf, pos, len));
      pos = next;
      Value::Bin(payload.to_vec())
    }
    Head::Ext(type_id, len) => {
      let (payload, next) = step!(payload_at(buf, pos, len));
      pos = next;
      Value::Ext {
        type_id,
        data: payload.to_vec(),
      }
    }
    Head::Array(count) => {
      enter(depth, limits)?;
      let count = count as usize;
      // every element takes at least one byte
      if buf.len() < pos + count {
        return Ok(Step::NeedMore(pos + count));
      }
      let mut items = Vec::with_capacity(count);
      for i in 0..count {
        match value_at(buf, pos, limits, depth + 1)? {
          Step::Done(item, next) => {
            items.push(item);
            pos = next;
          }
          Step::NeedMore(needed) => return Ok(Step::NeedMore(needed + (count - i - 1))),
        }
      }
      Value::Array(items)
    }
    Head::Map(count) => {
      enter(depth, limits)?;
      let count = count as usize;
      if buf.len() < pos + 2 * count {
        return Ok(Step::NeedMore(pos + 2 * count));
      }
      let mut entries = Vec::with_capacity(count);
      for i in 0..count {
        let after = 2 * (count - i - 1);
        let key = match value_at(buf, pos, limits, depth + 1)? {
          Step::Done(key, next) => {
            pos = next;
            key
          }
          Step::NeedMore(needed) => return Ok(Step::NeedMore(needed + 1 + after)),
        };
        let value = match value_at(buf, pos, limits, depth + 1)? {
          Step::Done(value, next) => {
            pos = next;
            value
          }
          Step::NeedMore(needed) => return Ok(Step::NeedMore(needed + after)),
        };
        entries.push((key, value));
      }
      Value::Map(entries)
    }
  };
  Ok(Step::Done(value, pos))
}

fn enter(depth: usize, limits: Limits) -> Result<(), WireError> {
  if depth >= limits.max_depth {
    return Err(WireError::DepthLimit {
      limit: limits.max_depth,
    });
  }
  Ok(())
}

/// Decode one value from the front of `view`, pulling bytes as needed.
///
/// # Errors
///
/// Corrupt input ([`WireError`]) or a stream read failure. Running out of
/// bytes is `Ok(Decoded::Incomplete)`.
pub fn try_decode_one(view: &mut ByteView<'_>, limits: Limits) -> Result<Decoded, UnpackError> {
  loop {
    match value_at(view.available(), 0, limits, 0)? {
      Step::Done(value, used) => {
        view.consume(used);
        return Ok(Decoded::Value(value));
      }
      Step::NeedMore(needed) => {
        if !view.fill_to(needed)? {
          return Ok(Decoded::Incomplete);
        }
      }
    }
  }
}

/// Check the leading marker against `shape` without consuming it.
fn expect(view: &mut ByteView<'_>, shape: Shape) -> Result<Marker, UnpackError> {
  if !view.fill_to(1)? {
    return Err(UnpackError::Truncated {
      needed: 1,
      available: 0,
    });
  }
  let marker = Marker::from_u8(view.available()[0]);
  if marker == Marker::Reserved {
    return Err(WireError::ReservedMarker { offset: 0 }.into());
  }
  if !shape.accepts(marker) {
    return Err(mismatch(shape, marker));
  }
  Ok(marker)
}

fn mismatch(expected: Shape, marker: Marker) -> UnpackError {
  UnpackError::TypeMismatch {
    expected,
    found: marker.family(),
  }
}

/// Drive `parse` until it completes, then consume what it used.
fn run<T>(
  view: &mut ByteView<'_>,
  mut parse: impl FnMut(&[u8]) -> Result<Step<T>, UnpackError>,
) -> Result<T, UnpackError> {
  loop {
    match parse(view.available())? {
      Step::Done(value, used) => {
        view.consume(used);
        return Ok(value);
      }
      Step::NeedMore(needed) => {
        if !view.fill_to(needed)? {
          return Err(UnpackError::Truncated {
            needed,
            available: view.len(),
          });
        }
      }
    }
  }
}

/// Read a head of the expected shape and map it with `pick`.
fn read_head<T>(
  view: &mut ByteView<'_>,
  limits: Limits,
  shape: Shape,
  pick: impl Fn(Head) -> Option<T>,
) -> Result<T, UnpackError> {
  let marker = expect(view, shape)?;
  run(view, |buf| {
    let (head, next) = step!(head_at(buf, 0, limits)?);
    pick(head)
      .map(|value| Step::Done(value, next))
      .ok_or_else(|| mismatch(shape, marker))
  })
}

/// Element count of an array. The cursor is left on the first element.
///
/// # Errors
///
/// `TypeMismatch`, `Truncated`, or a wire error.
pub fn read_array_len(view: &mut ByteView<'_>, limits: Limits) -> Result<u32, UnpackError> {
  read_head(view, limits, Shape::Array, |head| match head {
    Head::Array(n) => Some(n),
    _ => None,
  })
}

/// Entry count of a map. The cursor is left on the first key.
///
/// # Errors
///
/// `TypeMismatch`, `Truncated`, or a wire error.
pub fn read_map_len(view: &mut ByteView<'_>, limits: Limits) -> Result<u32, UnpackError> {
  read_head(view, limits, Shape::Map, |head| match head {
    Head::Map(n) => Some(n),
    _ => None,
  })
}

/// Payload length of a str or bin. The cursor is left on the payload.
///
/// # Errors
///
/// `TypeMismatch`, `Truncated`, or a wire error.
pub fn read_raw_len(view: &mut ByteView<'_>, limits: Limits) -> Result<u32, UnpackError> {
  read_head(view, limits, Shape::Raw, |head| match head {
    Head::Str(n) | Head::Bin(n) => Some(n),
    _ => None,
  })
}

/// # Errors
///
/// `TypeMismatch` if the value is not nil, `Truncated` if the view is empty.
pub fn read_nil(view: &mut ByteView<'_>, limits: Limits) -> Result<(), UnpackError> {
  read_head(view, limits, Shape::Nil, |head| match head {
    Head::Nil => Some(()),
    _ => None,
  })
}

/// Consume a nil if one is at the cursor. Anything else, including an
/// empty view, is left in place and reported as `false`.
///
/// # Errors
///
/// Only a stream read failure.
pub fn skip_nil(view: &mut ByteView<'_>) -> Result<bool, UnpackError> {
  if !view.fill_to(1)? || Marker::from_u8(view.available()[0]) != Marker::Nil {
    return Ok(false);
  }
  view.consume(1);
  Ok(true)
}

/// # Errors
///
/// `TypeMismatch` if the value is not a boolean, `Truncated` if the view
/// is empty.
pub fn read_bool(view: &mut ByteView<'_>, limits: Limits) -> Result<bool, UnpackError> {
  read_head(view, limits, Shape::Boolean, |head| match head {
    Head::Bool(b) => Some(b),
    _ => None,
  })
}

/// Read a complete str or bin and hand its payload to `finish`, which
/// runs before anything is consumed.
fn read_payload<T>(
  view: &mut ByteView<'_>,
  limits: Limits,
  finish: impl Fn(&[u8]) -> Result<T, UnpackError>,
) -> Result<T, UnpackError> {
  let marker = expect(view, Shape::Raw)?;
  run(view, |buf| {
    let (head, pos) = step!(head_at(buf, 0, limits)?);
    let (Head::Str(len) | Head::Bin(len)) = head else {
      return Err(mismatch(Shape::Raw, marker));
    };
    let (payload, next) = step!(payload_at(buf, pos, len));
    Ok(Step::Done(finish(payload)?, next))
  })
}

/// Payload bytes of a str or bin.
///
/// # Errors
///
/// `TypeMismatch`, `Truncated`, or a wire error.
pub fn read_raw(view: &mut ByteView<'_>, limits: Limits) -> Result<Vec<u8>, UnpackError> {
  read_payload(view, limits, |payload| Ok(payload.to_vec()))
}

/// Payload of a str or bin decoded as text. Invalid text leaves the
/// value unconsumed.
///
/// # Errors
///
/// `TypeMismatch`, `Truncated`, `Text`, or a wire error.
pub fn read_str(
  view: &mut ByteView<'_>,
  limits: Limits,
  encoding: TextEncoding,
) -> Result<String, UnpackError> {
  read_payload(view, limits, |payload| Ok(encoding.decode(payload)?))
}

/// Any single value.
///
/// # Errors
///
/// `Truncated` or a wire error. Never `TypeMismatch`.
pub fn read_value(view: &mut ByteView<'_>, limits: Limits) -> Result<Value, UnpackError> {
  expect(view, Shape::Any)?;
  run(view, |buf| Ok(value_at(buf, 0, limits, 0)?))
}

/// Any integer that fits `u64`.
///
/// # Errors
///
/// `TypeMismatch`, `Truncated`, or `IntegerOverflow` for a negative value.
pub fn read_u64(view: &mut ByteView<'_>, limits: Limits) -> Result<u64, UnpackError> {
  let marker = expect(view, Shape::Integer)?;
  run(view, |buf| {
    let (head, next) = step!(head_at(buf, 0, limits)?);
    let n = match head {
      Head::UInt(n) => n,
      Head::Int(n) => u64::try_from(n).map_err(|_| WireError::IntegerOverflow { target: "u64" })?,
      _ => return Err(mismatch(Shape::Integer, marker)),
    };
    Ok(Step::Done(n, next))
  })
}

/// Any integer that fits `i64`.
///
/// # Errors
///
/// `TypeMismatch`, `Truncated`, or `IntegerOverflow` above `i64::MAX`.
pub fn read_i64(view: &mut ByteView<'_>, limits: Limits) -> Result<i64, UnpackError> {
  let marker = expect(view, Shape::Integer)?;
  run(view, |buf| {
    let (head, next) = step!(head_at(buf, 0, limits)?);
    let n = match head {
      Head::Int(n) => n,
      Head::UInt(n) => i64::try_from(n).map_err(|_| WireError::IntegerOverflow { target: "i64" })?,
      _ => return Err(mismatch(Shape::Integer, marker)),
    };
    Ok(Step::Done(n, next))
  })
}

/// A float32 (widened) or float64.
///
/// # Errors
///
/// `TypeMismatch` or `Truncated`.
pub fn read_f64(view: &mut ByteView<'_>, limits: Limits) -> Result<f64, UnpackError> {
  read_head(view, limits, Shape::Float, |head| match head {
    Head::F32(x) => Some(f64::from(x)),
    Head::F64(x) => Some(x),
    _ => None,
  })
}

/// Type id and payload of an extension value.
///
/// # Errors
///
/// `TypeMismatch`, `Truncated`, or a wire error.
pub fn read_ext(view: &mut ByteView<'_>, limits: Limits) -> Result<(i8, Vec<u8>), UnpackError> {
  let marker = expect(view, Shape::Ext)?;
  run(view, |buf| {
    let (head, pos) = step!(head_at(buf, 0, limits)?);
    let Head::Ext(type_id, len) = head else {
      return Err(mismatch(Shape::Ext, marker));
    };
    let (payload, next) = step!(payload_at(buf, pos, len));
    Ok(Step::Done((type_id, payload.to_vec()), next))
  })
}
