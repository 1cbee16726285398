use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// Text encodings accepted by string extraction.
///
/// MessagePack `str` payloads are UTF-8 by convention, but older
/// producers wrote arbitrary "raw" bytes. A caller that knows what the
/// producer used can decode with the matching encoding.
///
/// ```text
/// ┌──────────┬─────────────┬──────────────────────────────────────┐
/// │ Encoding │ Label       │ Notes                                │
/// ├──────────┼─────────────┼──────────────────────────────────────┤
/// │ Utf8     │ utf-8       │ default                              │
/// │ Utf16Le  │ utf-16le    │ even byte count, surrogates checked  │
/// │ Utf16Be  │ utf-16be    │ even byte count, surrogates checked  │
/// │ Latin1   │ latin1      │ every byte maps to U+0000..=U+00FF   │
/// │ Ascii    │ ascii       │ bytes >= 0x80 are rejected           │
/// └──────────┴─────────────┴──────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextEncoding {
  #[default]
  Utf8,
  Utf16Le,
  Utf16Be,
  Latin1,
  Ascii,
}

impl TextEncoding {
  #[must_use]
  pub fn label(self) -> &'static str {
    match self {
      Self::Utf8 => "utf-8",
      Self::Utf16Le => "utf-16le",
      Self::Utf16Be => "utf-16be",
      Self::Latin1 => "latin1",
      Self::Ascii => "ascii",
    }
  }

  /// Decode `bytes` into a `String`.
  ///
  /// # Errors
  ///
  /// [`TypeError::InvalidText`] naming the offending byte position.
  pub fn decode(self, bytes: &[u8]) -> Result<String, TypeError> {
    match self {
      Self::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|e| TypeError::InvalidText {
        encoding: self,
        position: e.utf8_error().valid_up_to(),
      }),
      Self::Utf16Le | Self::Utf16Be => self.decode_utf16(bytes),
      Self::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
      Self::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
        Some(position) => Err(TypeError::InvalidText {
          encoding: self,
          position,
        }),
        None => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
      },
    }
  }

  fn decode_utf16(self, bytes: &[u8]) -> Result<String, TypeError> {
    if bytes.len() % 2 != 0 {
      return Err(TypeError::InvalidText {
        encoding: self,
        position: bytes.len() - 1,
      });
    }

    let units = bytes.chunks_exact(2).map(|pair| match self {
      Self::Utf16Le => u16::from_le_bytes([pair[0], pair[1]]),
      _ => u16::from_be_bytes([pair[0], pair[1]]),
    });

    let mut out = String::with_capacity(bytes.len() / 2);
    for decoded in char::decode_utf16(units) {
      match decoded {
        Ok(ch) => out.push(ch),
        // Position of the unpaired surrogate, in bytes.
        Err(_) => {
          let consumed_units: usize = out.chars().map(char::len_utf16).sum();
          return Err(TypeError::InvalidText {
            encoding: self,
            position: consumed_units * 2,
          });
        }
      }
    }
    Ok(out)
  }

  /// Encode `text` into bytes.
  ///
  /// # Errors
  ///
  /// [`TypeError::Unencodable`] if a character has no representation
  /// (anything above U+00FF for Latin-1, above U+007F for ASCII).
  pub fn encode(self, text: &str) -> Result<Vec<u8>, TypeError> {
    match self {
      Self::Utf8 => Ok(text.as_bytes().to_vec()),
      Self::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
      Self::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
      Self::Latin1 | Self::Ascii => {
        let limit = if self == Self::Latin1 { 0xff } else { 0x7f };
        text
          .chars()
          .map(|ch| {
            u8::try_from(u32::from(ch))
              .ok()
              .filter(|&b| u32::from(b) <= limit)
              .ok_or(TypeError::Unencodable { encoding: self, ch })
          })
          .collect()
      }
    }
  }
}

impl fmt::Display for TextEncoding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for TextEncoding {
  type Err = TypeError;

  fn from_str(label: &str) -> Result<Self, Self::Err> {
    match label.to_ascii_lowercase().as_str() {
      "utf-8" | "utf8" => Ok(Self::Utf8),
      "utf-16le" | "utf16le" => Ok(Self::Utf16Le),
      "utf-16be" | "utf16be" => Ok(Self::Utf16Be),
      "latin1" | "iso-8859-1" => Ok(Self::Latin1),
      "ascii" | "us-ascii" => Ok(Self::Ascii),
      _ => Err(TypeError::UnknownEncoding {
        label: label.to_string(),
      }),
    }
  }
}
