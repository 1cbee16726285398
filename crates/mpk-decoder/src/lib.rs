#![warn(clippy::pedantic)]

pub mod chain;
pub mod config;
pub mod engine;
pub mod error;
pub mod source;
pub mod stream;
pub mod unpacker;
pub mod values;
pub mod view;

pub use chain::SourceChain;
pub use config::{UnpackerConfig, DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH};
pub use engine::{Decoded, Limits};
pub use error::{ReleaseFailure, UnpackError};
pub use source::Source;
pub use stream::ByteStream;
pub use unpacker::Unpacker;
pub use values::Values;
pub use view::ByteView;
