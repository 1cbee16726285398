#![warn(clippy::pedantic)]

pub mod error;
pub mod packer;

pub use error::EncodeError;
pub use packer::{pack, Packer};
