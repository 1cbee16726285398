#![warn(clippy::pedantic)]

pub mod be;
pub mod error;
pub mod marker;

pub use error::WireError;
pub use marker::Marker;
