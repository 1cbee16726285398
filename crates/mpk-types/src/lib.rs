#![warn(clippy::pedantic)]

pub mod error;
pub mod shape;
pub mod text;
pub mod value;

pub use error::TypeError;
pub use shape::Shape;
pub use text::TextEncoding;
pub use value::Value;
