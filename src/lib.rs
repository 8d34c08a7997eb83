// Serialized tensor -> raw Q8.8 int16 converter
pub mod convert;
pub mod error;
pub mod quant;
pub mod raw;
pub mod tensor;

pub use convert::{convert, ConvertOptions, ConvertReport};
pub use error::{ConvertError, DecodeError};
pub use quant::{QuantParams, Rounding};
