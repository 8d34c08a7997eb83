use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::tensor::DataType;

/// Reasons a byte buffer is not a usable serialized tensor.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed tensor message: {0}")]
    Protobuf(#[from] prost::DecodeError),
    #[error("unknown tensor data_type {0}")]
    UnknownDataType(i32),
    #[error("tensor data_type {0} cannot be quantized")]
    UnsupportedDataType(DataType),
    #[error("tensor payload is stored externally")]
    ExternalData,
    #[error("tensor is segment [{begin}, {end}) of a larger tensor")]
    Segmented { begin: i64, end: i64 },
    #[error("negative dimension {0}")]
    NegativeDim(i64),
    #[error("dimensions overflow the addressable element count")]
    DimsOverflow,
    #[error("raw_data holds {len} bytes, not a multiple of the {width}-byte element")]
    RawDataSize { len: usize, width: usize },
    #[error("shape expects {expected} elements but payload holds {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Failures of a single tensor conversion. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("scale factor must be a positive finite number, got {0}")]
    InvalidScale(f64),
    #[error("fixed point position must be in 0..=15, got {0}")]
    InvalidFixedPoint(u8),
    #[error("cannot read tensor file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot decode tensor file {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("{saturated} of {total} values fall outside the int16 range")]
    OutOfRange { saturated: usize, total: usize },
    #[error("cannot write raw file {}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
