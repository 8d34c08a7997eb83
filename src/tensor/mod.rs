//! Decoding of serialized (ONNX `TensorProto`) tensors into dense `f64` buffers.

pub mod dtype;
pub mod proto;

use std::fs;
use std::path::Path;

use half::{bf16, f16};
use log::debug;
use prost::Message;

pub use dtype::DataType;
pub use proto::TensorProto;

use crate::error::{ConvertError, DecodeError};
use proto::DATA_LOCATION_EXTERNAL;

#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    pub name: String,
    pub dtype: DataType,
    pub dims: Vec<i64>,
    /// Flat row-major values.
    pub values: Vec<f64>,
}

impl Tensor {
    pub fn from_proto(p: TensorProto) -> Result<Self, DecodeError> {
        let dtype = DataType::from_i32(p.data_type).ok_or(DecodeError::UnknownDataType(p.data_type))?;
        if !dtype.is_numeric() {
            return Err(DecodeError::UnsupportedDataType(dtype));
        }
        if p.data_location == DATA_LOCATION_EXTERNAL {
            return Err(DecodeError::ExternalData);
        }
        if let Some(seg) = &p.segment {
            return Err(DecodeError::Segmented { begin: seg.begin, end: seg.end });
        }
        let expected = shape_elements(&p.dims)?;
        let values = if p.raw_data.is_empty() {
            typed_values(dtype, &p)
        } else {
            raw_values(dtype, &p.raw_data)?
        };
        if values.len() != expected {
            return Err(DecodeError::LengthMismatch { expected, actual: values.len() });
        }
        Ok(Self { name: p.name, dtype, dims: p.dims, values })
    }

    pub fn element_count(&self) -> usize {
        self.values.len()
    }

    /// (min, max) over all values, `None` for an empty tensor.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut it = self.values.iter().copied();
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

/// Number of elements described by `dims`. No dims means a scalar.
pub fn shape_elements(dims: &[i64]) -> Result<usize, DecodeError> {
    dims.iter().try_fold(1usize, |acc, &d| {
        if d < 0 {
            return Err(DecodeError::NegativeDim(d));
        }
        acc.checked_mul(d as usize).ok_or(DecodeError::DimsOverflow)
    })
}

pub fn decode_tensor(bytes: &[u8]) -> Result<Tensor, DecodeError> {
    let proto = TensorProto::decode(bytes)?;
    Tensor::from_proto(proto)
}

/// Read a whole tensor file and decode it.
pub fn load_tensor<P: AsRef<Path>>(path: P) -> Result<Tensor, ConvertError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| ConvertError::Read { path: path.to_path_buf(), source })?;
    debug!("read {} bytes from {}", bytes.len(), path.display());
    decode_tensor(&bytes).map_err(|source| ConvertError::Decode { path: path.to_path_buf(), source })
}

fn le<const N: usize>(c: &[u8]) -> [u8; N] {
    let mut b = [0u8; N];
    b.copy_from_slice(c);
    b
}

fn raw_values(dtype: DataType, raw: &[u8]) -> Result<Vec<f64>, DecodeError> {
    // is_numeric() was checked by the caller
    let width = dtype.raw_width().ok_or(DecodeError::UnsupportedDataType(dtype))?;
    if raw.len() % width != 0 {
        return Err(DecodeError::RawDataSize { len: raw.len(), width });
    }
    let chunks = raw.chunks_exact(width);
    let values = match dtype {
        DataType::Float => chunks.map(|c| f32::from_le_bytes(le(c)) as f64).collect(),
        DataType::Double => chunks.map(|c| f64::from_le_bytes(le(c))).collect(),
        DataType::Float16 => chunks.map(|c| f16::from_le_bytes(le(c)).to_f64()).collect(),
        DataType::Bfloat16 => chunks.map(|c| bf16::from_le_bytes(le(c)).to_f64()).collect(),
        DataType::Int8 => chunks.map(|c| c[0] as i8 as f64).collect(),
        DataType::Uint8 => chunks.map(|c| c[0] as f64).collect(),
        DataType::Bool => chunks.map(|c| if c[0] != 0 { 1.0 } else { 0.0 }).collect(),
        DataType::Int16 => chunks.map(|c| i16::from_le_bytes(le(c)) as f64).collect(),
        DataType::Uint16 => chunks.map(|c| u16::from_le_bytes(le(c)) as f64).collect(),
        DataType::Int32 => chunks.map(|c| i32::from_le_bytes(le(c)) as f64).collect(),
        DataType::Uint32 => chunks.map(|c| u32::from_le_bytes(le(c)) as f64).collect(),
        DataType::Int64 => chunks.map(|c| i64::from_le_bytes(le(c)) as f64).collect(),
        DataType::Uint64 => chunks.map(|c| u64::from_le_bytes(le(c)) as f64).collect(),
        DataType::Undefined | DataType::String | DataType::Complex64 | DataType::Complex128 => {
            return Err(DecodeError::UnsupportedDataType(dtype))
        }
    };
    Ok(values)
}

// Typed repeated fields follow the ONNX storage rules: narrow integers and
// half-precision bit patterns are widened into int32_data.
fn typed_values(dtype: DataType, p: &TensorProto) -> Vec<f64> {
    match dtype {
        DataType::Float => p.float_data.iter().map(|&v| v as f64).collect(),
        DataType::Double => p.double_data.clone(),
        DataType::Float16 => p.int32_data.iter().map(|&v| f16::from_bits(v as u16).to_f64()).collect(),
        DataType::Bfloat16 => p.int32_data.iter().map(|&v| bf16::from_bits(v as u16).to_f64()).collect(),
        DataType::Bool => p.int32_data.iter().map(|&v| if v != 0 { 1.0 } else { 0.0 }).collect(),
        DataType::Int8 | DataType::Uint8 | DataType::Int16 | DataType::Uint16 | DataType::Int32 => {
            p.int32_data.iter().map(|&v| v as f64).collect()
        }
        DataType::Int64 => p.int64_data.iter().map(|&v| v as f64).collect(),
        DataType::Uint32 | DataType::Uint64 => p.uint64_data.iter().map(|&v| v as f64).collect(),
        DataType::Undefined | DataType::String | DataType::Complex64 | DataType::Complex128 => Vec::new(),
    }
}
