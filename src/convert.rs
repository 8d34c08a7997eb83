//! One tensor file in, one raw int16 file out.
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use crate::error::ConvertError;
use crate::quant::{quantize_i16, QuantParams, Rounding};
use crate::raw::write_raw_i16_to;
use crate::tensor::load_tensor;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    pub params: QuantParams,
    /// Fail instead of clamping when a value does not fit in int16.
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub name: String,
    pub data_type: String,
    pub dims: Vec<i64>,
    pub elements: usize,
    pub bytes_written: u64,
    pub scale: f64,
    pub multiplier: f64,
    pub rounding: Rounding,
    pub saturated: usize,
    pub min: Option<i16>,
    pub max: Option<i16>,
}

pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q, opts: &ConvertOptions) -> Result<ConvertReport, ConvertError> {
    let (input, output) = (input.as_ref(), output.as_ref());
    opts.params.validate()?;

    let tensor = load_tensor(input)?;
    debug!("loaded {:?} {} dims={:?} ({} elements)", tensor.name, tensor.dtype, tensor.dims, tensor.element_count());

    let q = quantize_i16(&tensor.values, &opts.params);
    debug!("scaled by {} x {} ({:?})", opts.params.multiplier(), opts.params.scale, opts.params.rounding);
    if q.saturated > 0 {
        if opts.strict {
            return Err(ConvertError::OutOfRange { saturated: q.saturated, total: q.data.len() });
        }
        warn!("{} of {} values saturated to the int16 range", q.saturated, q.data.len());
    }

    let file = File::create(output).map_err(|source| ConvertError::FileWrite { path: output.to_path_buf(), source })?;
    let bytes_written = match write_raw_i16_to(file, &q.data) {
        Ok(n) => n,
        Err(source) => {
            // the file is ours now; don't leave a truncated buffer behind
            if let Err(e) = fs::remove_file(output) {
                warn!("could not remove partial output {}: {}", output.display(), e);
            }
            return Err(ConvertError::FileWrite { path: output.to_path_buf(), source });
        }
    };
    info!("wrote {} bytes to {}", bytes_written, output.display());

    let range = q.range();
    Ok(ConvertReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        name: tensor.name,
        data_type: tensor.dtype.to_string(),
        dims: tensor.dims,
        elements: q.data.len(),
        bytes_written,
        scale: opts.params.scale,
        multiplier: opts.params.multiplier(),
        rounding: opts.params.rounding,
        saturated: q.saturated,
        min: range.map(|r| r.0),
        max: range.map(|r| r.1),
    })
}
