//! Quantization of real values into signed Q-format int16.
use clap::ValueEnum;
use serde::Serialize;

use crate::error::ConvertError;

/// Fractional bits used by the downstream int16 tensors (Q8.8).
pub const DEFAULT_FIXED_POINT_POS: u8 = 8;
pub const MAX_FIXED_POINT_POS: u8 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    /// Toward zero, like a plain float-to-int cast.
    #[default]
    Truncate,
    /// Half away from zero.
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantParams {
    pub scale: f64,
    pub fixed_point_pos: u8,
    pub rounding: Rounding,
}

impl Default for QuantParams {
    fn default() -> Self {
        Self { scale: 1.0, fixed_point_pos: DEFAULT_FIXED_POINT_POS, rounding: Rounding::Truncate }
    }
}

impl QuantParams {
    pub fn with_scale(scale: f64) -> Self {
        Self { scale, ..Self::default() }
    }

    pub fn validate(&self) -> Result<(), ConvertError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConvertError::InvalidScale(self.scale));
        }
        if self.fixed_point_pos > MAX_FIXED_POINT_POS {
            return Err(ConvertError::InvalidFixedPoint(self.fixed_point_pos));
        }
        Ok(())
    }

    /// 2^fixed_point_pos, i.e. 256 for Q8.8.
    pub fn multiplier(&self) -> f64 {
        2f64.powi(self.fixed_point_pos as i32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantized {
    pub data: Vec<i16>,
    /// Elements whose scaled value fell outside [-32768, 32767] and were clamped.
    pub saturated: usize,
}

impl Quantized {
    pub fn range(&self) -> Option<(i16, i16)> {
        let lo = self.data.iter().copied().min()?;
        let hi = self.data.iter().copied().max()?;
        Some((lo, hi))
    }
}

/// Scale one value and narrow it to i16.
///
/// The float-to-int `as` cast saturates at the i16 bounds and maps NaN to 0.
#[inline]
pub fn quantize_one(v: f64, multiplier: f64, scale: f64, rounding: Rounding) -> (i16, bool) {
    let s = v * multiplier * scale;
    let r = match rounding {
        Rounding::Truncate => s.trunc(),
        Rounding::Nearest => s.round(),
    };
    let clipped = r < i16::MIN as f64 || r > i16::MAX as f64;
    (r as i16, clipped)
}

pub fn quantize_i16(values: &[f64], params: &QuantParams) -> Quantized {
    let m = params.multiplier();
    let mut saturated = 0usize;
    let data = values
        .iter()
        .map(|&v| {
            let (q, clipped) = quantize_one(v, m, params.scale, params.rounding);
            saturated += clipped as usize;
            q
        })
        .collect();
    Quantized { data, saturated }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn q8_8_reference_values() {
        let q = quantize_i16(&[0.5, -0.5, 2.0], &QuantParams::default());
        assert_eq!(q.data, vec![128, -128, 512]);
        assert_eq!(q.saturated, 0);
    }

    #[test]
    fn scale_factor_multiplies() {
        let q = quantize_i16(&[0.5, -0.25], &QuantParams::with_scale(2.0));
        assert_eq!(q.data, vec![256, -128]);
    }

    #[test]
    fn truncate_goes_toward_zero() {
        // 0.0039 * 256 = 0.998..., -0.0039 * 256 = -0.998...
        let q = quantize_i16(&[0.0039, -0.0039, 1.999 / 256.0], &QuantParams::default());
        assert_eq!(q.data, vec![0, 0, 1]);
    }

    #[test]
    fn nearest_rounds_half_away_from_zero() {
        let p = QuantParams { rounding: Rounding::Nearest, ..QuantParams::default() };
        let q = quantize_i16(&[0.5 / 256.0, -0.5 / 256.0, 1.4 / 256.0], &p);
        assert_eq!(q.data, vec![1, -1, 1]);
    }

    #[test]
    fn out_of_range_saturates_and_is_counted() {
        let q = quantize_i16(&[200.0, -200.0, 127.99, f64::NAN], &QuantParams::default());
        assert_eq!(q.data, vec![i16::MAX, i16::MIN, 32765, 0]);
        assert_eq!(q.saturated, 2);
    }

    #[test]
    fn exact_bounds_are_not_saturated() {
        let q = quantize_i16(&[-128.0, 32767.0 / 256.0], &QuantParams::default());
        assert_eq!(q.data, vec![i16::MIN, i16::MAX]);
        assert_eq!(q.saturated, 0);
    }

    #[test]
    fn fixed_point_position_sets_multiplier() {
        let p = QuantParams { fixed_point_pos: 0, ..QuantParams::default() };
        assert_eq!(p.multiplier(), 1.0);
        assert_eq!(QuantParams::default().multiplier(), 256.0);
        assert_eq!(quantize_i16(&[3.7], &p).data, vec![3]);
    }

    #[test]
    fn unvalidated_wide_fixed_point_saturates() {
        let p = QuantParams { fixed_point_pos: 40, ..QuantParams::default() };
        assert_eq!(p.multiplier(), 1099511627776.0);
        let q = quantize_i16(&[1.0, 0.0], &p);
        assert_eq!(q.data, vec![i16::MAX, 0]);
        assert_eq!(q.saturated, 1);
    }

    #[test]
    fn validate_rejects_bad_params() {
        assert!(QuantParams::with_scale(0.0).validate().is_err());
        assert!(QuantParams::with_scale(-1.0).validate().is_err());
        assert!(QuantParams::with_scale(f64::INFINITY).validate().is_err());
        let p = QuantParams { fixed_point_pos: 16, ..QuantParams::default() };
        assert!(matches!(p.validate(), Err(ConvertError::InvalidFixedPoint(16))));
        assert!(QuantParams::default().validate().is_ok());
    }
}
