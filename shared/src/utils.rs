// Rounding and serialization helpers shared by every externally rendered model.
use serde::Serializer;

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

fn serialize_rounded<S: Serializer>(
    value: Option<f64>,
    decimals: u32,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    // Non-finite cells never reach the output as NaN or zero.
    match value {
        Some(v) if v.is_finite() => serializer.serialize_f64(round_to(v, decimals)),
        _ => serializer.serialize_none(),
    }
}

pub fn serialize_round2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serialize_rounded(Some(*value), 2, serializer)
}

pub fn serialize_round4<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serialize_rounded(Some(*value), 4, serializer)
}

pub fn serialize_opt_round2<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serialize_rounded(*value, 2, serializer)
}

pub fn serialize_opt_round4<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serialize_rounded(*value, 4, serializer)
}
