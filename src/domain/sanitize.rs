//! Non-finite value sanitation.
//!
//! Operators call one of these on their input before any loop-carried or
//! windowed computation so that infinities never propagate through a
//! recurrence. Each returns a fresh vector; inputs are not touched.

/// `+Inf`/`-Inf` become NaN. NaN passes through.
pub fn infinite_to_nan(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|&v| if v.is_infinite() { f64::NAN } else { v })
        .collect()
}

/// `+Inf`/`-Inf` become 0. NaN passes through.
pub fn infinite_to_zero(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|&v| if v.is_infinite() { 0.0 } else { v })
        .collect()
}

/// NaN, `+Inf` and `-Inf` all become 0.
pub fn non_finite_to_zero(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|&v| if v.is_finite() { v } else { 0.0 })
        .collect()
}
