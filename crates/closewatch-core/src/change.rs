//! Percentage change and reporting precision.

/// Percentage change from `past` to `current`, rounded to 2 decimals.
///
/// Returns `None` when either side is missing or `past` is zero. Rounding is
/// half away from zero on `ratio * 10_000`.
pub fn change_rate(current: Option<f64>, past: Option<f64>) -> Option<f64> {
    let (current, past) = (current?, past?);
    if past == 0.0 {
        return None;
    }

    let ratio = (current - past) / past;
    Some((ratio * 10_000.0).round() / 100.0)
}

/// Reported price precision: 1 decimal.
pub fn round_price(price: f64) -> f64 {
    (price * 10.0).round() / 10.0
}
