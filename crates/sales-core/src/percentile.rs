// ── Percentile helper ─────────────────────────────────────────────────────────

/// Compute the `p`-th percentile of a **sorted** slice using standard linear
/// interpolation (the same algorithm used by NumPy's `percentile` function).
///
/// Returns `None` for an empty slice.
pub fn percentile(sorted_data: &[f64], p: f64) -> Option<f64> {
    let len = sorted_data.len();
    if len == 0 {
        return None;
    }
    if len == 1 {
        return Some(sorted_data[0]);
    }
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (len as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted_data[lo]);
    }
    let frac = rank - lo as f64;
    Some(sorted_data[lo] + frac * (sorted_data[hi] - sorted_data[lo]))
}

/// Copy `values`, drop NaNs and sort ascending, ready for [`percentile`].
pub fn sorted_finite(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.into_iter().filter(|x| !x.is_nan()).collect();
    v.sort_by(f64::total_cmp);
    v
}

// ── PercentileBounds ──────────────────────────────────────────────────────────

/// Lower / upper clip bounds derived from a column's percentiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentileBounds {
    pub lower: f64,
    pub upper: f64,
}

impl PercentileBounds {
    /// Bounds at the `lo`-th and `hi`-th percentile of `sorted_data`.
    pub fn of(sorted_data: &[f64], lo: f64, hi: f64) -> Option<Self> {
        Some(Self {
            lower: percentile(sorted_data, lo)?,
            upper: percentile(sorted_data, hi)?,
        })
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
