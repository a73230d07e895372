//! Integer money — `Mpec` minor units.
//!
//! Monetary amounts are stored as integer mpec to avoid float/decimal drift:
//! 1 PED = 100 PEC = 100 000 mpec. Chat-log values are decimal PED text, so
//! conversion multiplies by 100 000 — and refuses anything that does not land
//! exactly on the mpec grid.

use serde::{Deserialize, Serialize};

/// Number of mpec in one PED.
pub const MPEC_PER_PED: i64 = 100_000;

/// A monetary amount in integer mpec (1/100 000 PED).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Mpec(pub i64);

impl Mpec {
    /// Convert decimal PED text (e.g. `"0.1600"`) to mpec, exactly.
    ///
    /// Returns `None` if the text is not a plain non-negative decimal, if the
    /// value does not fit in `i64`, or if the conversion would lose precision
    /// (more than five significant fractional digits).
    pub fn from_ped_str(s: &str) -> Option<Self> {
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };

        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        // At most five fractional digits carry value; any further digits
        // must be zero or the amount is off-grid.
        let (frac_head, frac_tail) = if frac_part.len() > 5 {
            frac_part.split_at(5)
        } else {
            (frac_part, "")
        };
        if frac_tail.bytes().any(|b| b != b'0') {
            return None;
        }

        let whole: i64 = int_part.parse().ok()?;

        let mut frac: i64 = 0;
        for b in frac_head.bytes() {
            frac = frac * 10 + i64::from(b - b'0');
        }
        // Scale short fractions up to the 5-digit grid, e.g. ".16" -> 16000.
        for _ in frac_head.len()..5 {
            frac *= 10;
        }

        whole
            .checked_mul(MPEC_PER_PED)
            .and_then(|w| w.checked_add(frac))
            .map(Mpec)
    }

    /// The raw mpec count.
    pub fn raw(self) -> i64 {
        self.0
    }
}
