//! Deciding what a crop reference should point at.

use crate::models::Crop;

/// Maximum relative width difference, in percent, for an existing crop to
/// stand in for a referenced one.
pub const DEFAULT_TOLERANCE: f64 = 35.0;

/// Which crop to use when several are within tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Selection {
    /// The last qualifying crop in discovery order. Existing deployments
    /// were rewritten with this rule.
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "last-qualifying"))]
    Last,
    /// The qualifying crop with the smallest width difference; the earliest
    /// one on ties.
    Closest,
}

/// The outcome of comparing a referenced crop against the existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// An existing crop has the same width and height; leave it alone.
    Exact,
    /// No exact crop, but the crop at this index is close enough.
    Close(usize),
    /// Nothing close enough; use the original, un-cropped file.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    /// Tolerance in percent of the *referenced* width.
    pub tolerance: f64,
    pub selection: Selection,
}
impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            selection: Selection::default(),
        }
    }
}
impl MatchPolicy {
    pub fn new(tolerance: f64, selection: Selection) -> Self {
        Self { tolerance, selection }
    }

    /// Relative width difference between `reference` and `candidate`, as a
    /// percentage of the reference width. Height is not considered.
    ///
    /// A zero reference width gives `NaN` or infinity, neither of which is
    /// ever within tolerance.
    pub fn width_difference(reference: &Crop, candidate: &Crop) -> f64 {
        (reference.width as f64 - candidate.width as f64).abs() / reference.width as f64 * 100.0
    }

    /// Compare a crop referenced in content against the crops that exist.
    ///
    /// The first exact match wins outright. Otherwise the candidates within
    /// tolerance are picked from according to [`Selection`].
    pub fn resolve(&self, reference: &Crop, existing: &[Crop]) -> Resolution {
        let mut close: Option<(usize, f64)> = None;
        for (index, candidate) in existing.iter().enumerate() {
            if candidate.width == reference.width && candidate.height == reference.height {
                return Resolution::Exact;
            }
            let difference = Self::width_difference(reference, candidate);
            if !(difference <= self.tolerance) {
                continue;
            }
            close = match (self.selection, close) {
                (Selection::Closest, Some((_, best))) if best <= difference => close,
                _ => Some((index, difference)),
            };
        }
        match close {
            Some((index, _)) => Resolution::Close(index),
            None => Resolution::Fallback,
        }
    }
}
