//! One-dimensional coordinate axes.
//!
//! Regular and rectilinear grids are the outer product of a longitude axis
//! and a latitude axis, so the nearest cell is found one axis at a time.
//!
//! Every axis value is the centre of a cell. A value is covered when it lies
//! within half a cell of some centre; both outer boundaries are inclusive.
//! A value exactly half-way between two centres resolves to the lower index.

use grid_common::longitude::constrain_360;
use serde::{Deserialize, Serialize};

use crate::error::{IndexError, IndexResult};

/// Lookup of the nearest cell along one axis.
pub trait AxisIndex {
    /// Number of cells on the axis.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Centre coordinate of cell `index`, or `None` past the end.
    fn coordinate(&self, index: usize) -> Option<f64>;

    /// Index of the cell whose centre is nearest to `value`, or `None` when
    /// the value is outside the axis coverage or not finite.
    fn index_of(&self, value: f64) -> Option<usize>;
}

/// Choose the candidate with the smallest distance, lower index on ties.
fn nearest_candidate(
    candidates: impl IntoIterator<Item = (usize, f64)>,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (index, dist) in candidates {
        best = match best {
            Some((bi, bd)) if bd < dist || (bd == dist && bi <= index) => Some((bi, bd)),
            _ => Some((index, dist)),
        };
    }
    best
}

/// Translate `value` by whole turns so it falls in `[lower, lower + 360)`,
/// and also offer the next turn up for axes spanning a full circle.
fn cyclic_translations(value: f64, lower: f64) -> [f64; 2] {
    let shifted = lower + constrain_360(value - lower);
    [shifted, shifted + 360.0]
}

// ============================================================================
// Regular axis
// ============================================================================

/// An evenly spaced axis: `coordinate(i) = first + i * spacing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularAxis {
    first: f64,
    spacing: f64,
    size: usize,
    cyclic: bool,
}

impl RegularAxis {
    /// Create an axis whose first cell is centred on `first`.
    ///
    /// Set `cyclic` for longitude axes; queries are then tried at every
    /// 360-degree translation.
    pub fn new(first: f64, spacing: f64, size: usize, cyclic: bool) -> IndexResult<Self> {
        if size == 0 {
            return Err(IndexError::EmptyAxis);
        }
        if !first.is_finite() {
            return Err(IndexError::NonFiniteAxisValue(0));
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(IndexError::InvalidSpacing(spacing));
        }
        Ok(Self {
            first,
            spacing,
            size,
            cyclic,
        })
    }

    pub fn first(&self) -> f64 {
        self.first
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn is_cyclic(&self) -> bool {
        self.cyclic
    }

    /// Lowest covered coordinate (half a cell before the first centre).
    pub fn lower_bound(&self) -> f64 {
        self.first - self.spacing / 2.0
    }

    /// Highest covered coordinate (half a cell past the last centre).
    pub fn upper_bound(&self) -> f64 {
        self.first + (self.size as f64 - 0.5) * self.spacing
    }

    /// Nearest index without wrapping, with its distance in cells.
    fn candidate(&self, value: f64) -> Option<(usize, f64)> {
        let pos = (value - self.first) / self.spacing;
        if !(pos >= -0.5 && pos <= self.size as f64 - 0.5) {
            return None;
        }
        // ceil(pos - 0.5) rounds half-way points down
        let index = ((pos - 0.5).ceil().max(0.0) as usize).min(self.size - 1);
        Some((index, (pos - index as f64).abs()))
    }
}

impl AxisIndex for RegularAxis {
    fn len(&self) -> usize {
        self.size
    }

    fn coordinate(&self, index: usize) -> Option<f64> {
        (index < self.size).then(|| self.first + index as f64 * self.spacing)
    }

    fn index_of(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }
        let found = if self.cyclic {
            nearest_candidate(
                cyclic_translations(value, self.lower_bound())
                    .into_iter()
                    .filter_map(|v| self.candidate(v)),
            )
        } else {
            self.candidate(value)
        };
        found.map(|(index, _)| index)
    }
}

// ============================================================================
// Referenceable (rectilinear) axis
// ============================================================================

/// An axis defined by explicit, strictly monotonic coordinate values.
///
/// Values may be ascending or descending. Coverage extends half of the first
/// and last spacing beyond the ends; a single-valued axis covers only its
/// exact value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceableAxis {
    values: Vec<f64>,
    ascending: bool,
    cyclic: bool,
}

impl ReferenceableAxis {
    pub fn new(values: Vec<f64>, cyclic: bool) -> IndexResult<Self> {
        if values.is_empty() {
            return Err(IndexError::EmptyAxis);
        }
        if let Some(bad) = values.iter().position(|v| !v.is_finite()) {
            return Err(IndexError::NonFiniteAxisValue(bad));
        }

        let ascending = values.len() < 2 || values[1] > values[0];
        for (k, pair) in values.windows(2).enumerate() {
            let ok = if ascending {
                pair[1] > pair[0]
            } else {
                pair[1] < pair[0]
            };
            if !ok {
                return Err(IndexError::NonMonotonicAxis(k + 1));
            }
        }

        Ok(Self {
            values,
            ascending,
            cyclic,
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    pub fn is_cyclic(&self) -> bool {
        self.cyclic
    }

    /// Value at position `k` of the ascending view of the axis.
    #[inline]
    fn sorted(&self, k: usize) -> f64 {
        if self.ascending {
            self.values[k]
        } else {
            self.values[self.values.len() - 1 - k]
        }
    }

    #[inline]
    fn original_index(&self, k: usize) -> usize {
        if self.ascending {
            k
        } else {
            self.values.len() - 1 - k
        }
    }

    pub fn lower_bound(&self) -> f64 {
        let n = self.values.len();
        if n == 1 {
            return self.sorted(0);
        }
        self.sorted(0) - (self.sorted(1) - self.sorted(0)) / 2.0
    }

    pub fn upper_bound(&self) -> f64 {
        let n = self.values.len();
        if n == 1 {
            return self.sorted(0);
        }
        self.sorted(n - 1) + (self.sorted(n - 1) - self.sorted(n - 2)) / 2.0
    }

    fn candidate(&self, value: f64) -> Option<(usize, f64)> {
        if value < self.lower_bound() || value > self.upper_bound() {
            return None;
        }
        let n = self.values.len();

        // First position in the ascending view whose value is >= `value`
        let (mut lo, mut hi) = (0, n);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.sorted(mid) < value {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        let below = (lo > 0).then(|| {
            let k = lo - 1;
            (self.original_index(k), value - self.sorted(k))
        });
        let above = (lo < n).then(|| (self.original_index(lo), self.sorted(lo) - value));
        nearest_candidate(below.into_iter().chain(above))
    }
}

impl AxisIndex for ReferenceableAxis {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn coordinate(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    fn index_of(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }
        let found = if self.cyclic {
            nearest_candidate(
                cyclic_translations(value, self.lower_bound())
                    .into_iter()
                    .filter_map(|v| self.candidate(v)),
            )
        } else {
            self.candidate(value)
        };
        found.map(|(index, _)| index)
    }
}

// ============================================================================
// Either kind
// ============================================================================

/// A regular or referenceable axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Axis {
    Regular(RegularAxis),
    Referenceable(ReferenceableAxis),
}

impl AxisIndex for Axis {
    fn len(&self) -> usize {
        match self {
            Axis::Regular(axis) => axis.len(),
            Axis::Referenceable(axis) => axis.len(),
        }
    }

    fn coordinate(&self, index: usize) -> Option<f64> {
        match self {
            Axis::Regular(axis) => axis.coordinate(index),
            Axis::Referenceable(axis) => axis.coordinate(index),
        }
    }

    fn index_of(&self, value: f64) -> Option<usize> {
        match self {
            Axis::Regular(axis) => axis.index_of(value),
            Axis::Referenceable(axis) => axis.index_of(value),
        }
    }
}

impl From<RegularAxis> for Axis {
    fn from(axis: RegularAxis) -> Self {
        Axis::Regular(axis)
    }
}

impl From<ReferenceableAxis> for Axis {
    fn from(axis: ReferenceableAxis) -> Self {
        Axis::Referenceable(axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_rejects_bad_input() {
        assert_eq!(RegularAxis::new(0.0, 1.0, 0, false), Err(IndexError::EmptyAxis));
        assert_eq!(
            RegularAxis::new(0.0, 0.0, 4, false),
            Err(IndexError::InvalidSpacing(0.0))
        );
        assert!(RegularAxis::new(0.0, -1.0, 4, false).is_err());
        assert!(RegularAxis::new(f64::NAN, 1.0, 4, false).is_err());
    }

    #[test]
    fn test_regular_interior_and_edges() {
        let axis = RegularAxis::new(-10.0, 5.0, 4, false).unwrap();
        assert_eq!(axis.index_of(-10.0), Some(0));
        assert_eq!(axis.index_of(-12.5), Some(0));
        assert_eq!(axis.index_of(-12.6), None);
        assert_eq!(axis.index_of(7.5), Some(3));
        assert_eq!(axis.index_of(7.6), None);
        assert_eq!(axis.index_of(-6.0), Some(1));
    }

    #[test]
    fn test_regular_tie_goes_to_lower_index() {
        let axis = RegularAxis::new(0.0, 1.0, 5, false).unwrap();
        assert_eq!(axis.index_of(0.5), Some(0));
        assert_eq!(axis.index_of(2.5), Some(2));
    }

    #[test]
    fn test_regular_non_finite() {
        let axis = RegularAxis::new(0.0, 1.0, 5, true).unwrap();
        assert_eq!(axis.index_of(f64::NAN), None);
        assert_eq!(axis.index_of(f64::INFINITY), None);
    }

    #[test]
    fn test_cyclic_full_circle_seam() {
        let axis = RegularAxis::new(0.0, 90.0, 4, true).unwrap();
        assert_eq!(axis.index_of(270.0), Some(3));
        assert_eq!(axis.index_of(-90.0), Some(3));
        assert_eq!(axis.index_of(300.0), Some(3));
        // Half-way across the seam: index 0 beats index 3
        assert_eq!(axis.index_of(315.0), Some(0));
        assert_eq!(axis.index_of(-45.0), Some(0));
        assert_eq!(axis.index_of(720.0), Some(0));
    }

    #[test]
    fn test_cyclic_partial_axis_still_has_gaps() {
        let axis = RegularAxis::new(-10.0, 5.0, 4, true).unwrap();
        assert_eq!(axis.index_of(350.0), Some(0));
        assert_eq!(axis.index_of(365.0), Some(3));
        assert_eq!(axis.index_of(90.0), None);
    }

    #[test]
    fn test_referenceable_rejects_bad_input() {
        assert_eq!(ReferenceableAxis::new(vec![], false), Err(IndexError::EmptyAxis));
        assert_eq!(
            ReferenceableAxis::new(vec![0.0, 1.0, 1.0], false),
            Err(IndexError::NonMonotonicAxis(2))
        );
        assert_eq!(
            ReferenceableAxis::new(vec![0.0, f64::NAN], false),
            Err(IndexError::NonFiniteAxisValue(1))
        );
    }

    #[test]
    fn test_referenceable_ascending() {
        let axis = ReferenceableAxis::new(vec![0.0, 1.0, 3.0, 7.0], false).unwrap();
        assert_eq!(axis.index_of(-0.5), Some(0));
        assert_eq!(axis.index_of(-0.6), None);
        assert_eq!(axis.index_of(2.0), Some(1));
        assert_eq!(axis.index_of(2.1), Some(2));
        assert_eq!(axis.index_of(9.0), Some(3));
        assert_eq!(axis.index_of(9.1), None);
    }

    #[test]
    fn test_referenceable_descending_tie_goes_to_lower_index() {
        let axis = ReferenceableAxis::new(vec![30.0, 20.0, 10.0], false).unwrap();
        assert_eq!(axis.index_of(30.0), Some(0));
        assert_eq!(axis.index_of(10.0), Some(2));
        assert_eq!(axis.index_of(15.0), Some(1));
        assert_eq!(axis.index_of(35.0), Some(0));
        assert_eq!(axis.index_of(4.0), None);
    }

    #[test]
    fn test_referenceable_single_value() {
        let axis = ReferenceableAxis::new(vec![5.0], false).unwrap();
        assert_eq!(axis.index_of(5.0), Some(0));
        assert_eq!(axis.index_of(5.1), None);
    }

    #[test]
    fn test_referenceable_cyclic_longitudes() {
        let axis = ReferenceableAxis::new(vec![0.0, 90.0, 180.0, 270.0], true).unwrap();
        assert_eq!(axis.index_of(-90.0), Some(3));
        assert_eq!(axis.index_of(315.0), Some(0));
        assert_eq!(axis.index_of(450.0), Some(1));
    }

    #[test]
    fn test_axis_enum_dispatch() {
        let axis: Axis = RegularAxis::new(0.0, 1.0, 3, false).unwrap().into();
        assert_eq!(axis.len(), 3);
        assert_eq!(axis.coordinate(2), Some(2.0));
        assert_eq!(axis.coordinate(3), None);
        assert_eq!(axis.index_of(1.2), Some(1));
    }
}
