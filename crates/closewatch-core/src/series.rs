//! Sparse daily close series with nearest-trading-day lookups.

use crate::PricePoint;

/// Present closes for one instrument, ascending by timestamp with no duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradingDaySeries {
    points: Vec<Observation>,
}

/// A trading day: a timestamp with a recorded close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub timestamp: i64,
    pub close: f64,
}

impl TradingDaySeries {
    /// Build from the provider's parallel arrays.
    ///
    /// Entries past the shorter array are ignored; absent or non-finite closes
    /// are dropped. When a timestamp repeats, its first occurrence is kept.
    pub fn from_raw(timestamps: &[i64], closes: &[Option<f64>]) -> Self {
        let points = timestamps
            .iter()
            .zip(closes.iter())
            .map(|(&timestamp, &close)| PricePoint::new(timestamp, close));
        Self::from_points(points)
    }

    pub fn from_points(points: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut points = points
            .into_iter()
            .filter_map(|point| match point.close {
                Some(close) if close.is_finite() => Some(Observation {
                    timestamp: point.timestamp,
                    close,
                }),
                _ => None,
            })
            .collect::<Vec<_>>();

        // stable: equal timestamps keep their original relative order
        points.sort_by_key(|point| point.timestamp);
        points.dedup_by_key(|point| point.timestamp);

        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Observation> {
        self.points.get(index)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.points
    }

    /// Most recent observation at or before `target`.
    ///
    /// When the series starts after `target`, falls back to the observation
    /// nearest in absolute distance; ties go to the earlier one.
    pub fn find_closest(&self, target: i64) -> Option<&Observation> {
        let mut best_before: Option<&Observation> = None;
        for point in &self.points {
            if point.timestamp > target {
                break;
            }
            best_before = Some(point);
        }

        if best_before.is_some() {
            return best_before;
        }

        let mut nearest: Option<(&Observation, u64)> = None;
        for point in &self.points {
            let distance = point.timestamp.abs_diff(target);
            match nearest {
                Some((_, best)) if distance >= best => {}
                _ => nearest = Some((point, distance)),
            }
        }
        nearest.map(|(point, _)| point)
    }

    /// Index of the anchor observation for `target`: the last one at or
    /// before it, or the first one when the whole series lies after it.
    pub fn anchor_index(&self, target: i64) -> Option<usize> {
        if self.points.is_empty() {
            return None;
        }

        let anchor = self
            .points
            .iter()
            .rposition(|point| point.timestamp <= target)
            .unwrap_or(0);
        Some(anchor)
    }
}
