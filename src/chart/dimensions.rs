//! Cached layout measurements.
//!
//! Measuring is the expensive part; reads happen at scroll frequency. So
//! `refresh` runs only after structural changes (task list, window resize)
//! and the accessors never measure.

/// Where layout measurements come from.
pub trait LayoutProbe {
    /// Widths of the pinned header cells, left to right. `None` when the
    /// chart is not mounted yet.
    fn sticky_column_widths(&self) -> Option<Vec<f32>>;
    /// Total height of the header rows.
    fn header_height(&self) -> Option<f32>;
    /// `(top, height)` of the first rendered body rows, at most two needed.
    fn row_rects(&self) -> Vec<(f32, f32)>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionCache {
    sticky_width: f32,
    header_height: f32,
    row_height: f32,
    row_step: f32,
}

impl Default for DimensionCache {
    fn default() -> Self {
        Self {
            sticky_width: 0.0,
            header_height: 0.0,
            row_height: 24.0,
            // height + 1px bottom border
            row_step: 25.0,
        }
    }
}

impl DimensionCache {
    /// Re-measure from `probe`. A probe that is not mounted leaves the cache
    /// untouched and returns false.
    pub fn refresh(&mut self, probe: &dyn LayoutProbe) -> bool {
        let Some(widths) = probe.sticky_column_widths() else {
            return false;
        };
        self.sticky_width = widths.iter().sum();
        self.header_height = probe.header_height().unwrap_or(0.0);

        let rows = probe.row_rects();
        if let Some(&(_, height)) = rows.first() {
            if height > 0.0 {
                self.row_height = height;
            }
        }
        self.row_step = match (rows.first(), rows.get(1)) {
            (Some(&(first_top, _)), Some(&(second_top, _))) => {
                (second_top - first_top).round().max(1.0)
            }
            _ => self.row_height + 1.0,
        };
        true
    }

    pub fn sticky_width(&self) -> f32 {
        self.sticky_width
    }

    pub fn header_height(&self) -> f32 {
        self.header_height
    }

    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    pub fn row_step(&self) -> f32 {
        self.row_step
    }

    /// Content y of the top of body row `row`.
    pub fn row_top(&self, row: usize) -> f32 {
        self.header_height + row as f32 * self.row_step
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Debug, Clone, Default)]
    pub(crate) struct FakeProbe {
        pub mounted: bool,
        pub sticky: Vec<f32>,
        pub header: f32,
        pub rows: Vec<(f32, f32)>,
    }

    impl LayoutProbe for FakeProbe {
        fn sticky_column_widths(&self) -> Option<Vec<f32>> {
            self.mounted.then(|| self.sticky.clone())
        }
        fn header_height(&self) -> Option<f32> {
            self.mounted.then_some(self.header)
        }
        fn row_rects(&self) -> Vec<(f32, f32)> {
            if self.mounted {
                self.rows.clone()
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn refresh_sums_sticky_columns_and_measures_step() {
        let probe = FakeProbe {
            mounted: true,
            sticky: vec![90.0, 160.0, 100.0],
            header: 44.0,
            rows: vec![(44.0, 26.0), (71.0, 26.0)],
        };
        let mut cache = DimensionCache::default();
        assert!(cache.refresh(&probe));
        assert_eq!(cache.sticky_width(), 350.0);
        assert_eq!(cache.header_height(), 44.0);
        assert_eq!(cache.row_height(), 26.0);
        assert_eq!(cache.row_step(), 27.0);
        assert_eq!(cache.row_top(2), 98.0);
    }

    #[test]
    fn single_row_assumes_one_pixel_border() {
        let probe = FakeProbe {
            mounted: true,
            sticky: vec![100.0],
            header: 40.0,
            rows: vec![(40.0, 30.0)],
        };
        let mut cache = DimensionCache::default();
        cache.refresh(&probe);
        assert_eq!(cache.row_step(), 31.0);
    }

    #[test]
    fn unmounted_probe_keeps_previous_values() {
        let mut cache = DimensionCache::default();
        assert!(!cache.refresh(&FakeProbe::default()));
        assert_eq!(cache, DimensionCache::default());
        assert_eq!(cache.row_step(), 25.0);
    }
}
