//! Keeping the same day under the viewport edge while the window mutates.

use tracing::warn;

use super::date_window::DateWindow;

/// Inset added to the scroll offset before locating the anchor day, so an
/// offset sitting exactly on a column boundary is never ambiguous.
pub const ANCHOR_INSET_PX: f32 = 8.0;

/// The scrollable host the chart is rendered into.
///
/// Offsets are in content pixels, `scroll_left == 0` puts the first date
/// column right after the pinned columns.
pub trait ScrollSurface {
    fn scroll_left(&self) -> f32;
    fn set_scroll_left(&mut self, px: f32);
    fn scroll_top(&self) -> f32;
    fn set_scroll_top(&mut self, px: f32);
    fn client_width(&self) -> f32;
    fn client_height(&self) -> f32;
    fn scroll_width(&self) -> f32;
    fn scroll_height(&self) -> f32;

    /// Left edge of the rendered date cell `idx`, relative to the first date
    /// cell, when the host can report it. Used over `idx * column_width` to
    /// absorb border and subpixel drift.
    fn rendered_cell_left(&self, _idx: usize) -> Option<f32> {
        None
    }
}

/// A day key plus how far into that day's cell the viewport edge sits.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollAnchor {
    pub date_key: String,
    pub offset_in_cell_px: f32,
}

impl ScrollAnchor {
    /// Anchor on the day under `scroll_left + ANCHOR_INSET_PX`. Returns
    /// `None` for an empty window.
    pub fn capture(scroll_left: f32, column_width: f32, keys: &[String]) -> Option<Self> {
        if keys.is_empty() || column_width <= 0.0 {
            return None;
        }
        let target = scroll_left.max(0.0) + ANCHOR_INSET_PX;
        let idx = ((target / column_width).floor() as usize).min(keys.len() - 1);
        Some(Self {
            date_key: keys[idx].clone(),
            offset_in_cell_px: target - idx as f32 * column_width,
        })
    }

    /// Scroll so the anchored day sits where it was captured. Returns false
    /// (and leaves the offset alone) when the day is no longer in `window`.
    pub fn restore(
        &self,
        surface: &mut dyn ScrollSurface,
        column_width: f32,
        window: &DateWindow,
    ) -> bool {
        let Some(idx) = window.index_of_key(&self.date_key) else {
            warn!(
                anchor = %self.date_key,
                "anchor day left the window; keeping the raw scroll offset"
            );
            return false;
        };
        let cell_left = surface
            .rendered_cell_left(idx)
            .unwrap_or(idx as f32 * column_width);
        surface.set_scroll_left(cell_left + self.offset_in_cell_px - ANCHOR_INSET_PX);
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    /// In-memory surface; content width tracks nothing, offsets are not clamped.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct FakeSurface {
        pub left: f32,
        pub top: f32,
        pub client: (f32, f32),
        pub content: (f32, f32),
        pub cell_drift: Option<f32>,
        pub column_width: f32,
    }

    impl ScrollSurface for FakeSurface {
        fn scroll_left(&self) -> f32 {
            self.left
        }
        fn set_scroll_left(&mut self, px: f32) {
            self.left = px;
        }
        fn scroll_top(&self) -> f32 {
            self.top
        }
        fn set_scroll_top(&mut self, px: f32) {
            self.top = px;
        }
        fn client_width(&self) -> f32 {
            self.client.0
        }
        fn client_height(&self) -> f32 {
            self.client.1
        }
        fn scroll_width(&self) -> f32 {
            self.content.0
        }
        fn scroll_height(&self) -> f32 {
            self.content.1
        }
        fn rendered_cell_left(&self, idx: usize) -> Option<f32> {
            self.cell_drift
                .map(|drift| idx as f32 * (self.column_width + drift))
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn capture_records_day_and_offset() {
        let window = DateWindow::from_range(ymd(2025, 6, 1), ymd(2025, 6, 30));
        let anchor = ScrollAnchor::capture(36.0 * 14.0 + 5.0, 36.0, window.keys()).unwrap();
        assert_eq!(anchor.date_key, "2025-06-15");
        assert_eq!(anchor.offset_in_cell_px, 13.0);
    }

    #[test]
    fn capture_near_boundary_uses_the_inset() {
        let window = DateWindow::from_range(ymd(2025, 6, 1), ymd(2025, 6, 30));
        // 2px before the Jun 16 boundary: the inset pushes the anchor into Jun 16.
        let anchor = ScrollAnchor::capture(36.0 * 15.0 - 2.0, 36.0, window.keys()).unwrap();
        assert_eq!(anchor.date_key, "2025-06-16");
        assert_eq!(anchor.offset_in_cell_px, 6.0);
    }

    #[test]
    fn restore_after_prune_left_shifts_by_removed_days() {
        let mut window = DateWindow::from_range(ymd(2025, 5, 1), ymd(2025, 8, 31));
        let mut surface = FakeSurface {
            left: 45.0 * 36.0 + 11.0,
            column_width: 36.0,
            ..Default::default()
        };
        let anchor = ScrollAnchor::capture(surface.left, 36.0, window.keys()).unwrap();
        assert_eq!(anchor.date_key, "2025-06-15");

        assert!(window.prune_left(30));
        assert!(anchor.restore(&mut surface, 36.0, &window));
        assert_eq!(surface.left, 15.0 * 36.0 + 11.0);
    }

    #[test]
    fn restore_prefers_rendered_cell_position() {
        let window = DateWindow::from_range(ymd(2025, 6, 1), ymd(2025, 6, 30));
        let mut surface = FakeSurface {
            cell_drift: Some(1.0),
            column_width: 36.0,
            ..Default::default()
        };
        let anchor = ScrollAnchor {
            date_key: "2025-06-11".into(),
            offset_in_cell_px: 8.0,
        };
        assert!(anchor.restore(&mut surface, 36.0, &window));
        assert_eq!(surface.left, 10.0 * 37.0);
    }

    #[test]
    fn missing_anchor_day_is_a_no_op() {
        let window = DateWindow::from_range(ymd(2025, 6, 1), ymd(2025, 6, 30));
        let mut surface = FakeSurface {
            left: 123.0,
            ..Default::default()
        };
        let anchor = ScrollAnchor {
            date_key: "2024-01-01".into(),
            offset_in_cell_px: 4.0,
        };
        assert!(!anchor.restore(&mut surface, 36.0, &window));
        assert_eq!(surface.left, 123.0);
    }

    proptest! {
        #[test]
        fn anchor_is_stable_across_mutations(
            scroll_days in 100usize..200,
            sub_px in 0.0f32..36.0,
            extend_left in 0usize..90,
            extend_right in 0usize..90,
            prune_left in 0usize..90,
            prune_right in 0usize..90,
        ) {
            let col = 36.0;
            let mut window = DateWindow::from_range(ymd(2025, 1, 1), ymd(2025, 12, 31));
            let mut surface = FakeSurface { column_width: col, ..Default::default() };
            let original = scroll_days as f32 * col + sub_px;
            surface.left = original;

            let anchor = ScrollAnchor::capture(surface.left, col, window.keys()).unwrap();
            window.extend_left(extend_left);
            window.extend_right(extend_right);
            window.prune_left(prune_left);
            window.prune_right(prune_right);
            prop_assert!(anchor.restore(&mut surface, col, &window));

            let net_shift = (extend_left as f32 - prune_left as f32) * col;
            prop_assert!((surface.left - (original + net_shift)).abs() <= 1.0);
        }
    }
}
