//! External signal → progress `t`.

/// Progress bound to the page scroll position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollProgress {
    progress: f64,
}

impl ScrollProgress {
    /// Normalises `scroll_offset` by the scrollable range
    /// (`document_height - viewport_height`). A page that cannot scroll and a
    /// NaN offset both map to `0`; infinite offsets clamp to the nearest end.
    #[must_use]
    pub fn from_offsets(scroll_offset: f64, document_height: f64, viewport_height: f64) -> f64 {
        let scrollable = document_height - viewport_height;
        if !scrollable.is_finite() || scrollable <= 0.0 || scroll_offset.is_nan() {
            return 0.0;
        }
        (scroll_offset / scrollable).clamp(0.0, 1.0)
    }

    pub fn set_offsets(&mut self, scroll_offset: f64, document_height: f64, viewport_height: f64) {
        self.progress = Self::from_offsets(scroll_offset, document_height, viewport_height);
    }

    /// Direct progress input for hosts that already normalise.
    pub fn set_progress(&mut self, progress: f64) {
        self.progress = crate::geom::clamp_progress(progress);
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }
}

/// Progress bound to elapsed time, wrapping every `period` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeProgress {
    period: f64,
    elapsed: f64,
    paused: bool,
}

impl TimeProgress {
    /// Non-positive or non-finite periods fall back to one minute.
    #[must_use]
    pub fn new(period: f64) -> Self {
        let period = if period.is_finite() && period > 0.0 {
            period
        } else {
            60.0
        };
        Self {
            period,
            elapsed: 0.0,
            paused: false,
        }
    }

    #[must_use]
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Advances the clock. Negative or non-finite deltas are ignored, so the
    /// output never runs backwards within a period.
    pub fn advance(&mut self, delta_seconds: f64) {
        if self.paused || !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            return;
        }
        self.elapsed = (self.elapsed + delta_seconds) % self.period;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Fraction of the current period, in `[0, 1)`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.elapsed / self.period
    }

    /// Same as [`progress`](Self::progress) expressed as a rotation angle.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.progress() * std::f64::consts::TAU
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressDriver {
    Scroll(ScrollProgress),
    Time(TimeProgress),
}

impl ProgressDriver {
    #[must_use]
    pub fn scroll() -> Self {
        Self::Scroll(ScrollProgress::default())
    }

    #[must_use]
    pub fn time(period: f64) -> Self {
        Self::Time(TimeProgress::new(period))
    }

    /// Frame tick. Only the time-bound variant reacts.
    pub fn advance(&mut self, delta_seconds: f64) {
        if let Self::Time(driver) = self {
            driver.advance(delta_seconds);
        }
    }

    /// Scroll input. Only the scroll-bound variant reacts.
    pub fn set_scroll(&mut self, scroll_offset: f64, document_height: f64, viewport_height: f64) {
        if let Self::Scroll(driver) = self {
            driver.set_offsets(scroll_offset, document_height, viewport_height);
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        if let Self::Time(driver) = self {
            driver.set_paused(paused);
        }
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        match self {
            Self::Scroll(driver) => driver.progress(),
            Self::Time(driver) => driver.progress(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_progress_normalises_by_scrollable_range() {
        assert_eq!(ScrollProgress::from_offsets(0.0, 3000.0, 1000.0), 0.0);
        assert_eq!(ScrollProgress::from_offsets(1000.0, 3000.0, 1000.0), 0.5);
        assert_eq!(ScrollProgress::from_offsets(2000.0, 3000.0, 1000.0), 1.0);
    }

    #[test]
    fn scroll_progress_clamps_overscroll() {
        assert_eq!(ScrollProgress::from_offsets(-120.0, 3000.0, 1000.0), 0.0);
        assert_eq!(ScrollProgress::from_offsets(2400.0, 3000.0, 1000.0), 1.0);
        assert_eq!(ScrollProgress::from_offsets(f64::INFINITY, 3000.0, 1000.0), 1.0);
        assert_eq!(ScrollProgress::from_offsets(f64::NEG_INFINITY, 3000.0, 1000.0), 0.0);
    }

    #[test]
    fn unscrollable_page_maps_to_start() {
        assert_eq!(ScrollProgress::from_offsets(50.0, 800.0, 1000.0), 0.0);
        assert_eq!(ScrollProgress::from_offsets(50.0, 1000.0, 1000.0), 0.0);
        assert_eq!(ScrollProgress::from_offsets(f64::NAN, 3000.0, 1000.0), 0.0);
    }

    #[test]
    fn time_progress_wraps_at_period() {
        let mut driver = TimeProgress::new(10.0);
        driver.advance(2.5);
        assert_eq!(driver.progress(), 0.25);
        driver.advance(10.0);
        assert_eq!(driver.progress(), 0.25);
        driver.advance(7.5);
        assert_eq!(driver.progress(), 0.0);
    }

    #[test]
    fn time_progress_ignores_bad_deltas_and_pauses() {
        let mut driver = TimeProgress::new(4.0);
        driver.advance(1.0);
        driver.advance(-3.0);
        driver.advance(f64::NAN);
        assert_eq!(driver.progress(), 0.25);

        driver.set_paused(true);
        driver.advance(1.0);
        assert_eq!(driver.progress(), 0.25);
        assert!((driver.angle() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn invalid_period_falls_back() {
        assert_eq!(TimeProgress::new(0.0).period(), 60.0);
        assert_eq!(TimeProgress::new(f64::INFINITY).period(), 60.0);
    }

    #[test]
    fn driver_variants_only_react_to_their_signal() {
        let mut scroll = ProgressDriver::scroll();
        scroll.advance(5.0);
        assert_eq!(scroll.progress(), 0.0);
        scroll.set_scroll(500.0, 2000.0, 1000.0);
        assert_eq!(scroll.progress(), 0.5);

        let mut time = ProgressDriver::time(8.0);
        time.set_scroll(500.0, 2000.0, 1000.0);
        assert_eq!(time.progress(), 0.0);
        time.advance(2.0);
        assert_eq!(time.progress(), 0.25);
    }
}
