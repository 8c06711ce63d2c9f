use log::debug;

use crate::config::ScrollConfig;
use crate::tween::Ease;

/// Ease used while the reported progress catches up with the scroll.
const SCRUB_EASE: Ease = Ease::PowerOut(3);

/// Scroll-linked progress with scrub smoothing.
///
/// The track spans `pin_distance` pixels starting at the top of the page.
/// It stays inert until [`ScrollTrack::activate`] is called; afterwards the
/// reported progress chases the raw scroll progress over `scrub_seconds`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollTrack {
    start: f32,
    distance: f32,
    scrub_seconds: f32,
    active: bool,
    raw: f32,
    current: f32,
    chase: Option<Chase>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Chase {
    from: f32,
    to: f32,
    elapsed: f32,
}

impl ScrollTrack {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            start: 0.0,
            distance: config.pin_distance.max(f32::EPSILON),
            scrub_seconds: config.scrub_seconds.max(0.0),
            active: false,
            raw: 0.0,
            current: 0.0,
            chase: None,
        }
    }

    /// Arms the track at the given scroll offset.
    pub fn activate(&mut self, scroll_y: f32) {
        if self.active {
            return;
        }
        self.active = true;
        debug!("scroll track active over {} px", self.distance);
        self.set_scroll(scroll_y);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Extra page height the track pins while active.
    pub fn pin_distance(&self) -> f32 {
        self.distance
    }

    /// Unsmoothed progress for a scroll offset.
    pub fn progress_for(&self, scroll_y: f32) -> f32 {
        ((scroll_y - self.start) / self.distance).clamp(0.0, 1.0)
    }

    pub fn raw_progress(&self) -> f32 {
        self.raw
    }

    /// Smoothed progress as last reported by [`ScrollTrack::tick`].
    pub fn progress(&self) -> f32 {
        self.current
    }

    /// Records a new scroll offset; ignored while inactive.
    pub fn set_scroll(&mut self, scroll_y: f32) {
        if !self.active {
            return;
        }
        let raw = self.progress_for(scroll_y);
        if raw == self.raw && self.chase.is_none() && raw == self.current {
            return;
        }
        self.raw = raw;
        self.chase = Some(Chase {
            from: self.current,
            to: raw,
            elapsed: 0.0,
        });
    }

    /// Advances the scrub by `dt` seconds. Returns the new progress when it
    /// changed.
    pub fn tick(&mut self, dt: f32) -> Option<f32> {
        let chase = self.chase.as_mut()?;
        chase.elapsed += dt.max(0.0);
        let t = if self.scrub_seconds > 0.0 {
            chase.elapsed / self.scrub_seconds
        } else {
            1.0
        };
        let value = if t >= 1.0 {
            chase.to
        } else {
            chase.from + (chase.to - chase.from) * SCRUB_EASE.apply(t)
        };
        if t >= 1.0 {
            self.chase = None;
        }
        if value == self.current {
            return None;
        }
        self.current = value;
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(scrub_seconds: f32) -> ScrollTrack {
        ScrollTrack::new(&ScrollConfig {
            scrub_seconds,
            ..ScrollConfig::default()
        })
    }

    #[test]
    fn ignores_scroll_until_activated() {
        let mut track = track(2.0);
        track.set_scroll(50_000.0);
        assert_eq!(track.tick(1.0), None);
        assert_eq!(track.progress(), 0.0);

        track.activate(50_000.0);
        assert!(track.is_active());
        assert_eq!(track.raw_progress(), 0.5);
    }

    #[test]
    fn raw_progress_clamps() {
        let track = track(2.0);
        assert_eq!(track.progress_for(-10.0), 0.0);
        assert_eq!(track.progress_for(25_000.0), 0.25);
        assert_eq!(track.progress_for(1e9), 1.0);
    }

    #[test]
    fn scrub_converges_within_its_duration() {
        let mut track = track(2.0);
        track.activate(0.0);
        track.set_scroll(100_000.0);

        let first = track.tick(0.5).unwrap();
        assert!(first > 0.5 && first < 1.0);
        let mut last = first;
        for _ in 0..120 {
            if let Some(value) = track.tick(1.0 / 60.0) {
                assert!(value >= last);
                last = value;
            }
        }
        assert_eq!(track.progress(), 1.0);
        assert_eq!(track.tick(1.0 / 60.0), None);
    }

    #[test]
    fn retargeting_starts_from_current_value() {
        let mut track = track(2.0);
        track.activate(0.0);
        track.set_scroll(100_000.0);
        track.tick(1.0);
        let midway = track.progress();

        track.set_scroll(0.0);
        let next = track.tick(0.1).unwrap();
        assert!(next < midway);
        assert!(next > 0.0);
    }

    #[test]
    fn zero_scrub_jumps() {
        let mut track = track(0.0);
        track.activate(20_000.0);
        assert_eq!(track.tick(0.0), Some(0.2));
    }
}
