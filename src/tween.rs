//! Small keyframe-free tween engine for scripted reveals.
//!
//! A [`Timeline`] owns tweens laid out back to back. Each [`Tween`] drives
//! one property of one or more targets toward a destination value and
//! records where the targets started the first time the playhead reaches
//! it. A tween renders whenever its clamped local time changes, so
//! reversing a timeline walks every property back to the recorded start
//! while a tween parked at its end no longer touches its targets.

/// Easing curves, named after their `in`/`out` power families.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ease {
    Linear,
    /// `1 - (1 - t)^(n + 1)`; `PowerOut(1)` is the quadratic ease out.
    PowerOut(u8),
}

impl Default for Ease {
    fn default() -> Self {
        Ease::PowerOut(1)
    }
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::PowerOut(power) => 1.0 - (1.0 - t).powi(power as i32 + 1),
        }
    }
}

/// Where staggered start times radiate from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaggerFrom {
    Start,
    Center,
    End,
}

/// Spreads `amount` seconds of start delay across a tween's targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stagger {
    pub amount: f32,
    pub from: StaggerFrom,
}

impl Stagger {
    pub fn from_center(amount: f32) -> Self {
        Self {
            amount,
            from: StaggerFrom::Center,
        }
    }

    /// Start delay of each of `count` targets.
    ///
    /// Delays scale with distance from the origin: the closest target
    /// starts at 0 and the furthest at `amount`.
    pub fn delays(&self, count: usize) -> Vec<f32> {
        if count == 0 {
            return Vec::new();
        }
        let origin = match self.from {
            StaggerFrom::Start => 0.0,
            StaggerFrom::Center => (count - 1) as f32 / 2.0,
            StaggerFrom::End => (count - 1) as f32,
        };
        let distances: Vec<f32> = (0..count).map(|i| (i as f32 - origin).abs()).collect();
        let min = distances.iter().copied().fold(f32::MAX, f32::min);
        let max = distances.iter().copied().fold(f32::MIN, f32::max);
        let span = max - min;
        distances
            .into_iter()
            .map(|d| {
                if span > 0.0 {
                    (d - min) / span * self.amount
                } else {
                    0.0
                }
            })
            .collect()
    }
}

/// State that tweens can read and write.
///
/// A property addresses `target_count` scalar slots (one per letter, for
/// instance).
pub trait Animatable {
    type Property: Copy;

    fn target_count(&self, property: Self::Property) -> usize;
    fn read(&self, property: Self::Property, index: usize) -> f32;
    fn write(&mut self, property: Self::Property, index: usize, value: f32);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tween<P> {
    property: P,
    to: f32,
    duration: f32,
    ease: Ease,
    stagger: Option<Stagger>,
    start: f32,
    captured: Option<Captured>,
    /// Local time of the last render, clamped to the tween's span.
    rendered: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
struct Captured {
    from: Vec<f32>,
    delays: Vec<f32>,
}

impl<P: Copy> Tween<P> {
    /// Animates `property` to `value` over `duration` seconds.
    pub fn to(property: P, value: f32, duration: f32) -> Self {
        Self {
            property,
            to: value,
            duration: duration.max(0.0),
            ease: Ease::default(),
            stagger: None,
            start: 0.0,
            captured: None,
            rendered: None,
        }
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn with_stagger(mut self, stagger: Stagger) -> Self {
        self.stagger = Some(stagger);
        self
    }

    /// Duration including the longest stagger delay.
    pub fn total_duration(&self) -> f32 {
        self.duration + self.stagger.map_or(0.0, |s| s.amount.max(0.0))
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn end(&self) -> f32 {
        self.start + self.total_duration()
    }

    fn capture<S: Animatable<Property = P>>(&mut self, state: &S) {
        let count = state.target_count(self.property);
        let from = (0..count).map(|i| state.read(self.property, i)).collect();
        let delays = match self.stagger {
            Some(stagger) => stagger.delays(count),
            None => vec![0.0; count],
        };
        self.captured = Some(Captured { from, delays });
    }

    fn render<S: Animatable<Property = P>>(&self, state: &mut S, local: f32) {
        let Some(captured) = &self.captured else {
            return;
        };
        for (index, (from, delay)) in captured.from.iter().zip(&captured.delays).enumerate() {
            let elapsed = local - delay;
            let progress = if self.duration > 0.0 {
                (elapsed / self.duration).clamp(0.0, 1.0)
            } else if elapsed >= 0.0 {
                1.0
            } else {
                0.0
            };
            let value = if progress >= 1.0 {
                self.to
            } else {
                from + (self.to - from) * self.ease.apply(progress)
            };
            state.write(self.property, index, value);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Outcome of a [`Timeline::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineEvent {
    /// The playhead did not move.
    Idle,
    Updated,
    /// Reached the end while playing forward.
    Completed,
    /// Reached the start while reversing.
    Rewound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline<P> {
    tweens: Vec<Tween<P>>,
    time: f32,
    direction: Direction,
    paused: bool,
    started: bool,
}

impl<P: Copy> Default for Timeline<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Copy> Timeline<P> {
    /// A timeline that starts playing on its first tick.
    pub fn new() -> Self {
        Self {
            tweens: Vec::new(),
            time: 0.0,
            direction: Direction::Forward,
            paused: false,
            started: false,
        }
    }

    /// A timeline that waits for [`Timeline::play`].
    pub fn paused() -> Self {
        Self {
            paused: true,
            ..Self::new()
        }
    }

    /// Appends a tween after everything already on the timeline.
    pub fn then(mut self, mut tween: Tween<P>) -> Self {
        tween.start = self.duration();
        self.tweens.push(tween);
        self
    }

    pub fn duration(&self) -> f32 {
        self.tweens.iter().map(Tween::end).fold(0.0, f32::max)
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn progress(&self) -> f32 {
        let duration = self.duration();
        if duration > 0.0 {
            self.time / duration
        } else {
            1.0
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn play(&mut self) {
        self.direction = Direction::Forward;
        self.paused = false;
    }

    pub fn reverse(&mut self) {
        self.direction = Direction::Reverse;
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// True while ticking would still move the playhead.
    pub fn is_active(&self) -> bool {
        if self.paused {
            return false;
        }
        match self.direction {
            Direction::Forward => !self.started || self.time < self.duration(),
            Direction::Reverse => self.time > 0.0,
        }
    }

    /// Moves the playhead by `dt` seconds and renders into `state`.
    pub fn tick<S: Animatable<Property = P>>(&mut self, state: &mut S, dt: f32) -> TimelineEvent {
        if !self.is_active() {
            return TimelineEvent::Idle;
        }
        self.started = true;
        let duration = self.duration();
        let step = dt.max(0.0);
        self.time = match self.direction {
            Direction::Forward => (self.time + step).min(duration),
            Direction::Reverse => (self.time - step).max(0.0),
        };
        self.render(state);

        match self.direction {
            Direction::Forward if self.time >= duration => TimelineEvent::Completed,
            Direction::Reverse if self.time <= 0.0 => TimelineEvent::Rewound,
            _ => TimelineEvent::Updated,
        }
    }

    /// Renders every captured tween whose clamped local time moved. A
    /// tween that sits past its end leaves its targets alone, so another
    /// timeline can take them over.
    fn render<S: Animatable<Property = P>>(&mut self, state: &mut S) {
        let time = self.time;
        for tween in &mut self.tweens {
            if tween.captured.is_none() {
                if time < tween.start {
                    continue;
                }
                tween.capture(state);
            }
            let local = (time - tween.start).clamp(0.0, tween.total_duration());
            if tween.rendered == Some(local) {
                continue;
            }
            tween.render(state, local);
            tween.rendered = Some(local);
        }
    }
}
