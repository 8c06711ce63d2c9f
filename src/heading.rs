use log::debug;

use crate::tween::{Animatable, Stagger, Timeline, TimelineEvent, Tween};

/// Vertical offset, in percent of glyph height, that hides a letter below
/// its line.
pub const HIDDEN_OFFSET: f32 = 150.0;

/// Offsets above this still leave part of the glyph visible.
const VISIBLE_BELOW: f32 = 100.0;

const LETTER_DURATION: f32 = 1.0;
const LETTER_STAGGER: f32 = 1.5;
const BAR_IN_DURATION: f32 = 1.0;
const BAR_OUT_DURATION: f32 = 0.51;

/// Animated presentation of the page heading.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingState {
    pub opacity: f32,
    /// Underline width in percent of the heading width.
    pub bar_width: f32,
    /// Per-letter vertical offset in percent of the glyph height.
    pub letters: Vec<f32>,
}

impl HeadingState {
    /// Visible heading with an empty bar and every letter tucked away.
    pub fn new(letter_count: usize) -> Self {
        Self {
            opacity: 1.0,
            bar_width: 0.0,
            letters: vec![HIDDEN_OFFSET; letter_count],
        }
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingProperty {
    Opacity,
    BarWidth,
    LetterOffset,
}

impl Animatable for HeadingState {
    type Property = HeadingProperty;

    fn target_count(&self, property: HeadingProperty) -> usize {
        match property {
            HeadingProperty::Opacity | HeadingProperty::BarWidth => 1,
            HeadingProperty::LetterOffset => self.letters.len(),
        }
    }

    fn read(&self, property: HeadingProperty, index: usize) -> f32 {
        match property {
            HeadingProperty::Opacity => self.opacity,
            HeadingProperty::BarWidth => self.bar_width,
            HeadingProperty::LetterOffset => self.letters[index],
        }
    }

    fn write(&mut self, property: HeadingProperty, index: usize, value: f32) {
        match property {
            HeadingProperty::Opacity => self.opacity = value,
            HeadingProperty::BarWidth => self.bar_width = value,
            HeadingProperty::LetterOffset => self.letters[index] = value,
        }
    }
}

/// Letters rise from the center outward, then the underline draws in.
pub fn intro_timeline() -> Timeline<HeadingProperty> {
    Timeline::new()
        .then(
            Tween::to(HeadingProperty::LetterOffset, 0.0, LETTER_DURATION)
                .with_stagger(Stagger::from_center(LETTER_STAGGER)),
        )
        .then(Tween::to(HeadingProperty::BarWidth, 100.0, BAR_IN_DURATION))
}

/// Underline retracts, then letters sink from the center outward.
/// Created paused; scrolling plays and reverses it.
pub fn outro_timeline() -> Timeline<HeadingProperty> {
    Timeline::paused()
        .then(Tween::to(HeadingProperty::BarWidth, 0.0, BAR_OUT_DURATION))
        .then(
            Tween::to(HeadingProperty::LetterOffset, HIDDEN_OFFSET, LETTER_DURATION)
                .with_stagger(Stagger::from_center(LETTER_STAGGER)),
        )
}

/// What a [`HeadingReveal::tick`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevealTick {
    pub changed: bool,
    /// Set on the frame the intro finishes.
    pub intro_completed: bool,
}

/// Drives the heading through its intro and its scroll-bound outro.
#[derive(Debug, Clone)]
pub struct HeadingReveal {
    text: String,
    state: HeadingState,
    intro: Timeline<HeadingProperty>,
    outro: Timeline<HeadingProperty>,
    threshold: f32,
    intro_done: bool,
}

impl HeadingReveal {
    /// `text` is the heading; each non-whitespace character is one
    /// animated letter.
    pub fn new(text: &str, threshold: f32) -> Self {
        let letter_count = text.chars().filter(|c| !c.is_whitespace()).count();
        Self {
            text: text.to_string(),
            state: HeadingState::new(letter_count),
            intro: intro_timeline(),
            outro: outro_timeline(),
            threshold,
            intro_done: false,
        }
    }

    pub fn state(&self) -> &HeadingState {
        &self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn intro_done(&self) -> bool {
        self.intro_done
    }

    /// Hides the heading once the page scrolls past the threshold and
    /// brings it back when scrolled to the top again.
    pub fn on_scroll(&mut self, scroll_y: f32) {
        if scroll_y > self.threshold {
            self.outro.play();
        } else {
            self.outro.reverse();
        }
    }

    pub fn tick(&mut self, dt: f32) -> RevealTick {
        let mut tick = RevealTick::default();
        match self.intro.tick(&mut self.state, dt) {
            TimelineEvent::Idle => {}
            TimelineEvent::Completed => {
                tick.changed = true;
                if !self.intro_done {
                    self.intro_done = true;
                    tick.intro_completed = true;
                    debug!("heading intro complete");
                }
            }
            TimelineEvent::Updated | TimelineEvent::Rewound => tick.changed = true,
        }
        if self.outro.tick(&mut self.state, dt) != TimelineEvent::Idle {
            tick.changed = true;
        }
        tick
    }

    /// The heading with every letter that is still tucked away replaced by
    /// a space.
    pub fn revealed_text(&self) -> String {
        let mut letters = self.state.letters.iter();
        self.text
            .chars()
            .map(|c| {
                if c.is_whitespace() {
                    return c;
                }
                match letters.next() {
                    Some(offset) if *offset < VISIBLE_BELOW && self.state.is_visible() => c,
                    _ => ' ',
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(reveal: &mut HeadingReveal, seconds: f32) -> Vec<RevealTick> {
        let frames = (seconds * 60.0).round() as usize;
        (0..frames).map(|_| reveal.tick(1.0 / 60.0)).collect()
    }

    #[test]
    fn starts_hidden_with_empty_bar() {
        let reveal = HeadingReveal::new("RED CELL", 1.0);
        assert_eq!(reveal.state().letters, vec![HIDDEN_OFFSET; 7]);
        assert_eq!(reveal.state().bar_width, 0.0);
        assert_eq!(reveal.revealed_text(), "        ");
    }

    #[test]
    fn intro_reveals_every_letter_then_completes_once() {
        let mut reveal = HeadingReveal::new("RED CELL", 1.0);
        let ticks = run(&mut reveal, 4.0);
        assert_eq!(ticks.iter().filter(|t| t.intro_completed).count(), 1);
        assert!(reveal.intro_done());
        assert!(reveal.state().letters.iter().all(|offset| *offset == 0.0));
        assert_eq!(reveal.state().bar_width, 100.0);
        assert_eq!(reveal.revealed_text(), "RED CELL");
    }

    #[test]
    fn center_letters_rise_first() {
        let mut reveal = HeadingReveal::new("ABCDE", 1.0);
        run(&mut reveal, 1.0);
        let letters = &reveal.state().letters;
        assert!(letters[2] < letters[1]);
        assert!(letters[1] < letters[0]);
        assert_eq!(letters[0], HIDDEN_OFFSET);
        assert_eq!(letters[1], letters[3]);
    }

    #[test]
    fn scrolling_hides_and_restores() {
        let mut reveal = HeadingReveal::new("FLOW", 1.0);
        run(&mut reveal, 4.0);

        reveal.on_scroll(240.0);
        run(&mut reveal, 4.0);
        assert!(reveal.state().letters.iter().all(|o| *o == HIDDEN_OFFSET));
        assert_eq!(reveal.state().bar_width, 0.0);

        reveal.on_scroll(1.0);
        run(&mut reveal, 4.0);
        assert!(reveal.state().letters.iter().all(|o| *o == 0.0));
        assert_eq!(reveal.state().bar_width, 100.0);
    }

    #[test]
    fn idle_when_nothing_moves() {
        let mut reveal = HeadingReveal::new("FLOW", 1.0);
        run(&mut reveal, 4.0);
        assert_eq!(reveal.tick(1.0 / 60.0), RevealTick::default());
        reveal.on_scroll(0.0);
        assert!(!reveal.tick(1.0 / 60.0).changed);
    }
}
