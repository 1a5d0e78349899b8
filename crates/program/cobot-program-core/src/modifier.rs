//! Modifiers: timeline transformers attached to a track.
//!
//! Only `Repeat` exists: once playback reaches `end_time` it rewinds to
//! `start_time`, `iterations` times.

use crate::action::bounded_comment;
use crate::config::TIME_EPSILON;
use crate::track::Track;

/// Repeat section over `[start_time, end_time]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Repeat {
    iterations: u32,
    counts: u32,
    start_time: f64,
    end_time: f64,
}

impl Repeat {
    pub fn new(iterations: u32, end_time: f64, start_time: f64) -> Self {
        let mut repeat = Self {
            iterations,
            counts: iterations,
            start_time,
            end_time,
        };
        repeat.check_interval();
        repeat
    }

    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Remaining rewinds.
    #[inline]
    pub fn counts(&self) -> u32 {
        self.counts
    }

    #[inline]
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    #[inline]
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn set_iterations(&mut self, iterations: u32) {
        self.iterations = iterations;
        self.check_counts();
    }

    pub fn set_counts(&mut self, counts: u32) {
        self.counts = counts;
        self.check_counts();
    }

    pub fn set_start_time(&mut self, start_time: f64) {
        self.start_time = start_time.max(0.0);
        self.check_interval();
    }

    pub fn set_end_time(&mut self, end_time: f64) {
        self.end_time = end_time.max(0.0);
        self.check_interval();
    }

    pub fn set_interval(&mut self, start_time: f64, end_time: f64) {
        self.start_time = start_time;
        self.end_time = end_time;
        self.check_interval();
    }

    /// Rewind `time` to the section start if it reached the end and rewinds remain.
    /// Returns whether `time` was rewound.
    pub fn modify(&mut self, time: &mut f64) -> bool {
        if *time + TIME_EPSILON > self.end_time && self.counts > 0 {
            *time = self.start_time;
            self.counts -= 1;
            log::debug!(
                "repeat rewound to {} ({} left of {})",
                self.start_time,
                self.counts,
                self.iterations
            );
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.counts = self.iterations;
    }

    fn check_interval(&mut self) {
        if self.end_time <= self.start_time {
            self.start_time = 0.0;
        }
    }

    fn check_counts(&mut self) {
        if self.counts > self.iterations {
            self.counts = self.iterations;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModifierKind {
    Repeat(Repeat),
}

/// A timeline transformer owned by a track.
#[derive(Clone, Debug, PartialEq)]
pub struct Modifier {
    comment: String,
    kind: ModifierKind,
}

impl Modifier {
    pub fn repeat(iterations: u32, end_time: f64, start_time: f64) -> Self {
        Self {
            comment: "Repeat".to_string(),
            kind: ModifierKind::Repeat(Repeat::new(iterations, end_time, start_time)),
        }
    }

    #[inline]
    pub fn kind(&self) -> &ModifierKind {
        &self.kind
    }

    #[inline]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Same bound as action comments.
    pub fn set_comment(&mut self, comment: impl AsRef<str>) {
        self.comment = bounded_comment(comment.as_ref());
    }

    pub fn as_repeat(&self) -> Option<&Repeat> {
        match &self.kind {
            ModifierKind::Repeat(r) => Some(r),
        }
    }

    pub fn as_repeat_mut(&mut self) -> Option<&mut Repeat> {
        match &mut self.kind {
            ModifierKind::Repeat(r) => Some(r),
        }
    }

    /// Span of time the modifier covers.
    pub fn duration(&self) -> f64 {
        match &self.kind {
            ModifierKind::Repeat(r) => r.duration(),
        }
    }

    /// May rewrite the playback time; returns whether it did.
    pub fn modify(&mut self, time: &mut f64) -> bool {
        match &mut self.kind {
            ModifierKind::Repeat(r) => r.modify(time),
        }
    }

    pub fn reset(&mut self) {
        match &mut self.kind {
            ModifierKind::Repeat(r) => r.reset(),
        }
    }

    /// Append to `track`; a repeat then covers every action already on it.
    pub fn push_to_track(self, track: &mut Track) {
        track.push_modifier(self);
    }

    pub fn insert_in_track(self, track: &mut Track, index: usize) {
        track.insert_modifier(index, self);
    }
}
