//! Note waves: short-lived "this bell rang" pings for the renderer

use std::collections::VecDeque;

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// A bell strike ping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteWave {
    pub position: IVec2,
    /// Whether the strike matched the melody
    pub correct: bool,
    /// Session time (ms) the wave started
    pub timestep_start: f64,
}

impl NoteWave {
    pub fn new(position: IVec2, correct: bool, timestep_start: f64) -> Self {
        Self {
            position,
            correct,
            timestep_start,
        }
    }

    /// Normalized age in [0, 1] for fade-out
    pub fn progress(&self, now: f64, lifetime: f64) -> f32 {
        ((now - self.timestep_start) / lifetime).clamp(0.0, 1.0) as f32
    }

    #[inline]
    fn expired(&self, now: f64, lifetime: f64) -> bool {
        now >= self.timestep_start + lifetime
    }
}

/// FIFO of live note waves
///
/// Waves are pushed in start order, so the front is always the oldest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteWaves {
    lifetime_ms: f64,
    waves: VecDeque<NoteWave>,
}

impl NoteWaves {
    pub fn new(lifetime_ms: f64) -> Self {
        Self {
            lifetime_ms,
            waves: VecDeque::new(),
        }
    }

    pub fn lifetime_ms(&self) -> f64 {
        self.lifetime_ms
    }

    pub fn push(&mut self, wave: NoteWave) {
        // Out-of-order starts would break front-only pruning
        debug_assert!(
            self.waves
                .back()
                .is_none_or(|w| w.timestep_start <= wave.timestep_start)
        );
        self.waves.push_back(wave);
    }

    /// Drop every wave whose lifetime has run out at `now`
    pub fn prune(&mut self, now: f64) {
        while self
            .waves
            .front()
            .is_some_and(|w| w.expired(now, self.lifetime_ms))
        {
            self.waves.pop_front();
        }
    }

    /// Waves still alive at `now`, oldest first
    pub fn active(&self, now: f64) -> impl Iterator<Item = &NoteWave> {
        let lifetime = self.lifetime_ms;
        self.waves.iter().filter(move |w| !w.expired(now, lifetime))
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    pub fn clear(&mut self) {
        self.waves.clear();
    }
}
