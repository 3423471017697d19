//! Input Capture and Recording
//!
//! The core only sees an abstract per-tick rotation command; mapping keys
//! to commands happens outside. Commands can be recorded with delta
//! compression and replayed tick by tick.

use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, StateHasher};

// =============================================================================
// ROTATION COMMAND
// =============================================================================

/// Steering request for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RotationCommand {
    /// Let the magnetic torque turn the body
    #[default]
    None = 0,
    /// Turn by minus the key increment
    RotateLeft = 1,
    /// Turn by plus the key increment
    RotateRight = 2,
}

impl RotationCommand {
    /// Build from key states. Right wins when both are held.
    pub fn from_keys(left: bool, right: bool) -> Self {
        if right {
            RotationCommand::RotateRight
        } else if left {
            RotationCommand::RotateLeft
        } else {
            RotationCommand::None
        }
    }

    /// Whether the command overrides the magnetic torque.
    #[inline]
    pub fn is_active(self) -> bool {
        self != RotationCommand::None
    }

    /// Signed rotation for this tick given the key increment.
    #[inline]
    pub fn steering_angle(self, increment: f64) -> Option<f64> {
        match self {
            RotationCommand::None => None,
            RotationCommand::RotateLeft => Some(-increment),
            RotationCommand::RotateRight => Some(increment),
        }
    }
}

/// Recorded change of command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this command began
    pub tick: u32,
    /// The new command
    pub command: RotationCommand,
}

impl InputDelta {
    /// Create new delta entry.
    pub fn new(tick: u32, command: RotationCommand) -> Self {
        Self { tick, command }
    }
}

// =============================================================================
// INPUT RECORDING
// =============================================================================

/// Complete command recording for one level attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputRecording {
    /// Level the recording belongs to
    pub level: u32,

    /// Seed the level was built with
    pub seed: u64,

    /// Starting tick (usually 0)
    pub start_tick: u32,

    /// Last recorded tick
    pub end_tick: u32,

    /// Only ticks where the command changed.
    deltas: Vec<InputDelta>,

    /// Last recorded command (for delta comparison)
    #[serde(skip)]
    last_command: RotationCommand,
}

impl InputRecording {
    /// Create an empty recording.
    pub fn new(level: u32, seed: u64) -> Self {
        Self {
            level,
            seed,
            start_tick: 0,
            end_tick: 0,
            deltas: Vec::new(),
            last_command: RotationCommand::None,
        }
    }

    /// Record the command for a tick; stores only changes.
    pub fn record(&mut self, tick: u32, command: RotationCommand) {
        self.end_tick = tick;

        if command != self.last_command {
            self.deltas.push(InputDelta::new(tick, command));
            self.last_command = command;
        }
    }

    /// Command in effect at `tick`.
    pub fn command_at(&self, tick: u32) -> RotationCommand {
        let idx = self.deltas.partition_point(|d| d.tick <= tick);
        if idx == 0 {
            RotationCommand::None
        } else {
            self.deltas[idx - 1].command
        }
    }

    /// All deltas.
    pub fn deltas(&self) -> &[InputDelta] {
        &self.deltas
    }

    /// Number of delta entries.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Number of ticks covered.
    pub fn tick_count(&self) -> u32 {
        if self.deltas.is_empty() && self.end_tick == 0 {
            0
        } else {
            self.end_tick - self.start_tick + 1
        }
    }

    /// Finalize the recording at level end.
    pub fn finalize(&mut self, end_tick: u32) {
        self.end_tick = end_tick;
    }

    /// Hash of the recording contents.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_input_recording();
        hasher.update_u32(self.level);
        hasher.update_u64(self.seed);
        hasher.update_u32(self.start_tick);
        hasher.update_u32(self.end_tick);
        for delta in &self.deltas {
            hasher.update_u32(delta.tick);
            hasher.update_u8(delta.command as u8);
        }
        hasher.finalize()
    }

    /// Iterate `(tick, command)` for every recorded tick.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            recording: self,
            current_tick: self.start_tick,
            delta_idx: 0,
            current: RotationCommand::None,
        }
    }
}

/// Iterator for replaying commands tick-by-tick.
pub struct ReplayIterator<'a> {
    recording: &'a InputRecording,
    current_tick: u32,
    delta_idx: usize,
    current: RotationCommand,
}

impl Iterator for ReplayIterator<'_> {
    type Item = (u32, RotationCommand);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_tick > self.recording.end_tick {
            return None;
        }

        while let Some(delta) = self.recording.deltas.get(self.delta_idx) {
            if delta.tick > self.current_tick {
                break;
            }
            self.current = delta.command;
            self.delta_idx += 1;
        }

        let item = (self.current_tick, self.current);
        self.current_tick += 1;
        Some(item)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_keys_priority() {
        assert_eq!(RotationCommand::from_keys(false, false), RotationCommand::None);
        assert_eq!(RotationCommand::from_keys(true, false), RotationCommand::RotateLeft);
        assert_eq!(RotationCommand::from_keys(false, true), RotationCommand::RotateRight);
        assert_eq!(RotationCommand::from_keys(true, true), RotationCommand::RotateRight);
    }

    #[test]
    fn test_steering_angle_sign() {
        assert_eq!(RotationCommand::None.steering_angle(0.1), None);
        assert_eq!(RotationCommand::RotateLeft.steering_angle(0.1), Some(-0.1));
        assert_eq!(RotationCommand::RotateRight.steering_angle(0.1), Some(0.1));
        assert!(!RotationCommand::None.is_active());
        assert!(RotationCommand::RotateLeft.is_active());
    }

    #[test]
    fn test_recording_delta_compression() {
        let mut recording = InputRecording::new(1, 0);
        for t in 0..4 {
            recording.record(t, RotationCommand::RotateLeft);
        }
        assert_eq!(recording.delta_count(), 1);

        recording.record(4, RotationCommand::None);
        assert_eq!(recording.delta_count(), 2);
        assert_eq!(recording.tick_count(), 5);
    }

    #[test]
    fn test_idle_ticks_are_not_stored() {
        let mut recording = InputRecording::new(1, 0);
        for t in 0..100 {
            recording.record(t, RotationCommand::None);
        }
        assert_eq!(recording.delta_count(), 0);
        assert_eq!(recording.tick_count(), 100);
        assert!(recording.replay_iter().all(|(_, c)| c == RotationCommand::None));
    }

    #[test]
    fn test_command_at() {
        let mut recording = InputRecording::new(1, 0);
        recording.record(10, RotationCommand::RotateLeft);
        recording.record(20, RotationCommand::RotateRight);
        recording.record(30, RotationCommand::None);

        assert_eq!(recording.command_at(5), RotationCommand::None);
        assert_eq!(recording.command_at(10), RotationCommand::RotateLeft);
        assert_eq!(recording.command_at(15), RotationCommand::RotateLeft);
        assert_eq!(recording.command_at(25), RotationCommand::RotateRight);
        assert_eq!(recording.command_at(100), RotationCommand::None);
    }

    #[test]
    fn test_replay_iterator() {
        let mut recording = InputRecording::new(1, 0);
        recording.record(0, RotationCommand::RotateRight);
        recording.record(3, RotationCommand::RotateLeft);
        recording.finalize(5);

        let frames: Vec<_> = recording.replay_iter().collect();
        assert_eq!(frames.len(), 6);
        assert_eq!(frames[2], (2, RotationCommand::RotateRight));
        assert_eq!(frames[3], (3, RotationCommand::RotateLeft));
        assert_eq!(frames[5], (5, RotationCommand::RotateLeft));
    }

    #[test]
    fn test_recording_hash_tracks_content() {
        let mut a = InputRecording::new(1, 0);
        let mut b = InputRecording::new(1, 0);
        a.record(3, RotationCommand::RotateLeft);
        b.record(3, RotationCommand::RotateLeft);
        assert_eq!(a.compute_hash(), b.compute_hash());

        b.record(4, RotationCommand::RotateRight);
        assert_ne!(a.compute_hash(), b.compute_hash());
    }
}
