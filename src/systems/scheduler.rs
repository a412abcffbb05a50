//! Animation lifecycle.
//!
//! The host owns the frame callback and the drain timer; the scheduler decides
//! when each should start or stop and reports it as a [`Schedule`].
//!
//! ```text
//! Idle --pointer--> Running --leave--> Draining --rest/offscreen--> Idle
//!                      ^                   |
//!                      +-----pointer-------+
//! ```

use wasm_bindgen::prelude::*;

/// Poll interval for the drain check after the pointer leaves
pub const DRAIN_INTERVAL_MS: u32 = 17;

#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Not animating; a pending frame callback ends its chain
    Idle = 0,
    /// Frames running under pointer influence
    Running = 1,
    /// Pointer gone; frames keep running while the host polls `drain_check`
    Draining = 2,
}

/// What the host should do after an event.
///
/// At most one frame callback is outstanding: `RequestFrame` is only issued
/// when the previous chain has ended by `frame()` returning false.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schedule {
    Nothing = 0,
    /// Start the per-frame callback
    RequestFrame = 1,
    /// Start polling `drain_check` every `DRAIN_INTERVAL_MS`
    StartDrainTimer = 2,
    /// Stop polling; frames continue
    StopDrainTimer = 3,
}

/// Result of one drain poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Drain {
    /// Particles still moving; poll again
    Continue,
    /// Stop polling
    Stop,
    /// Stop polling and rebuild particles from the source
    Reset,
}

#[derive(Clone, Debug)]
pub struct Scheduler {
    phase: Phase,
    /// The host holds a frame callback that has not yet seen `Idle`
    frame_queued: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self { phase: Phase::Idle, frame_queued: false }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a frame callback handed to the host is still pending.
    pub fn is_frame_queued(&self) -> bool {
        self.frame_queued
    }

    /// A queued frame callback fired. Returns whether it should run and be
    /// queued again; once idle the chain ends here.
    pub fn on_frame(&mut self) -> bool {
        if self.phase == Phase::Idle {
            self.frame_queued = false;
            return false;
        }
        true
    }

    /// Pointer entered or moved over the surface.
    pub fn on_pointer_active(&mut self) -> Schedule {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Running;
                if self.frame_queued {
                    // The pending callback picks the new phase up
                    Schedule::Nothing
                } else {
                    self.frame_queued = true;
                    Schedule::RequestFrame
                }
            }
            Phase::Draining => {
                self.phase = Phase::Running;
                Schedule::StopDrainTimer
            }
            Phase::Running => Schedule::Nothing,
        }
    }

    pub fn on_pointer_leave(&mut self) -> Schedule {
        match self.phase {
            Phase::Running => {
                self.phase = Phase::Draining;
                Schedule::StartDrainTimer
            }
            Phase::Idle | Phase::Draining => Schedule::Nothing,
        }
    }

    /// One drain poll. Leaving the viewport wins over coming to rest.
    pub fn check_drain(&mut self, at_rest: bool, visible: bool) -> Drain {
        if self.phase != Phase::Draining {
            return Drain::Stop;
        }
        if !visible {
            self.phase = Phase::Idle;
            Drain::Reset
        } else if at_rest {
            self.phase = Phase::Idle;
            Drain::Stop
        } else {
            Drain::Continue
        }
    }

    /// Drop any scheduled work (resample, resize).
    pub fn cancel(&mut self) -> Schedule {
        let was = std::mem::replace(&mut self.phase, Phase::Idle);
        if was == Phase::Draining {
            Schedule::StopDrainTimer
        } else {
            Schedule::Nothing
        }
    }
}
