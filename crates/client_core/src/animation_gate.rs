//! Single-flight guard for camera animations: later requests are dropped,
//! never queued.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_SLACK: Duration = Duration::from_millis(100);
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(1000);

/// Identifies one admitted animation. Completion reports carry it back so a
/// late report can never release a newer animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationTicket {
    generation: u64,
}

impl AnimationTicket {
    pub fn from_generation(generation: u64) -> Self {
        Self { generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Admitted(AnimationTicket),
    Dropped,
}

impl GateDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, GateDecision::Admitted(_))
    }
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    ticket: AnimationTicket,
    release_at: Instant,
}

#[derive(Debug)]
pub struct AnimationGate {
    slack: Duration,
    next_generation: u64,
    in_flight: Option<InFlight>,
}

impl Default for AnimationGate {
    fn default() -> Self {
        Self::new(DEFAULT_SLACK)
    }
}

impl AnimationGate {
    pub fn new(slack: Duration) -> Self {
        Self {
            slack,
            next_generation: 1,
            in_flight: None,
        }
    }

    pub fn slack(&self) -> Duration {
        self.slack
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
            .is_some_and(|flight| Instant::now() < flight.release_at)
    }

    /// Runs `animate` only when no other animation holds the gate.
    pub fn request<F>(&mut self, duration: Duration, animate: F) -> GateDecision
    where
        F: FnOnce(AnimationTicket),
    {
        if self.is_in_flight() {
            debug!("camera animation dropped, another one is in flight");
            return GateDecision::Dropped;
        }

        let ticket = AnimationTicket::from_generation(self.next_generation);
        self.next_generation += 1;
        self.in_flight = Some(InFlight {
            ticket,
            release_at: Instant::now() + duration + self.slack,
        });
        animate(ticket);
        GateDecision::Admitted(ticket)
    }

    /// Completion signal from the map surface. Returns whether it released
    /// the gate; reports for anything but the current animation are ignored.
    pub fn complete(&mut self, ticket: AnimationTicket) -> bool {
        match self.in_flight {
            Some(flight) if flight.ticket == ticket => {
                self.in_flight = None;
                true
            }
            _ => {
                debug!(
                    generation = ticket.generation(),
                    "ignoring stale animation completion"
                );
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/animation_gate_tests.rs"]
mod tests;
