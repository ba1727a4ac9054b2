//! Clock-driven debouncing.
//!
//! Every `schedule` call replaces the pending trigger of its channel and re-arms the deadline
//! from the *current* instant. A channel fires at most once per quiet period, with the latest
//! trigger it received.

use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Pending<T> {
    trigger: T,
    deadline: Instant,
    generation: u64,
}

/// Handle for one armed timer. Hosts with callback timers hand it back to [`Debouncer::fire`];
/// a handle whose arm was superseded never fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Armed {
    pub generation: u64,
    pub deadline: Instant,
}

#[derive(Debug, Clone)]
pub struct Debouncer<C, T> {
    quiet_period: Duration,
    pending: FxHashMap<C, Pending<T>>,
    generation: u64,
}

impl<C, T> Debouncer<C, T>
where
    C: Eq + Hash + Clone,
{
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: FxHashMap::default(),
            generation: 0,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    pub fn schedule(&mut self, channel: C, trigger: T, now: Instant) -> Armed {
        self.schedule_after(channel, trigger, now, self.quiet_period)
    }

    pub fn schedule_after(&mut self, channel: C, trigger: T, now: Instant, delay: Duration) -> Armed {
        self.generation += 1;
        let armed = Armed {
            generation: self.generation,
            deadline: now + delay,
        };
        self.pending.insert(
            channel,
            Pending {
                trigger,
                deadline: armed.deadline,
                generation: armed.generation,
            },
        );
        armed
    }

    pub fn cancel(&mut self, channel: &C) -> Option<T> {
        self.pending.remove(channel).map(|p| p.trigger)
    }

    pub fn is_pending(&self, channel: &C) -> bool {
        self.pending.contains_key(channel)
    }

    /// Earliest armed deadline, for hosts that sleep until the next timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    /// Callback-timer entry point: yields the trigger only if `armed` is still the surviving
    /// arm of `channel`.
    pub fn fire(&mut self, channel: &C, armed: Armed) -> Option<T> {
        match self.pending.get(channel) {
            Some(p) if p.generation == armed.generation => {
                self.pending.remove(channel).map(|p| p.trigger)
            }
            _ => None,
        }
    }

    /// Polling entry point: removes and returns every channel whose deadline has passed, in
    /// deadline order.
    pub fn take_due(&mut self, now: Instant) -> Vec<(C, T)> {
        let mut due: Vec<(C, Instant)> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(c, p)| (c.clone(), p.deadline))
            .collect();
        due.sort_by_key(|(_, deadline)| *deadline);

        due.into_iter()
            .filter_map(|(c, _)| self.pending.remove(&c).map(|p| (c, p.trigger)))
            .collect()
    }
}
