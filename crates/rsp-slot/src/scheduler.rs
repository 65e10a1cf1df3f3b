//! Delayed machine actions driven by the frame clock
//!
//! Replaces fire-and-forget timers: tasks live in a list owned by the
//! machine and can be dropped wholesale when a session ends.

use rsp_core::ReelId;

/// Work the machine defers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineAction {
    StartReel(ReelId),
    StopReel(ReelId),
}

#[derive(Debug, Clone, Copy)]
struct ScheduledTask {
    due: f64,
    /// Insertion order, breaks ties between equal due times
    seq: u64,
    action: MachineAction,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    clock: f64,
    next_seq: u64,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to fire `delay` after the current clock
    pub fn schedule(&mut self, delay: f64, action: MachineAction) {
        let task = ScheduledTask {
            due: self.clock + delay.max(0.0),
            seq: self.next_seq,
            action,
        };
        self.next_seq += 1;
        self.tasks.push(task);
    }

    /// Advance the clock and drain every task now due, earliest first
    ///
    /// Deltas that are negative or not finite leave the clock where it is.
    pub fn advance(&mut self, delta: f64) -> Vec<MachineAction> {
        if delta.is_finite() && delta > 0.0 {
            self.clock += delta;
        }
        let clock = self.clock;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|t| t.due <= clock);
        self.tasks = pending;

        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|t| t.action).collect()
    }

    /// Drop every pending task and rewind the clock
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.tasks.len();
        self.tasks.clear();
        self.clock = 0.0;
        dropped
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_delay_fires_on_next_advance() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0.0, MachineAction::StartReel(0));
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.advance(0.0), vec![MachineAction::StartReel(0)]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(20.0, MachineAction::StopReel(0));
        scheduler.schedule(10.0, MachineAction::StartReel(1));
        scheduler.schedule(10.0, MachineAction::StartReel(2));

        assert!(scheduler.advance(5.0).is_empty());
        assert_eq!(
            scheduler.advance(30.0),
            vec![
                MachineAction::StartReel(1),
                MachineAction::StartReel(2),
                MachineAction::StopReel(0),
            ]
        );
    }

    #[test]
    fn test_cancel_all() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(1.0, MachineAction::StartReel(0));
        scheduler.schedule(2.0, MachineAction::StopReel(0));
        assert_eq!(scheduler.cancel_all(), 2);
        assert!(scheduler.advance(10.0).is_empty());
    }

    #[test]
    fn test_bad_delta_keeps_clock() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(2.0, MachineAction::StopReel(0));
        assert!(scheduler.advance(f64::NAN).is_empty());
        assert!(scheduler.advance(-50.0).is_empty());
        assert!(scheduler.advance(1.0).is_empty());
        assert_eq!(scheduler.advance(1.0), vec![MachineAction::StopReel(0)]);
    }

    #[test]
    fn test_cancel_all_rewinds_clock() {
        let mut scheduler = Scheduler::new();
        scheduler.advance(500.0);
        scheduler.schedule(5.0, MachineAction::StartReel(0));
        scheduler.cancel_all();

        scheduler.schedule(5.0, MachineAction::StartReel(1));
        assert!(scheduler.advance(4.0).is_empty());
        assert_eq!(scheduler.advance(1.0), vec![MachineAction::StartReel(1)]);
    }
}
