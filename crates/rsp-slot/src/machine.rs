//! SlotMachine — owns the reels and sequences a spin
//!
//! ```text
//! spin_reels()
//!     │  StartReel(i) at i × start_stagger
//!     │  StopReel(0) at first_stop_delay
//!     v
//! update(delta) ── reel i completes ──> stop reel i + 1 ── ... ──> settle
//!                                                                   │
//!                                              MachineEvent::Settled(SpinOutcome)
//! ```

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use rsp_core::{ReelId, SlotError, SlotResult, SymbolId};

use crate::config::SlotConfig;
use crate::paytable::{EvaluationResult, PayTable};
use crate::reel::{Reel, ReelSnapshot, ReelState, SpinComplete};
use crate::scheduler::{MachineAction, Scheduler};
use crate::timing::TimingConfig;

/// Reel lifecycle notifications produced by `SlotMachine::update`
#[derive(Debug, Clone, PartialEq)]
pub enum MachineEvent {
    ReelStarted(ReelId),
    ReelStopping(ReelId),
    ReelStopped(ReelId),
    /// All reels idle; carries the evaluated grid
    Settled(SpinOutcome),
}

/// Result of one settled spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    /// Sequence number of the spin on this machine
    pub spin_id: u64,
    /// Settled grid (reels × visible rows)
    pub grid: Vec<Vec<SymbolId>>,
    /// Per-line breakdown
    pub evaluation: EvaluationResult,
    /// Pre-bet total across all paylines
    pub total_win: f64,
}

/// Render-facing view of the whole machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub width: f64,
    pub height: f64,
    pub tile_height: f64,
    pub reels: Vec<ReelSnapshot>,
}

pub struct SlotMachine {
    config: SlotConfig,
    paytable: PayTable,
    reels: Vec<Reel>,
    /// Reel currently being brought to rest
    current_reel: usize,
    scheduler: Scheduler,
    rng: StdRng,
    spin_count: u64,
    /// Between `spin_reels()` and settle
    in_flight: bool,
}

impl SlotMachine {
    /// Validate `config` and build the reels
    pub fn new(config: SlotConfig, mut rng: StdRng) -> SlotResult<Self> {
        config.validate()?;

        let reels = (0..config.grid.reels as usize)
            .map(|id| Reel::new(id, &config, &mut rng))
            .collect();
        let paytable = PayTable::new(config.catalog.clone(), config.paylines.clone());

        log::info!(
            "slot machine ready: {}×{} grid, {} symbols, {} paylines",
            config.grid.reels,
            config.grid.visible_rows,
            config.catalog.len(),
            config.paylines.len()
        );

        Ok(Self {
            config,
            paytable,
            reels,
            current_reel: 0,
            scheduler: Scheduler::new(),
            rng,
            spin_count: 0,
            in_flight: false,
        })
    }

    /// Reproducible machine
    pub fn from_seed(config: SlotConfig, seed: u64) -> SlotResult<Self> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    /// Machine seeded from the operating system
    #[cfg(feature = "os-rng")]
    pub fn from_os_rng(config: SlotConfig) -> SlotResult<Self> {
        Self::new(config, StdRng::from_os_rng())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN SEQUENCING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start a spin: staggered reel starts, then a delayed stop of reel 0
    pub fn spin_reels(&mut self) -> SlotResult<u64> {
        if self.is_busy() {
            return Err(SlotError::SpinInProgress);
        }

        self.scheduler.cancel_all();
        self.current_reel = 0;
        self.spin_count += 1;
        self.in_flight = true;

        let timing = &self.config.timing;
        for id in 0..self.reels.len() {
            self.scheduler
                .schedule(id as f64 * timing.start_stagger, MachineAction::StartReel(id));
        }
        self.scheduler
            .schedule(timing.first_stop_delay, MachineAction::StopReel(0));

        log::debug!("spin {} scheduled", self.spin_count);
        Ok(self.spin_count)
    }

    /// Advance one frame
    ///
    /// Due scheduled actions fire first, then every reel receives `delta`.
    pub fn update(&mut self, delta: f64) -> Vec<MachineEvent> {
        let mut events = Vec::new();
        if !delta.is_finite() || delta < 0.0 {
            log::warn!("machine ignoring frame delta {delta}");
            return events;
        }

        for action in self.scheduler.advance(delta) {
            match action {
                MachineAction::StartReel(id) => self.start_reel(id, &mut events),
                MachineAction::StopReel(id) => self.stop_reel(id, &mut events),
            }
        }

        for id in 0..self.reels.len() {
            if let Some(done) = self.reels[id].update(delta, &mut self.rng) {
                self.on_reel_spin_complete(done, &mut events);
            }
        }

        events
    }

    /// Abandon the current spin: pending actions are dropped and moving reels
    /// snap to rest. No settle event is produced.
    pub fn cancel(&mut self) {
        let dropped = self.scheduler.cancel_all();
        for reel in &mut self.reels {
            reel.halt(&mut self.rng);
        }
        if self.in_flight {
            log::info!("spin {} cancelled ({} pending actions dropped)", self.spin_count, dropped);
        }
        self.in_flight = false;
        self.current_reel = 0;
    }

    fn start_reel(&mut self, id: ReelId, events: &mut Vec<MachineEvent>) {
        let result = self.reels[id].spin();
        if let Err(err) = &result {
            log::error!("start of reel {id} rejected: {err}");
        }
        debug_assert!(result.is_ok(), "reel {id} started twice");
        if result.is_ok() {
            events.push(MachineEvent::ReelStarted(id));
        }
    }

    fn stop_reel(&mut self, id: ReelId, events: &mut Vec<MachineEvent>) {
        let result = self.reels[id].stop();
        if let Err(err) = &result {
            log::error!("stop of reel {id} rejected: {err}");
        }
        debug_assert!(result.is_ok(), "reel {id} stopped out of sequence");
        if result.is_ok() {
            events.push(MachineEvent::ReelStopping(id));
        }
    }

    /// Reels stop strictly left to right: each completion stops the next reel
    fn on_reel_spin_complete(&mut self, done: SpinComplete, events: &mut Vec<MachineEvent>) {
        debug_assert_eq!(done.reel, self.current_reel);
        events.push(MachineEvent::ReelStopped(done.reel));

        self.current_reel += 1;
        if self.current_reel < self.reels.len() {
            self.stop_reel(self.current_reel, events);
        } else {
            events.push(MachineEvent::Settled(self.settle()));
        }
    }

    fn settle(&mut self) -> SpinOutcome {
        self.in_flight = false;
        let grid = self.grid();
        let evaluation = self.paytable.evaluate(&grid);
        let total_win = evaluation.total_win;

        log::info!(
            "spin {} settled: {} winning lines, total {}",
            self.spin_count,
            evaluation.win_count(),
            total_win
        );

        SpinOutcome {
            spin_id: self.spin_count,
            grid,
            evaluation,
            total_win,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Replace timing constants between spins
    pub fn set_timing(&mut self, timing: TimingConfig) -> SlotResult<()> {
        if self.is_busy() {
            return Err(SlotError::SpinInProgress);
        }
        timing.validate(self.config.grid.reels)?;
        for reel in &mut self.reels {
            reel.set_timing(timing.clone())?;
        }
        self.config.timing = timing;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// A spin is scheduled, running or not yet settled
    pub fn is_busy(&self) -> bool {
        self.in_flight || !self.scheduler.is_empty() || self.reels.iter().any(|r| !r.is_idle())
    }

    /// Visible symbols, reels × rows
    pub fn grid(&self) -> Vec<Vec<SymbolId>> {
        self.reels.iter().map(Reel::visible_symbols).collect()
    }

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    pub fn reel_states(&self) -> Vec<ReelState> {
        self.reels.iter().map(Reel::state).collect()
    }

    pub fn current_reel(&self) -> usize {
        self.current_reel
    }

    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    pub fn paytable(&self) -> &PayTable {
        &self.paytable
    }

    pub fn spin_count(&self) -> u64 {
        self.spin_count
    }

    pub fn pending_actions(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            width: self.config.width,
            height: self.config.height,
            tile_height: self.config.tile_height(),
            reels: self.reels.iter().map(Reel::snapshot).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paytable;

    fn machine() -> SlotMachine {
        SlotMachine::from_seed(SlotConfig::default(), 1234).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = SlotConfig::default();
        config.grid.visible_rows = 0;
        assert!(SlotMachine::from_seed(config, 0).is_err());
    }

    #[test]
    fn test_spin_schedules_starts_and_first_stop() {
        let mut machine = machine();
        assert_eq!(machine.spin_reels().unwrap(), 1);
        assert_eq!(machine.pending_actions(), 6);
        assert!(machine.is_busy());
        assert!(matches!(machine.spin_reels(), Err(SlotError::SpinInProgress)));

        let events = machine.update(0.0);
        assert_eq!(events, vec![MachineEvent::ReelStarted(0)]);
        assert_eq!(machine.reel_states()[0], ReelState::Spinning);
        assert_eq!(machine.reel_states()[1], ReelState::Idle);
    }

    #[test]
    fn test_staggered_start_times() {
        let mut machine = machine();
        machine.spin_reels().unwrap();
        let mut started_at = Vec::new();
        for frame in 0..80 {
            for event in machine.update(1.0) {
                if let MachineEvent::ReelStarted(id) = event {
                    started_at.push((id, frame + 1));
                }
            }
        }
        assert_eq!(started_at, vec![(0, 1), (1, 18), (2, 36), (3, 54), (4, 72)]);
    }

    #[test]
    fn test_settle_evaluates_visible_grid() {
        let mut machine = machine();
        machine.spin_reels().unwrap();

        let mut outcome = None;
        for _ in 0..1000 {
            for event in machine.update(1.0) {
                if let MachineEvent::Settled(o) = event {
                    outcome = Some(o);
                }
            }
            if outcome.is_some() {
                break;
            }
        }

        let outcome = outcome.expect("machine never settled");
        assert!(!machine.is_busy());
        assert_eq!(outcome.grid, machine.grid());
        let config = machine.config();
        assert_eq!(
            outcome.total_win,
            paytable::evaluate(&outcome.grid, &config.paylines, &config.catalog)
        );
    }

    #[test]
    fn test_cancel_halts_everything() {
        let mut machine = machine();
        machine.spin_reels().unwrap();
        for _ in 0..40 {
            machine.update(1.0);
        }
        machine.cancel();
        assert!(!machine.is_busy());
        assert_eq!(machine.pending_actions(), 0);
        assert!(machine.update(1.0).is_empty());
        assert!(machine.spin_reels().is_ok());
    }

    #[test]
    fn test_set_timing_only_between_spins() {
        let mut machine = machine();
        machine.set_timing(TimingConfig::turbo()).unwrap();
        machine.spin_reels().unwrap();
        assert!(matches!(
            machine.set_timing(TimingConfig::normal()),
            Err(SlotError::SpinInProgress)
        ));
    }
}
