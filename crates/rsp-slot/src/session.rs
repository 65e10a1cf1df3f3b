//! Game session — balance, bet and the wager loop around a machine

use serde::{Deserialize, Serialize};

use rsp_core::{SlotError, SlotResult};

use crate::machine::{MachineEvent, SlotMachine, SpinOutcome};
use crate::timing::TimingConfig;

/// Wager settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub starting_balance: f64,
    pub starting_bet: f64,
    /// Increment used by `raise_bet` / `lower_bet`
    pub bet_step: f64,
    pub min_bet: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            starting_balance: 1000.0,
            starting_bet: 10.0,
            bet_step: 0.1,
            min_bet: 0.1,
        }
    }
}

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub total_bet: f64,
    pub total_win: f64,
    pub wins: u64,
    pub losses: u64,
    pub biggest_win: f64,
}

impl SessionStats {
    /// Return to player, percent
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0.0 {
            (self.total_win / self.total_bet) * 100.0
        } else {
            0.0
        }
    }

    /// Percent of settled spins that paid
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// A settled spin as seen by the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettledSpin {
    pub outcome: SpinOutcome,
    pub bet: f64,
    /// Exactly `total_win × bet`, 0 when nothing paid
    pub credited: f64,
    /// Balance after crediting
    pub balance: f64,
}

/// Bets and debits are kept to one decimal place
fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub struct GameSession {
    machine: SlotMachine,
    config: SessionConfig,
    balance: f64,
    bet: f64,
    /// Win shown for the last settled spin
    win: f64,
    autoplay_remaining: u32,
    stats: SessionStats,
}

impl GameSession {
    pub fn new(machine: SlotMachine, config: SessionConfig) -> SlotResult<Self> {
        if !(config.min_bet > 0.0 && config.bet_step > 0.0) {
            return Err(SlotError::InvalidConfig(
                "min_bet and bet_step must be positive".into(),
            ));
        }
        if !(config.starting_bet >= config.min_bet) {
            return Err(SlotError::InvalidBet(config.starting_bet));
        }
        if !(config.starting_balance >= 0.0) {
            return Err(SlotError::InvalidConfig(format!(
                "starting balance {} is negative",
                config.starting_balance
            )));
        }

        Ok(Self {
            machine,
            balance: round_tenths(config.starting_balance),
            bet: round_tenths(config.starting_bet),
            config,
            win: 0.0,
            autoplay_remaining: 0,
            stats: SessionStats::default(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // WAGER LOOP
    // ═══════════════════════════════════════════════════════════════════════════

    /// Debit the bet and start the reels
    pub fn spin(&mut self) -> SlotResult<()> {
        if self.machine.is_busy() {
            return Err(SlotError::SpinInProgress);
        }
        if self.balance - self.bet < 0.0 {
            log::warn!("spin rejected: balance {} below bet {}", self.balance, self.bet);
            return Err(SlotError::InsufficientBalance {
                balance: self.balance,
                bet: self.bet,
            });
        }

        self.machine.spin_reels()?;
        self.win = 0.0;
        self.balance = round_tenths(round_tenths(self.balance) - self.bet);
        self.stats.total_bet = round_tenths(self.stats.total_bet + self.bet);
        Ok(())
    }

    /// Forward a frame to the machine; returns the spin that settled on this frame
    pub fn update(&mut self, delta: f64) -> Option<SettledSpin> {
        let mut settled = None;
        for event in self.machine.update(delta) {
            if let MachineEvent::Settled(outcome) = event {
                settled = Some(self.credit(outcome));
            }
        }

        if settled.is_some() {
            self.next_autoplay_spin();
        }
        settled
    }

    fn credit(&mut self, outcome: SpinOutcome) -> SettledSpin {
        let credited = if outcome.total_win > 0.0 {
            outcome.total_win * self.bet
        } else {
            0.0
        };

        self.win = credited;
        self.balance += credited;

        self.stats.total_spins += 1;
        self.stats.total_win += credited;
        if credited > 0.0 {
            self.stats.wins += 1;
            self.stats.biggest_win = self.stats.biggest_win.max(credited);
        } else {
            self.stats.losses += 1;
        }

        log::info!(
            "spin {} credited {} (bet {}), balance {}",
            outcome.spin_id,
            credited,
            self.bet,
            self.balance
        );

        SettledSpin {
            outcome,
            bet: self.bet,
            credited,
            balance: self.balance,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // AUTOPLAY
    // ═══════════════════════════════════════════════════════════════════════════

    /// Play up to `spins` spins back to back, each started when the previous one settles
    pub fn start_autoplay(&mut self, spins: u32) -> SlotResult<()> {
        self.autoplay_remaining = spins;
        if self.machine.is_busy() || spins == 0 {
            return Ok(());
        }
        self.autoplay_remaining -= 1;
        self.spin().inspect_err(|_| self.autoplay_remaining = 0)
    }

    pub fn stop_autoplay(&mut self) {
        self.autoplay_remaining = 0;
    }

    fn next_autoplay_spin(&mut self) {
        if self.autoplay_remaining == 0 {
            return;
        }
        self.autoplay_remaining -= 1;
        if let Err(err) = self.spin() {
            log::warn!("autoplay stopped: {err}");
            self.autoplay_remaining = 0;
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BET CONTROLS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Set the bet; not allowed mid-spin so the credited bet is the staked one
    pub fn set_bet(&mut self, bet: f64) -> SlotResult<f64> {
        if self.machine.is_busy() {
            return Err(SlotError::SpinInProgress);
        }
        let bet = round_tenths(bet);
        if !bet.is_finite() || bet < self.config.min_bet {
            return Err(SlotError::InvalidBet(bet));
        }
        self.bet = bet;
        Ok(bet)
    }

    pub fn raise_bet(&mut self) -> SlotResult<f64> {
        self.set_bet(self.bet + self.config.bet_step)
    }

    /// Lower by one step; stays put at the minimum
    pub fn lower_bet(&mut self) -> SlotResult<f64> {
        let lowered = round_tenths(self.bet - self.config.bet_step);
        if lowered < self.config.min_bet {
            return Ok(self.bet);
        }
        self.set_bet(lowered)
    }

    /// Toggle between the quick-spin and normal timing profiles
    pub fn set_quick_spin(&mut self, enabled: bool) -> SlotResult<()> {
        let timing = if enabled {
            TimingConfig::turbo()
        } else {
            TimingConfig::normal()
        };
        self.machine.set_timing(timing)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Enabled state of the spin control
    pub fn can_spin(&self) -> bool {
        !self.machine.is_busy() && self.balance - self.bet >= 0.0
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn bet(&self) -> f64 {
        self.bet
    }

    pub fn win(&self) -> f64 {
        self.win
    }

    pub fn autoplay_remaining(&self) -> u32 {
        self.autoplay_remaining
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn machine(&self) -> &SlotMachine {
        &self.machine
    }

    /// End the session: pending reel actions are dropped
    pub fn close(mut self) -> SessionStats {
        self.autoplay_remaining = 0;
        self.machine.cancel();
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlotConfig;

    fn session() -> GameSession {
        let machine = SlotMachine::from_seed(SlotConfig::default(), 99).unwrap();
        GameSession::new(machine, SessionConfig::default()).unwrap()
    }

    #[test]
    fn test_round_tenths() {
        assert_eq!(round_tenths(0.1 + 0.2), 0.3);
        assert_eq!(round_tenths(10.04), 10.0);
        assert_eq!(round_tenths(9.96), 10.0);
    }

    #[test]
    fn test_spin_debits_bet() {
        let mut session = session();
        session.spin().unwrap();
        assert_eq!(session.balance(), 990.0);
        assert_eq!(session.win(), 0.0);
        assert!(!session.can_spin());
        assert!(matches!(session.spin(), Err(SlotError::SpinInProgress)));
    }

    #[test]
    fn test_bet_controls() {
        let mut session = session();
        assert_eq!(session.raise_bet().unwrap(), 10.1);
        assert_eq!(session.set_bet(0.1).unwrap(), 0.1);
        assert_eq!(session.lower_bet().unwrap(), 0.1);
        assert!(matches!(session.set_bet(0.0), Err(SlotError::InvalidBet(_))));
        assert!(matches!(session.set_bet(0.04), Err(SlotError::InvalidBet(_))));
        assert_eq!(session.set_bet(2.46).unwrap(), 2.5);
        assert!(session.set_bet(f64::NAN).is_err());
    }

    #[test]
    fn test_insufficient_balance_blocks_spin() {
        let machine = SlotMachine::from_seed(SlotConfig::default(), 5).unwrap();
        let config = SessionConfig {
            starting_balance: 5.0,
            ..SessionConfig::default()
        };
        let mut session = GameSession::new(machine, config).unwrap();
        assert!(!session.can_spin());
        assert!(matches!(
            session.spin(),
            Err(SlotError::InsufficientBalance { .. })
        ));
        assert_eq!(session.balance(), 5.0);
        assert!(!session.machine().is_busy());
    }

    #[test]
    fn test_invalid_session_config() {
        let machine = SlotMachine::from_seed(SlotConfig::default(), 5).unwrap();
        let config = SessionConfig {
            starting_bet: 0.01,
            ..SessionConfig::default()
        };
        assert!(GameSession::new(machine, config).is_err());
    }

    #[test]
    fn test_stats_rates() {
        let stats = SessionStats {
            total_spins: 4,
            total_bet: 40.0,
            total_win: 30.0,
            wins: 1,
            losses: 3,
            biggest_win: 30.0,
        };
        assert_eq!(stats.rtp(), 75.0);
        assert_eq!(stats.hit_rate(), 25.0);
        assert_eq!(SessionStats::default().rtp(), 0.0);
    }
}
