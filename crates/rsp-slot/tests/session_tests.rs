//! Wager Loop Integration Tests
//!
//! Single-symbol catalogs make every settled grid known in advance, so the
//! credited amounts below are exact.

use approx::assert_relative_eq;
use rsp_slot::{
    GameSession, GridSpec, Payline, SessionConfig, SettledSpin, SlotConfig, SlotError,
    SlotMachine, SymbolCatalog, SymbolDef, TimingConfig,
};

const MAX_FRAMES: usize = 5_000;

fn single_symbol_config(paytable: &[f64]) -> SlotConfig {
    SlotConfig {
        grid: GridSpec::standard_5x3(),
        catalog: SymbolCatalog::new(vec![SymbolDef::new(0, "X", "x.png", paytable)]),
        paylines: vec![Payline::straight(0, 1, 5)],
        ..SlotConfig::default()
    }
}

fn session_with(config: SlotConfig, session: SessionConfig) -> GameSession {
    let _ = env_logger::builder().is_test(true).try_init();
    let machine = SlotMachine::from_seed(config, 77).unwrap();
    GameSession::new(machine, session).unwrap()
}

fn run_until_settled(session: &mut GameSession) -> SettledSpin {
    for _ in 0..MAX_FRAMES {
        if let Some(settled) = session.update(1.0) {
            return settled;
        }
    }
    panic!("spin never settled");
}

#[test]
fn test_full_line_credits_fifty_times_bet() {
    let mut session = session_with(
        single_symbol_config(&[0.0, 0.0, 4.0, 15.0, 50.0]),
        SessionConfig::default(),
    );

    session.spin().unwrap();
    assert_eq!(session.balance(), 990.0);

    let settled = run_until_settled(&mut session);
    assert_eq!(settled.outcome.total_win, 50.0);
    assert_eq!(settled.outcome.evaluation.line_wins[0].match_count, 4);
    assert_eq!(settled.credited, 500.0);
    assert_eq!(session.win(), 500.0);
    assert_eq!(session.balance(), 1490.0);
    assert!(session.can_spin());
    assert_relative_eq!(session.stats().rtp(), 5000.0);
    assert_relative_eq!(session.stats().hit_rate(), 100.0);
}

#[test]
fn test_fractional_win_credited_exactly() {
    let mut session = session_with(
        single_symbol_config(&[0.0, 0.0, 0.0, 0.0, 0.333]),
        SessionConfig::default(),
    );

    session.spin().unwrap();
    let settled = run_until_settled(&mut session);
    assert_eq!(settled.outcome.total_win, 0.333);
    assert_eq!(settled.credited, 0.333 * 10.0);
    assert_eq!(session.win(), 0.333 * 10.0);
    assert_eq!(session.balance(), 990.0 + 0.333 * 10.0);

    // The next debit works on the balance rounded to one decimal place
    session.spin().unwrap();
    assert_relative_eq!(session.balance(), 983.3, epsilon = 1e-9);
}

#[test]
fn test_losing_spin_only_debits_bet() {
    let mut session = session_with(single_symbol_config(&[0.0; 5]), SessionConfig::default());

    session.spin().unwrap();
    let settled = run_until_settled(&mut session);

    assert_eq!(settled.credited, 0.0);
    assert_eq!(session.balance(), 990.0);
    assert_eq!(session.win(), 0.0);
    assert_eq!(session.stats().losses, 1);
}

#[test]
fn test_bet_locked_during_spin() {
    let mut session = session_with(SlotConfig::default(), SessionConfig::default());
    session.spin().unwrap();
    assert!(matches!(session.raise_bet(), Err(SlotError::SpinInProgress)));
    assert!(matches!(
        session.set_quick_spin(true),
        Err(SlotError::SpinInProgress)
    ));
    run_until_settled(&mut session);
    assert_eq!(session.raise_bet().unwrap(), 10.1);
}

#[test]
fn test_autoplay_runs_requested_spins() {
    let mut session = session_with(single_symbol_config(&[0.0; 5]), SessionConfig::default());
    session.start_autoplay(3).unwrap();
    assert_eq!(session.autoplay_remaining(), 2);

    let mut settled = 0;
    for _ in 0..3 * MAX_FRAMES {
        if session.update(1.0).is_some() {
            settled += 1;
        }
        if settled == 3 {
            break;
        }
    }

    assert_eq!(settled, 3);
    assert_eq!(session.autoplay_remaining(), 0);
    assert!(!session.machine().is_busy());
    assert_eq!(session.balance(), 970.0);
    assert_eq!(session.stats().total_spins, 3);
    assert_eq!(session.stats().total_bet, 30.0);
}

#[test]
fn test_autoplay_stops_when_balance_runs_out() {
    let mut session = session_with(
        single_symbol_config(&[0.0; 5]),
        SessionConfig {
            starting_balance: 20.0,
            ..SessionConfig::default()
        },
    );
    session.start_autoplay(10).unwrap();

    let mut settled = 0;
    for _ in 0..4 * MAX_FRAMES {
        if session.update(1.0).is_some() {
            settled += 1;
        }
        if !session.machine().is_busy() && session.autoplay_remaining() == 0 {
            break;
        }
    }

    assert_eq!(settled, 2);
    assert_eq!(session.balance(), 0.0);
    assert!(!session.can_spin());
}

#[test]
fn test_quick_spin_between_spins() {
    let mut session = session_with(SlotConfig::default(), SessionConfig::default());
    session.set_quick_spin(true).unwrap();
    assert_eq!(session.machine().config().timing, TimingConfig::turbo());

    session.spin().unwrap();
    let mut frames = 0;
    while session.update(1.0).is_none() {
        frames += 1;
        assert!(frames < MAX_FRAMES);
    }
    assert!(frames < 150);
}

#[test]
fn test_close_returns_stats() {
    let mut session = session_with(single_symbol_config(&[0.0; 5]), SessionConfig::default());
    session.spin().unwrap();
    run_until_settled(&mut session);
    session.spin().unwrap();
    let stats = session.close();
    assert_eq!(stats.total_spins, 1);
    assert_eq!(stats.total_bet, 20.0);
}
