// ============================================================================
// REELSPIN — WASM Port
// WebAssembly bindings for the ReelSpin slot game
// The page owns the canvas and the animation frame; this module owns the game
// ============================================================================

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use rsp_core::{SlotError, SymbolId};
use rsp_slot::{GameSession, LineWin, SessionConfig, SettledSpin, SlotConfig, SlotMachine};

// ============================================================================
// INITIALIZATION
// ============================================================================

#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    console_log::init_with_level(log::Level::Info).ok();
    log::info!("[ReelSpin WASM] Initialized");
}

fn js_error(err: SlotError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

/// Unseeded machine; `Math.random` provides the seed in the browser
#[cfg(target_arch = "wasm32")]
fn entropy_machine(config: SlotConfig) -> Result<SlotMachine, SlotError> {
    let high = (js_sys::Math::random() * 4_294_967_296.0) as u64;
    let low = (js_sys::Math::random() * 4_294_967_296.0) as u64;
    SlotMachine::from_seed(config, (high << 32) | low)
}

#[cfg(not(target_arch = "wasm32"))]
fn entropy_machine(config: SlotConfig) -> Result<SlotMachine, SlotError> {
    SlotMachine::from_os_rng(config)
}

// ============================================================================
// TYPES
// ============================================================================

/// Flat view of a settled spin handed to the page
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpinReport {
    pub spin_id: u64,
    pub grid: Vec<Vec<SymbolId>>,
    pub line_wins: Vec<LineWin>,
    /// Pre-bet multiplier total
    pub total_win: f64,
    pub bet: f64,
    pub credited: f64,
    pub balance: f64,
}

impl From<SettledSpin> for SpinReport {
    fn from(settled: SettledSpin) -> Self {
        Self {
            spin_id: settled.outcome.spin_id,
            grid: settled.outcome.grid,
            line_wins: settled.outcome.evaluation.line_wins,
            total_win: settled.outcome.total_win,
            bet: settled.bet,
            credited: settled.credited,
            balance: settled.balance,
        }
    }
}

// ============================================================================
// GAME (JS-visible)
// ============================================================================

#[wasm_bindgen]
pub struct WasmSlotGame {
    session: GameSession,
}

impl WasmSlotGame {
    fn build(config_json: Option<String>, seed: Option<u64>) -> Result<Self, SlotError> {
        let config = match config_json {
            Some(json) => SlotConfig::from_json(&json)?,
            None => SlotConfig::default(),
        };
        let machine = match seed {
            Some(seed) => SlotMachine::from_seed(config, seed)?,
            None => entropy_machine(config)?,
        };
        let session = GameSession::new(machine, SessionConfig::default())?;
        Ok(Self { session })
    }
}

#[wasm_bindgen]
impl WasmSlotGame {
    /// Create a game from an optional JSON machine config
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmSlotGame, JsValue> {
        Self::build(config_json, None).map_err(js_error)
    }

    /// Reproducible game for replays and tests
    #[wasm_bindgen]
    pub fn with_seed(config_json: Option<String>, seed: u32) -> Result<WasmSlotGame, JsValue> {
        Self::build(config_json, Some(u64::from(seed))).map_err(js_error)
    }

    /// Debit the bet and start the reels
    #[wasm_bindgen]
    pub fn spin(&mut self) -> Result<(), JsValue> {
        self.session.spin().map_err(js_error)
    }

    /// Advance one animation frame; returns the settled spin or `null`
    #[wasm_bindgen]
    pub fn update(&mut self, delta: f64) -> Result<JsValue, JsValue> {
        match self.session.update(delta) {
            Some(settled) => to_js(&SpinReport::from(settled)),
            None => Ok(JsValue::NULL),
        }
    }

    /// Reel and tile positions for the renderer
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.machine().snapshot())
    }

    #[wasm_bindgen]
    pub fn stats(&self) -> Result<JsValue, JsValue> {
        to_js(self.session.stats())
    }

    /// Image path for a symbol id
    #[wasm_bindgen]
    pub fn symbol_asset(&self, symbol: SymbolId) -> Option<String> {
        self.session
            .machine()
            .config()
            .catalog
            .asset(symbol)
            .map(str::to_owned)
    }

    // ════════════════════════════════════════════════════════════════════════
    // BET CONTROLS
    // ════════════════════════════════════════════════════════════════════════

    #[wasm_bindgen]
    pub fn raise_bet(&mut self) -> Result<f64, JsValue> {
        self.session.raise_bet().map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn lower_bet(&mut self) -> Result<f64, JsValue> {
        self.session.lower_bet().map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn set_bet(&mut self, bet: f64) -> Result<f64, JsValue> {
        self.session.set_bet(bet).map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn set_quick_spin(&mut self, enabled: bool) -> Result<(), JsValue> {
        self.session.set_quick_spin(enabled).map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn start_autoplay(&mut self, spins: u32) -> Result<(), JsValue> {
        self.session.start_autoplay(spins).map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn stop_autoplay(&mut self) {
        self.session.stop_autoplay();
    }

    // ════════════════════════════════════════════════════════════════════════
    // GETTERS
    // ════════════════════════════════════════════════════════════════════════

    #[wasm_bindgen(getter)]
    pub fn balance(&self) -> f64 {
        self.session.balance()
    }

    #[wasm_bindgen(getter)]
    pub fn bet(&self) -> f64 {
        self.session.bet()
    }

    #[wasm_bindgen(getter)]
    pub fn win(&self) -> f64 {
        self.session.win()
    }

    #[wasm_bindgen(getter)]
    pub fn can_spin(&self) -> bool {
        self.session.can_spin()
    }

    #[wasm_bindgen(getter)]
    pub fn is_spinning(&self) -> bool {
        self.session.machine().is_busy()
    }

    #[wasm_bindgen(getter)]
    pub fn autoplay_remaining(&self) -> u32 {
        self.session.autoplay_remaining()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn run_until_settled(game: &mut WasmSlotGame) -> SettledSpin {
        for _ in 0..5_000 {
            if let Some(settled) = game.session.update(1.0) {
                return settled;
            }
        }
        panic!("spin never settled");
    }

    #[test]
    fn test_build_default_game() {
        let game = WasmSlotGame::build(None, Some(1)).unwrap();
        assert_eq!(game.balance(), 1000.0);
        assert_eq!(game.bet(), 10.0);
        assert!(game.can_spin());
        assert_eq!(
            game.symbol_asset(3).as_deref(),
            Some("assets/images/symbol3.png")
        );
        assert_eq!(game.symbol_asset(99), None);
    }

    #[test]
    fn test_unseeded_build_uses_entropy() {
        let mut game = WasmSlotGame::build(None, None).unwrap();
        game.session.spin().unwrap();
        let settled = run_until_settled(&mut game);
        assert_eq!(settled.outcome.grid.len(), 5);
    }

    #[test]
    fn test_build_rejects_bad_json() {
        assert!(WasmSlotGame::build(Some("{ not json".into()), Some(1)).is_err());
    }

    #[test]
    fn test_report_flattens_settled_spin() {
        let mut game = WasmSlotGame::build(None, Some(9)).unwrap();
        game.session.spin().unwrap();
        let settled = run_until_settled(&mut game);
        let expected_total = settled.outcome.total_win;
        let report = SpinReport::from(settled);

        assert_eq!(report.spin_id, 1);
        assert_eq!(report.grid.len(), 5);
        assert_eq!(report.total_win, expected_total);
        assert_eq!(report.balance, game.balance());
        assert!(!game.is_spinning());
    }
}
