//! Paylines and win evaluation

use serde::{Deserialize, Serialize};

use rsp_core::{SlotError, SlotResult, SymbolId};

use crate::symbols::SymbolCatalog;

/// A payline definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payline {
    /// Payline index (0-based)
    pub index: u8,
    /// Visible row for each reel, left to right (0 = top row)
    pub rows: Vec<u8>,
}

impl Payline {
    pub fn new(index: u8, rows: &[u8]) -> Self {
        Self {
            index,
            rows: rows.to_vec(),
        }
    }

    /// Same row across all reels
    pub fn straight(index: u8, row: u8, reel_count: u8) -> Self {
        Self {
            index,
            rows: vec![row; reel_count as usize],
        }
    }

    /// Check the line against the grid shape
    pub fn validate(&self, reel_count: u8, visible_rows: u8) -> SlotResult<()> {
        if self.rows.len() != reel_count as usize {
            return Err(SlotError::InvalidPayline {
                index: self.index as usize,
                reason: format!("{} rows for {} reels", self.rows.len(), reel_count),
            });
        }
        if let Some(&row) = self.rows.iter().find(|&&r| r >= visible_rows) {
            return Err(SlotError::InvalidPayline {
                index: self.index as usize,
                reason: format!("row {} outside {} visible rows", row, visible_rows),
            });
        }
        Ok(())
    }
}

/// The twelve lines of the classic 5×3 game
pub fn standard_12_paylines() -> Vec<Payline> {
    vec![
        // Top-anchored
        Payline::straight(0, 0, 5),
        Payline::new(1, &[0, 0, 1, 2, 2]),
        Payline::new(2, &[0, 1, 2, 1, 0]),
        Payline::new(3, &[0, 1, 0, 1, 0]),
        // Middle-anchored
        Payline::straight(4, 1, 5),
        Payline::new(5, &[1, 0, 0, 0, 1]),
        Payline::new(6, &[1, 2, 2, 2, 1]),
        Payline::new(7, &[1, 2, 1, 2, 1]),
        // Bottom-anchored
        Payline::straight(8, 2, 5),
        Payline::new(9, &[2, 2, 1, 0, 0]),
        Payline::new(10, &[2, 1, 0, 1, 2]),
        Payline::new(11, &[2, 1, 2, 1, 2]),
    ]
}

/// A paying result on a single payline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineWin {
    /// Payline index
    pub line_index: u8,
    /// Anchor symbol (reel 0)
    pub symbol_id: SymbolId,
    /// Consecutive matches after the anchor (0 = reel 1 already differs)
    pub match_count: u8,
    /// Paytable multiplier (pre-bet)
    pub payout: f64,
    /// Cells taking part in the win (reel, row)
    pub positions: Vec<(u8, u8)>,
}

/// Result of evaluating a settled grid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Lines with a positive payout
    pub line_wins: Vec<LineWin>,
    /// Sum over all paylines, pre-bet
    pub total_win: f64,
}

impl EvaluationResult {
    pub fn is_win(&self) -> bool {
        self.total_win > 0.0
    }

    pub fn win_count(&self) -> usize {
        self.line_wins.len()
    }
}

/// Payline set bound to a symbol catalog
#[derive(Debug, Clone)]
pub struct PayTable {
    pub catalog: SymbolCatalog,
    pub paylines: Vec<Payline>,
}

impl PayTable {
    pub fn new(catalog: SymbolCatalog, paylines: Vec<Payline>) -> Self {
        Self { catalog, paylines }
    }

    /// Evaluate every payline on a `reels × rows` grid
    pub fn evaluate(&self, grid: &[Vec<SymbolId>]) -> EvaluationResult {
        let mut line_wins = Vec::new();
        let mut total_win = 0.0;

        for payline in &self.paylines {
            let Some((symbol_id, match_count)) = line_matches(grid, payline) else {
                continue;
            };
            let payout = self.catalog.pay(symbol_id, match_count);
            total_win += payout;

            if payout > 0.0 {
                let positions = payline
                    .rows
                    .iter()
                    .take(match_count + 1)
                    .enumerate()
                    .map(|(reel, &row)| (reel as u8, row))
                    .collect();
                line_wins.push(LineWin {
                    line_index: payline.index,
                    symbol_id,
                    match_count: match_count as u8,
                    payout,
                    positions,
                });
            }
        }

        EvaluationResult {
            line_wins,
            total_win,
        }
    }
}

/// Total pre-bet win of `grid` over all `paylines`
pub fn evaluate(grid: &[Vec<SymbolId>], paylines: &[Payline], catalog: &SymbolCatalog) -> f64 {
    paylines
        .iter()
        .filter_map(|line| line_matches(grid, line))
        .map(|(symbol_id, count)| catalog.pay(symbol_id, count))
        .sum()
}

/// Anchor symbol and consecutive-match count for one line
fn line_matches(grid: &[Vec<SymbolId>], payline: &Payline) -> Option<(SymbolId, usize)> {
    let cell = |reel: usize| -> Option<SymbolId> {
        let row = *payline.rows.get(reel)? as usize;
        grid.get(reel)?.get(row).copied()
    };

    let anchor = cell(0)?;
    let match_count = (1..payline.rows.len())
        .take_while(|&reel| cell(reel) == Some(anchor))
        .count();

    Some((anchor, match_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_grid(symbol: SymbolId) -> Vec<Vec<SymbolId>> {
        vec![vec![symbol; 3]; 5]
    }

    #[test]
    fn test_standard_paylines_fit_5x3() {
        let lines = standard_12_paylines();
        assert_eq!(lines.len(), 12);
        for line in &lines {
            line.validate(5, 3).unwrap();
        }
    }

    #[test]
    fn test_payline_validate_rejects_bad_rows() {
        assert!(Payline::new(0, &[0, 1, 3, 1, 0]).validate(5, 3).is_err());
        assert!(Payline::new(0, &[0, 1, 2]).validate(5, 3).is_err());
    }

    #[test]
    fn test_full_line_pays_last_entry() {
        let catalog = SymbolCatalog::standard();
        let table = PayTable::new(catalog, vec![Payline::straight(0, 1, 5)]);
        let result = table.evaluate(&uniform_grid(0));
        assert_eq!(result.total_win, 50.0);
        assert_eq!(result.line_wins[0].match_count, 4);
        assert_eq!(result.line_wins[0].positions.len(), 5);
    }

    #[test]
    fn test_break_on_mismatch() {
        let catalog = SymbolCatalog::standard();
        let line = Payline::straight(0, 0, 5);
        // Reels 2..4 match the anchor but reel 1 breaks the run
        let grid = vec![vec![9; 3], vec![2; 3], vec![9; 3], vec![9; 3], vec![9; 3]];
        let table = PayTable::new(catalog.clone(), vec![line.clone()]);
        let result = table.evaluate(&grid);
        assert_eq!(result.total_win, catalog.pay(9, 0));
        assert!(result.line_wins.is_empty());
        assert_eq!(evaluate(&grid, &[line], &catalog), 0.0);
    }

    #[test]
    fn test_two_of_a_kind_pays_for_high_symbols() {
        let catalog = SymbolCatalog::standard();
        let grid = vec![vec![9; 3], vec![9; 3], vec![1; 3], vec![1; 3], vec![1; 3]];
        let line = Payline::straight(0, 2, 5);
        assert_eq!(evaluate(&grid, &[line], &catalog), 6.0);
    }

    #[test]
    fn test_all_lines_summed() {
        let catalog = SymbolCatalog::standard();
        let lines = standard_12_paylines();
        // Every line hits five of symbol 0
        let total = evaluate(&uniform_grid(0), &lines, &catalog);
        assert_eq!(total, 12.0 * 50.0);
    }
}
