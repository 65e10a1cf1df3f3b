//! Symbol catalog and per-symbol paytables

use serde::{Deserialize, Serialize};

use rsp_core::SymbolId;

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDef {
    /// Catalog index
    pub id: SymbolId,
    /// Display name
    pub name: String,
    /// Renderable asset reference, opaque to the engine (e.g. an image path)
    pub asset: String,
    /// Payout multipliers indexed by consecutive-match count (length = reel count)
    pub paytable: Vec<f64>,
}

impl SymbolDef {
    pub fn new(id: SymbolId, name: impl Into<String>, asset: impl Into<String>, paytable: &[f64]) -> Self {
        Self {
            id,
            name: name.into(),
            asset: asset.into(),
            paytable: paytable.to_vec(),
        }
    }

    /// Pay value for a consecutive-match count (0 when out of range)
    pub fn pay(&self, match_count: usize) -> f64 {
        self.paytable.get(match_count).copied().unwrap_or(0.0)
    }
}

/// Fixed symbol catalog; ids are dense indices `0..len()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolCatalog {
    symbols: Vec<SymbolDef>,
}

impl SymbolCatalog {
    /// Build a catalog, renumbering ids to match their position
    pub fn new(symbols: Vec<SymbolDef>) -> Self {
        let symbols = symbols
            .into_iter()
            .enumerate()
            .map(|(i, mut s)| {
                s.id = i as SymbolId;
                s
            })
            .collect();
        Self { symbols }
    }

    /// The ten-symbol set of the classic 5-reel game
    pub fn standard() -> Self {
        let pays: [[f64; 5]; 10] = [
            [0.0, 0.0, 4.0, 15.0, 50.0],
            [0.0, 0.0, 5.0, 20.0, 60.0],
            [0.0, 0.0, 10.0, 30.0, 80.0],
            [0.0, 0.0, 15.0, 50.0, 100.0],
            [0.0, 0.0, 20.0, 75.0, 150.0],
            [0.0, 3.0, 25.0, 100.0, 200.0],
            [0.0, 3.0, 30.0, 150.0, 300.0],
            [0.0, 4.0, 40.0, 200.0, 400.0],
            [0.0, 5.0, 50.0, 250.0, 500.0],
            [0.0, 6.0, 60.0, 300.0, 600.0],
        ];

        let symbols = pays
            .iter()
            .enumerate()
            .map(|(i, pays)| {
                SymbolDef::new(
                    i as SymbolId,
                    format!("symbol{}", i + 1),
                    format!("assets/images/symbol{}.png", i + 1),
                    pays,
                )
            })
            .collect();

        Self { symbols }
    }

    /// Get symbol by id
    pub fn get(&self, id: SymbolId) -> Option<&SymbolDef> {
        self.symbols.get(id as usize)
    }

    /// Pay value for `id` at `match_count` (0 for unknown symbols)
    pub fn pay(&self, id: SymbolId, match_count: usize) -> f64 {
        self.get(id).map(|s| s.pay(match_count)).unwrap_or(0.0)
    }

    /// Asset reference for `id`
    pub fn asset(&self, id: SymbolId) -> Option<&str> {
        self.get(id).map(|s| s.asset.as_str())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolDef> {
        self.symbols.iter()
    }
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
