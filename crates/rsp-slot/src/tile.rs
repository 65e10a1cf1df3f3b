//! A single symbol slot on a reel strip

use rand::Rng;
use serde::{Deserialize, Serialize};

use rsp_core::SymbolId;

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    symbol: SymbolId,
    /// Top edge within the reel's scroll space
    pub(crate) y: f64,
    width: f64,
    height: f64,
}

impl Tile {
    /// Create a tile with a random symbol
    pub fn new<R: Rng + ?Sized>(width: f64, height: f64, rng: &mut R, catalog_size: u32) -> Self {
        let mut tile = Self {
            symbol: 0,
            y: 0.0,
            width,
            height,
        };
        tile.randomize(rng, catalog_size);
        tile
    }

    /// Pick a new symbol uniformly from `0..catalog_size`; position is untouched
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R, catalog_size: u32) {
        debug_assert!(catalog_size > 0);
        self.symbol = rng.random_range(0..catalog_size.max(1));
    }

    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn snapshot(&self) -> TileSnapshot {
        TileSnapshot {
            symbol: self.symbol,
            y: self.y,
        }
    }
}

/// Render-facing view of a tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub symbol: SymbolId,
    pub y: f64,
}
