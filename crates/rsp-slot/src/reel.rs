//! Reel — a vertically scrolling strip of tiles
//!
//! ```text
//!   Idle ──spin()──> Spinning ──stop()──> Stopping ──(n ≤ 0)──> Idle
//! ```
//!
//! Scroll space: y grows downward, the visible window spans
//! `[0, visible_rows * tile_height)`. At rest the strip occupies slots
//! `-1..=visible_rows`: one buffer tile above the window, one below.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use rsp_core::{ReelId, SlotError, SlotResult, SymbolId, ease_in_back};

use crate::config::SlotConfig;
use crate::tile::{Tile, TileSnapshot};
use crate::timing::TimingConfig;

/// Reel phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReelState {
    Idle,
    Spinning,
    Stopping,
}

impl ReelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Spinning => "spinning",
            Self::Stopping => "stopping",
        }
    }
}

/// Completion notification, returned by `Reel::update` when the reel comes to rest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinComplete {
    pub reel: ReelId,
}

/// Deceleration bookkeeping captured at `stop()`
#[derive(Debug, Clone, Copy)]
struct StopPlan {
    elapsed_at_stop: f64,
    /// Scroll offset when `stop()` was called
    anchor: f64,
    /// Exact distance to the resting slot
    final_distance: f64,
    /// Eased progress reached on the previous frame (starts at 1)
    offset_acc: f64,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    Spinning,
    Stopping(StopPlan),
}

#[derive(Debug, Clone)]
pub struct Reel {
    id: ReelId,
    width: f64,
    tile_height: f64,
    visible_rows: usize,
    catalog_size: u32,
    timing: TimingConfig,
    /// Scroll order, front = topmost
    tiles: VecDeque<Tile>,
    phase: Phase,
    elapsed: f64,
    scroll_offset: f64,
    /// Speed applied on the last frame
    speed: f64,
}

impl Reel {
    pub fn new<R: Rng + ?Sized>(id: ReelId, config: &SlotConfig, rng: &mut R) -> Self {
        let width = config.reel_width();
        let tile_height = config.tile_height();
        let catalog_size = config.catalog.len() as u32;

        let tiles = (0..config.grid.tiles_per_reel())
            .map(|i| {
                let mut tile = Tile::new(width, tile_height, rng, catalog_size);
                tile.y = Self::slot_y(i as i64 - 1, tile_height);
                tile
            })
            .collect();

        Self {
            id,
            width,
            tile_height,
            visible_rows: config.grid.visible_rows as usize,
            catalog_size,
            timing: config.timing.clone(),
            tiles,
            phase: Phase::Idle,
            elapsed: 0.0,
            scroll_offset: 0.0,
            speed: 0.0,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STATE TRANSITIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Idle → Spinning
    pub fn spin(&mut self) -> SlotResult<()> {
        if !matches!(self.phase, Phase::Idle) {
            return Err(self.state_error(ReelState::Idle));
        }
        self.elapsed = 0.0;
        self.speed = 0.0;
        self.phase = Phase::Spinning;
        log::debug!("reel {} spinning", self.id);
        Ok(())
    }

    /// Spinning → Stopping
    ///
    /// The resting target is taken from the strip's own scroll offset: the
    /// distance to the next tile boundary plus `stop_run_tiles` whole tiles.
    pub fn stop(&mut self) -> SlotResult<()> {
        if !matches!(self.phase, Phase::Spinning) {
            return Err(self.state_error(ReelState::Spinning));
        }

        let h = self.tile_height;
        let into_tile = self.scroll_offset.rem_euclid(h);
        let to_boundary = if into_tile > 0.0 { h - into_tile } else { 0.0 };
        let final_distance = to_boundary + f64::from(self.timing.stop_run_tiles) * h;

        self.phase = Phase::Stopping(StopPlan {
            elapsed_at_stop: self.elapsed,
            anchor: self.scroll_offset,
            final_distance,
            offset_acc: 1.0,
        });
        log::debug!(
            "reel {} stopping at offset {:.2}, {:.2} to go",
            self.id,
            self.scroll_offset,
            final_distance
        );
        Ok(())
    }

    /// Advance one frame; returns the completion notification on the frame the reel comes to rest
    pub fn update<R: Rng + ?Sized>(&mut self, delta: f64, rng: &mut R) -> Option<SpinComplete> {
        if matches!(self.phase, Phase::Idle) {
            return None;
        }
        if !delta.is_finite() || delta < 0.0 {
            log::warn!("reel {} ignoring frame delta {}", self.id, delta);
            return None;
        }

        self.elapsed += delta;
        let timing = &self.timing;
        let mut finished = false;

        let speed = match &mut self.phase {
            Phase::Idle => 0.0,
            Phase::Spinning => {
                let base = delta * timing.max_speed;
                if self.elapsed < timing.in_time {
                    base * ease_in_back(self.elapsed / timing.in_time)
                } else {
                    base
                }
            }
            Phase::Stopping(plan) => {
                let n = 1.0 - (self.elapsed - plan.elapsed_at_stop) / timing.out_time;
                // Past the end of the curve the remaining distance is covered exactly
                let r = if n <= 0.0 {
                    finished = true;
                    0.0
                } else {
                    ease_in_back(n)
                };
                let speed = (plan.offset_acc - r) * plan.final_distance;
                plan.offset_acc = r;
                speed
            }
        };

        self.speed = speed;
        self.advance(speed, rng);

        if finished { Some(self.complete(rng)) } else { None }
    }

    /// Bring the reel to rest on the next tile boundary without an animation
    ///
    /// Used when a spin is abandoned; no completion notification is produced.
    pub fn halt<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.is_idle() {
            return;
        }
        let h = self.tile_height;
        let target = (self.scroll_offset / h).ceil() * h;
        self.settle(target, rng);
        self.phase = Phase::Idle;
        self.speed = 0.0;
        log::debug!("reel {} halted", self.id);
    }

    /// Swap timing constants; only allowed while idle
    pub fn set_timing(&mut self, timing: TimingConfig) -> SlotResult<()> {
        if !self.is_idle() {
            return Err(self.state_error(ReelState::Idle));
        }
        self.timing = timing;
        Ok(())
    }

    /// Stopping → Idle
    fn complete<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SpinComplete {
        if let Phase::Stopping(plan) = self.phase {
            self.settle(plan.anchor + plan.final_distance, rng);
        }
        self.phase = Phase::Idle;
        self.speed = 0.0;
        log::debug!("reel {} stopped: {:?}", self.id, self.visible_symbols());
        SpinComplete { reel: self.id }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STRIP MOTION
    // ═══════════════════════════════════════════════════════════════════════════

    fn advance<R: Rng + ?Sized>(&mut self, speed: f64, rng: &mut R) {
        self.scroll_offset += speed;
        for tile in &mut self.tiles {
            tile.y += speed;
        }
        self.recycle(rng);
    }

    /// Keep the strip over the window
    ///
    /// Tiles that leave through the bottom buffer slot wrap to the top. The
    /// backwards dip of the ease curve can lift the strip by more than a short
    /// tile, so tiles leaving through the top buffer slot wrap to the bottom.
    fn recycle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let h = self.tile_height;
        let below = Self::slot_y(self.visible_rows as i64 + 1, h);
        let above = Self::slot_y(-2, h);

        while self.tiles.back().is_some_and(|t| t.y >= below) {
            let front_y = self.tiles.front().map_or(0.0, |t| t.y);
            if let Some(mut tile) = self.tiles.pop_back() {
                tile.y = front_y - h;
                tile.randomize(rng, self.catalog_size);
                self.tiles.push_front(tile);
            }
        }
        while self.tiles.front().is_some_and(|t| t.y <= above) {
            let back_y = self.tiles.back().map_or(0.0, |t| t.y);
            if let Some(mut tile) = self.tiles.pop_front() {
                tile.y = back_y + h;
                tile.randomize(rng, self.catalog_size);
                self.tiles.push_back(tile);
            }
        }
    }

    /// Land the strip exactly on tile boundaries and restore canonical order
    ///
    /// Positions are converted to integer slots so the resting layout carries
    /// no accumulated floating-point drift.
    fn settle<R: Rng + ?Sized>(&mut self, target: f64, rng: &mut R) {
        let h = self.tile_height;
        let residual = target - self.scroll_offset;
        self.scroll_offset = (target / h).round() * h;

        let mut slotted: Vec<(i64, Tile)> = self
            .tiles
            .drain(..)
            .map(|t| (((t.y + residual) / h).round() as i64, t))
            .collect();
        slotted.sort_by_key(|(slot, _)| *slot);
        let mut strip: VecDeque<(i64, Tile)> = slotted.into();

        let bottom = self.visible_rows as i64;
        while strip.back().is_some_and(|(slot, _)| *slot > bottom) {
            let front = strip.front().map_or(-1, |(slot, _)| *slot);
            if let Some((_, mut tile)) = strip.pop_back() {
                tile.randomize(rng, self.catalog_size);
                strip.push_front((front - 1, tile));
            }
        }
        while strip.front().is_some_and(|(slot, _)| *slot < -1) {
            let back = strip.back().map_or(bottom, |(slot, _)| *slot);
            if let Some((_, mut tile)) = strip.pop_front() {
                tile.randomize(rng, self.catalog_size);
                strip.push_back((back + 1, tile));
            }
        }

        self.tiles = strip
            .into_iter()
            .map(|(slot, mut tile)| {
                tile.y = Self::slot_y(slot, h);
                tile
            })
            .collect();
    }

    #[inline]
    fn slot_y(slot: i64, tile_height: f64) -> f64 {
        slot as f64 * tile_height
    }

    fn state_error(&self, expected: ReelState) -> SlotError {
        SlotError::InvalidReelState {
            reel: self.id,
            expected: expected.as_str(),
            actual: self.state().as_str(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn id(&self) -> ReelId {
        self.id
    }

    pub fn state(&self) -> ReelState {
        match self.phase {
            Phase::Idle => ReelState::Idle,
            Phase::Spinning => ReelState::Spinning,
            Phase::Stopping(_) => ReelState::Stopping,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Tiles in top-to-bottom order
    pub fn tiles(&self) -> impl ExactSizeIterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile_height(&self) -> f64 {
        self.tile_height
    }

    pub fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    /// Symbol on visible row `row` (0 = top); exact once the reel is idle
    pub fn symbol_at(&self, row: usize) -> Option<SymbolId> {
        if row >= self.visible_rows {
            return None;
        }
        self.tiles.get(row + 1).map(Tile::symbol)
    }

    /// Visible symbols top to bottom
    pub fn visible_symbols(&self) -> Vec<SymbolId> {
        (0..self.visible_rows).filter_map(|row| self.symbol_at(row)).collect()
    }

    /// Total distance scrolled since construction
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Speed applied on the last frame (0 when idle)
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Vertical blur strength tracking speed
    pub fn blur_strength(&self) -> f64 {
        if self.is_idle() { 0.0 } else { self.speed * self.timing.blur_factor }
    }

    pub fn snapshot(&self) -> ReelSnapshot {
        ReelSnapshot {
            id: self.id,
            x: self.id as f64 * self.width,
            state: self.state(),
            blur: self.blur_strength(),
            tiles: self.tiles.iter().map(Tile::snapshot).collect(),
        }
    }
}

/// Render-facing view of a reel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelSnapshot {
    pub id: ReelId,
    pub x: f64,
    pub state: ReelState,
    pub blur: f64,
    pub tiles: Vec<TileSnapshot>,
}
