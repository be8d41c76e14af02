//! Destructible block layout for the current level

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Aabb;
use crate::tuning::{GridLayout, HealthCurve};

/// A destructible block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    /// Center position
    pub pos: Vec2,
    pub half: Vec2,
    pub health: i32,
    pub alive: bool,
    /// Cosmetic color index, opaque to the core
    pub tint: u8,
}

impl Block {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.half)
    }
}

/// Result of applying damage to a live block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    pub destroyed: bool,
    pub remaining_health: i32,
}

/// The block grid
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Grid {
    pub level: u32,
    pub blocks: Vec<Block>,
}

impl Grid {
    /// Lay out `columns x rows` blocks centered horizontally in `world_width`.
    ///
    /// Health comes from `curve` for `level`; `tint(row, col)` picks the
    /// cosmetic tag for each cell.
    pub fn build(
        level: u32,
        layout: &GridLayout,
        world_width: f32,
        curve: HealthCurve,
        mut tint: impl FnMut(u32, u32) -> u8,
    ) -> Self {
        let cols = layout.columns;
        let total_width = cols as f32 * layout.cell_width
            + cols.saturating_sub(1) as f32 * layout.padding;
        let start_x = (world_width - total_width) / 2.0 + layout.cell_width / 2.0;
        let half = Vec2::new(layout.cell_width / 2.0, layout.cell_height / 2.0);
        let health = curve.health_for_level(level);

        let mut blocks = Vec::with_capacity((cols * layout.rows) as usize);
        for row in 0..layout.rows {
            for col in 0..cols {
                let pos = Vec2::new(
                    start_x + col as f32 * (layout.cell_width + layout.padding),
                    layout.top + row as f32 * (layout.cell_height + layout.padding),
                );
                blocks.push(Block {
                    id: blocks.len() as u32 + 1,
                    pos,
                    half,
                    health,
                    alive: true,
                    tint: tint(row, col),
                });
            }
        }

        log::info!(
            "Level {}: {}x{} grid, health {}, start_x={}",
            level,
            cols,
            layout.rows,
            health,
            start_x
        );

        Self { level, blocks }
    }

    /// Decrement a live block's health. Returns `None` for unknown or
    /// already destroyed blocks, so destruction is reported exactly once.
    pub fn apply_damage(&mut self, block_id: u32, amount: i32) -> Option<DamageOutcome> {
        let block = self
            .blocks
            .iter_mut()
            .find(|b| b.id == block_id && b.alive)?;
        block.health -= amount.max(0);
        if block.health <= 0 {
            block.alive = false;
        }
        Some(DamageOutcome {
            destroyed: !block.alive,
            remaining_health: block.health,
        })
    }

    /// True when no block is alive
    pub fn is_cleared(&self) -> bool {
        !self.blocks.iter().any(|b| b.alive)
    }

    pub fn live_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.alive)
    }

    pub fn live_count(&self) -> usize {
        self.live_blocks().count()
    }

    pub fn get(&self, block_id: u32) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == block_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn layout() -> GridLayout {
        GridLayout {
            columns: 10,
            rows: 5,
            cell_width: 80.0,
            cell_height: 40.0,
            padding: 20.0,
            top: 350.0,
        }
    }

    #[test]
    fn test_build_is_centered() {
        let grid = Grid::build(1, &layout(), 1080.0, HealthCurve::Flat, |_, _| 0);
        assert_eq!(grid.blocks.len(), 50);

        // 10 * 80 + 9 * 20 = 980 wide, so the first center is at 50 + 40
        let first = &grid.blocks[0];
        assert!((first.pos.x - 90.0).abs() < 0.001);
        assert!((first.pos.y - 350.0).abs() < 0.001);
        let last_in_row = &grid.blocks[9];
        assert!((last_in_row.pos.x - 990.0).abs() < 0.001);
        // Symmetric about the world center
        assert!(((first.pos.x + last_in_row.pos.x) / 2.0 - 540.0).abs() < 0.001);
    }

    #[test]
    fn test_build_health_scales_with_level() {
        let curve = HealthCurve::Stepped(2);
        let easy = Grid::build(1, &layout(), 1080.0, curve, |_, _| 0);
        let hard = Grid::build(6, &layout(), 1080.0, curve, |_, _| 0);
        assert!(easy.blocks.iter().all(|b| b.health == 1));
        assert!(hard.blocks.iter().all(|b| b.health == 4));
    }

    #[test]
    fn test_tint_callback_sees_row_and_column() {
        let grid = Grid::build(1, &layout(), 1080.0, HealthCurve::Flat, |row, _| row as u8);
        assert_eq!(grid.blocks[0].tint, 0);
        assert_eq!(grid.blocks[49].tint, 4);
    }

    #[test]
    fn test_damage_destroys_once() {
        let mut grid = Grid::build(4, &layout(), 1080.0, HealthCurve::Stepped(2), |_, _| 0);
        let id = grid.blocks[3].id;

        let first = grid.apply_damage(id, 2).unwrap();
        assert_eq!(first, DamageOutcome { destroyed: false, remaining_health: 1 });

        let second = grid.apply_damage(id, 2).unwrap();
        assert!(second.destroyed);
        assert_eq!(second.remaining_health, -1);

        assert!(grid.apply_damage(id, 2).is_none());
        assert_eq!(grid.live_count(), 49);
    }

    #[test]
    fn test_is_cleared() {
        let mut grid = Grid::build(1, &layout(), 1080.0, HealthCurve::Flat, |_, _| 0);
        assert!(!grid.is_cleared());
        let ids: Vec<u32> = grid.blocks.iter().map(|b| b.id).collect();
        for id in ids {
            grid.apply_damage(id, 1);
        }
        assert!(grid.is_cleared());
        assert!(Grid::default().is_cleared());
    }

    proptest! {
        #[test]
        fn prop_health_after_n_hits(initial_level in 0u32..12, hits in 0usize..8, amount in 1i32..4) {
            let mut grid = Grid::build(
                initial_level,
                &layout(),
                1080.0,
                HealthCurve::Stepped(2),
                |_, _| 0,
            );
            let initial = grid.blocks[0].health;
            let mut destroyed_count = 0;
            let mut last_health = initial;

            for _ in 0..hits {
                if let Some(outcome) = grid.apply_damage(1, amount) {
                    prop_assert!(outcome.remaining_health <= last_health);
                    last_health = outcome.remaining_health;
                    if outcome.destroyed {
                        destroyed_count += 1;
                    }
                }
            }

            let landed = (hits as i32).min((initial + amount - 1) / amount);
            prop_assert_eq!(grid.blocks[0].health, initial - landed * amount);
            prop_assert!(destroyed_count <= 1);
            prop_assert_eq!(destroyed_count == 1, grid.blocks[0].health <= 0);
        }
    }
}
