//! Conway's Game of Life screensaver.
//!
//! The board wraps at the edges. A run ends when the population dies out,
//! the board stops changing, or the generation limit is reached; `reset`
//! reseeds from a small xorshift generator.

use oledui_common::capabilities::Grid;
use oledui_common::Animation;

/// Generations before a run is cut short.
const MAX_GENERATIONS: u32 = 600;

/// Percentage of live cells in a fresh seed.
const SEED_DENSITY: u32 = 30;

pub struct Life {
    grid: Grid,
    scratch: Grid,
    generation: u32,
    rng: u32,
    done: bool,
}

impl Life {
    pub fn new(
        width: usize,
        height: usize,
        seed: u32,
    ) -> Self {
        let mut life = Self {
            grid: Grid::new(width, height),
            scratch: Grid::new(width, height),
            generation: 0,
            rng: seed.max(1),
            done: false,
        };
        life.seed();
        life
    }

    fn next_random(&mut self) -> u32 {
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        x
    }

    fn seed(&mut self) {
        for y in 0..self.grid.height() {
            for x in 0..self.grid.width() {
                let alive = self.next_random() % 100 < SEED_DENSITY;
                self.grid.set(x, y, alive);
            }
        }
        self.generation = 0;
        self.done = false;
    }

    fn neighbours(
        &self,
        x: usize,
        y: usize,
    ) -> u8 {
        let (w, h) = (self.grid.width(), self.grid.height());
        let mut n = 0;
        for dy in [h - 1, 0, 1] {
            for dx in [w - 1, 0, 1] {
                if (dx, dy) == (0, 0) {
                    continue;
                }
                if self.grid.get((x + dx) % w, (y + dy) % h) {
                    n += 1;
                }
            }
        }
        n
    }

    /// Advance one generation. Returns whether any cell changed.
    fn step(&mut self) -> bool {
        let mut changed = false;
        for y in 0..self.grid.height() {
            for x in 0..self.grid.width() {
                let alive = self.grid.get(x, y);
                let next = matches!((alive, self.neighbours(x, y)), (true, 2 | 3) | (false, 3));
                changed |= next != alive;
                self.scratch.set(x, y, next);
            }
        }
        core::mem::swap(&mut self.grid, &mut self.scratch);
        self.generation += 1;
        changed
    }
}

impl Animation for Life {
    fn next_frame(&mut self) -> Option<&Grid> {
        if self.done || self.grid.width() == 0 || self.grid.height() == 0 {
            return None;
        }
        if self.generation > 0 {
            let changed = self.step();
            if !changed || self.grid.population() == 0 || self.generation >= MAX_GENERATIONS {
                self.done = true;
                return None;
            }
        } else {
            self.generation = 1;
        }
        Some(&self.grid)
    }

    fn reset(&mut self) { self.seed(); }

    fn generation(&self) -> u32 { self.generation }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(
        w: usize,
        h: usize,
    ) -> Life {
        let mut life = Life::new(w, h, 1);
        for y in 0..h {
            for x in 0..w {
                life.grid.set(x, y, false);
            }
        }
        life
    }

    #[test]
    fn test_blinker_oscillates() {
        let mut life = blank(5, 5);
        for x in 1..4 {
            life.grid.set(x, 2, true);
        }
        assert!(life.step());
        assert!(life.grid.get(2, 1) && life.grid.get(2, 2) && life.grid.get(2, 3));
        assert!(!life.grid.get(1, 2));
        assert_eq!(life.grid.population(), 3);
    }

    #[test]
    fn test_still_life_ends_run() {
        let mut life = blank(6, 6);
        for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
            life.grid.set(x, y, true);
        }
        assert!(life.next_frame().is_some());
        assert!(life.next_frame().is_none());
        assert!(life.next_frame().is_none());
    }

    #[test]
    fn test_reset_restarts() {
        let mut life = blank(4, 4);
        assert!(life.next_frame().is_some());
        assert!(life.next_frame().is_none());
        life.reset();
        assert_eq!(life.generation(), 0);
        assert!(life.next_frame().is_some());
    }

    #[test]
    fn test_edges_wrap() {
        let mut life = blank(5, 5);
        life.grid.set(0, 0, true);
        life.grid.set(4, 4, true);
        life.grid.set(4, 0, true);
        assert_eq!(life.neighbours(0, 4), 3);
    }
}
