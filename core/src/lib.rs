use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use types::*;

mod cell;
mod engine;
mod error;
mod generator;
mod types;

/// Board dimensions and mine count, as requested by the player.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Pos,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Pos, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Clamps both axes so the board always has at least one cell.
    pub fn new((rows, cols): Pos, mines: CellCount) -> Self {
        let rows = rows.clamp(1, Axis::MAX);
        let cols = cols.clamp(1, Axis::MAX);
        Self::new_unchecked((rows, cols), mines)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

impl Default for GameConfig {
    /// The conventional beginner board: 9x9 with 10 mines.
    fn default() -> Self {
        Self::new_unchecked((9, 9), 10)
    }
}

/// Fixed mine placement plus the per-cell adjacent-mine counts, both built
/// once and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Minefield {
    mines: Array2<bool>,
    adjacency: Array2<u8>,
    mine_count: CellCount,
}

impl Minefield {
    pub fn from_mask(mines: Array2<bool>) -> Self {
        let mine_count = mines
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .unwrap();

        let dim = mines.dim();
        let (rows, cols): Pos = (dim.0.try_into().unwrap(), dim.1.try_into().unwrap());
        let mut adjacency: Array2<u8> = Array2::default(mines.raw_dim());
        for row in 0..rows {
            for col in 0..cols {
                if mines[(row, col).nd_index()] {
                    for pos in mines.iter_adjacent((row, col)) {
                        adjacency[pos.nd_index()] += 1;
                    }
                }
            }
        }

        Self {
            mines,
            adjacency,
            mine_count,
        }
    }

    /// Builds a field with mines at exactly the given positions, which must
    /// all lie within `size`.
    pub fn from_mine_positions(size: Pos, mine_positions: &[Pos]) -> Result<Self> {
        let mut mask: Array2<bool> = Array2::default(size.nd_index());

        for &pos in mine_positions {
            if pos.0 >= size.0 || pos.1 >= size.1 {
                return Err(GameError::OutOfBounds);
            }
            mask[pos.nd_index()] = true;
        }

        Ok(Self::from_mask(mask))
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            size: self.size(),
            mines: self.mine_count,
        }
    }

    pub fn validate(&self, pos: Pos) -> Result<Pos> {
        let size = self.size();
        if pos.0 < size.0 && pos.1 < size.1 {
            Ok(pos)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn size(&self) -> Pos {
        let dim = self.mines.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn total_cells(&self) -> CellCount {
        self.mines.len().try_into().unwrap()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, pos: Pos) -> bool {
        self[pos]
    }

    pub fn adjacent_mines(&self, pos: Pos) -> u8 {
        self.adjacency[pos.nd_index()]
    }

    pub(crate) fn iter_adjacent(&self, pos: Pos) -> AdjacentIter {
        self.mines.iter_adjacent(pos)
    }

    pub(crate) fn iter_mines(&self) -> impl Iterator<Item = Pos> + '_ {
        self.mines
            .indexed_iter()
            .filter(|&(_, &is_mine)| is_mine)
            .map(|((row, col), _)| (row.try_into().unwrap(), col.try_into().unwrap()))
    }
}

impl Index<Pos> for Minefield {
    type Output = bool;

    fn index(&self, (row, col): Pos) -> &Self::Output {
        &self.mines[(row as usize, col as usize)]
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlagOutcome {
    NoChange,
    Changed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    Exploded,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}
