use serde::{Deserialize, Serialize};

/// Player-visible state of a single board cell.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Flagged,
    Revealed(u8),
    Exploded,
}

impl CellState {
    /// A resolved cell no longer counts towards finishing the game.
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}
