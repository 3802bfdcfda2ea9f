use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use crate::*;

/// Overall game outcome. Won and Lost are terminal: once reached, player
/// actions no longer mutate the board.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameStatus {
    Ongoing,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::Ongoing
    }
}

/// Single-game state machine: owns the minefield, the player-visible board,
/// and the counters that drive win/loss detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEngine {
    minefield: Minefield,
    board: Array2<CellState>,
    remaining_flags: CellCount,
    unresolved_cells: CellCount,
    status: GameStatus,
    detonated: Option<Pos>,
}

impl GameEngine {
    /// Starts a game on a freshly generated minefield, seeded from OS entropy.
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::from_seed(config, rand::random())
    }

    /// Starts a game on a reproducible minefield derived from `seed`.
    pub fn from_seed(config: GameConfig, seed: u64) -> Result<Self> {
        if config.mines > config.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(Self::with_minefield(
            RandomMinefieldGenerator::new(seed).generate(config),
        ))
    }

    /// Starts a game on an already-built minefield.
    pub fn with_minefield(minefield: Minefield) -> Self {
        let size = minefield.size();
        let remaining_flags = minefield.mine_count();
        let unresolved_cells = minefield.total_cells();
        Self {
            minefield,
            board: Array2::default(size.nd_index()),
            remaining_flags,
            unresolved_cells,
            status: Default::default(),
            detonated: None,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn size(&self) -> Pos {
        self.minefield.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.minefield.mine_count()
    }

    /// How many flags the player may still place.
    pub fn remaining_flags(&self) -> CellCount {
        self.remaining_flags
    }

    pub fn cell_at(&self, pos: Pos) -> CellState {
        self.board[pos.nd_index()]
    }

    pub fn board(&self) -> &Array2<CellState> {
        &self.board
    }

    /// The mine whose marking ended the game, if it was lost.
    pub fn detonated_mine(&self) -> Option<Pos> {
        self.detonated
    }

    /// Reveals a hidden cell, cascading through zero-adjacency regions.
    /// Flagged and already-revealed cells are left untouched.
    pub fn reveal(&mut self, pos: Pos) -> Result<RevealOutcome> {
        let pos = self.minefield.validate(pos)?;

        if self.status.is_finished() || self.board[pos.nd_index()].is_resolved() {
            return Ok(RevealOutcome::NoChange);
        }

        Ok(self.reveal_hidden(pos))
    }

    /// Places or removes a flag. Placing requires a flag left in the budget.
    pub fn toggle_flag(&mut self, pos: Pos) -> Result<FlagOutcome> {
        use CellState::*;
        use FlagOutcome::*;

        let pos = self.minefield.validate(pos)?;

        if self.status.is_finished() {
            return Ok(NoChange);
        }

        Ok(match self.board[pos.nd_index()] {
            Hidden => {
                if self.remaining_flags == 0 {
                    return Err(GameError::NoFlagsRemaining);
                }
                self.board[pos.nd_index()] = Flagged;
                self.remaining_flags -= 1;
                self.unresolved_cells -= 1;
                if self.unresolved_cells == 0 {
                    self.settle();
                }
                Changed
            }
            Flagged => {
                self.board[pos.nd_index()] = Hidden;
                self.remaining_flags += 1;
                self.unresolved_cells += 1;
                Changed
            }
            Revealed(_) | Exploded => NoChange,
        })
    }

    fn reveal_hidden(&mut self, pos: Pos) -> RevealOutcome {
        if self.minefield[pos] {
            self.board[pos.nd_index()] = CellState::Exploded;
            self.detonated = Some(pos);
            self.status = GameStatus::Lost;
            log::debug!("mine detonated at {:?}", pos);
            return RevealOutcome::Exploded;
        }

        let adjacent = self.minefield.adjacent_mines(pos);
        self.board[pos.nd_index()] = CellState::Revealed(adjacent);
        self.unresolved_cells -= 1;
        log::debug!("revealed {:?}, adjacent mines: {}", pos, adjacent);

        if adjacent == 0 {
            self.flood_reveal(pos);
        }

        if self.unresolved_cells == 0 {
            self.settle();
        }

        match self.status {
            GameStatus::Ongoing => RevealOutcome::Revealed,
            GameStatus::Won => RevealOutcome::Won,
            GameStatus::Lost => RevealOutcome::Exploded,
        }
    }

    /// Work-list traversal of the zero-adjacency region around `start`.
    /// Cells with adjacent mines are revealed but not expanded further.
    fn flood_reveal(&mut self, start: Pos) {
        let mut visited = HashSet::from([start]);
        let mut to_visit: VecDeque<_> = self
            .minefield
            .iter_adjacent(start)
            .filter(|&pos| matches!(self.board[pos.nd_index()], CellState::Hidden))
            .collect();
        log::trace!(
            "flood fill from {:?}, initial neighbors: {:?}",
            start,
            to_visit
        );

        while let Some(visit) = to_visit.pop_front() {
            if !visited.insert(visit) {
                continue;
            }

            // flags stop the cascade, and it never re-enters revealed cells
            if self.board[visit.nd_index()].is_resolved() {
                continue;
            }

            let adjacent = self.minefield.adjacent_mines(visit);
            self.board[visit.nd_index()] = CellState::Revealed(adjacent);
            self.unresolved_cells -= 1;
            log::trace!("flood revealed {:?}, adjacent mines: {}", visit, adjacent);

            if adjacent == 0 {
                to_visit.extend(
                    self.minefield
                        .iter_adjacent(visit)
                        .filter(|&pos| matches!(self.board[pos.nd_index()], CellState::Hidden))
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    /// Every cell is resolved: the game is won exactly when each mine
    /// carries a flag, otherwise the first unflagged mine goes off.
    fn settle(&mut self) {
        for pos in self.minefield.iter_mines() {
            if self.board[pos.nd_index()] != CellState::Flagged {
                self.board[pos.nd_index()] = CellState::Exploded;
                self.detonated = Some(pos);
                self.status = GameStatus::Lost;
                log::debug!("unflagged mine at {:?} on a fully resolved board", pos);
                return;
            }
        }

        self.status = GameStatus::Won;
        log::debug!("all mines flagged and all safe cells revealed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(size: Pos, mines: &[Pos]) -> Minefield {
        Minefield::from_mine_positions(size, mines).unwrap()
    }

    #[test]
    fn reveal_mine_loses_and_marks_explosion() {
        let mut engine = GameEngine::with_minefield(field((2, 2), &[(0, 0)]));

        let outcome = engine.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Exploded);
        assert_eq!(engine.status(), GameStatus::Lost);
        assert_eq!(engine.cell_at((0, 0)), CellState::Exploded);
        assert_eq!(engine.detonated_mine(), Some((0, 0)));
    }

    #[test]
    fn reveal_safe_cell_shows_adjacency() {
        let mut engine = GameEngine::with_minefield(field((2, 2), &[(0, 0)]));

        assert_eq!(engine.reveal((1, 1)).unwrap(), RevealOutcome::Revealed);

        assert_eq!(engine.cell_at((1, 1)), CellState::Revealed(1));
        assert_eq!(engine.status(), GameStatus::Ongoing);
        assert_eq!(engine.unresolved_cells, 3);
    }

    #[test]
    fn flood_fill_opens_zero_region_and_stops_at_numbers() {
        let mut engine = GameEngine::with_minefield(field((3, 3), &[(2, 2)]));

        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::Revealed);

        assert_eq!(engine.cell_at((0, 0)), CellState::Revealed(0));
        assert_eq!(engine.cell_at((0, 2)), CellState::Revealed(0));
        assert_eq!(engine.cell_at((1, 1)), CellState::Revealed(1));
        assert_eq!(engine.cell_at((2, 1)), CellState::Revealed(1));
        assert_eq!(engine.cell_at((2, 2)), CellState::Hidden);
        assert_eq!(engine.status(), GameStatus::Ongoing);
        assert_eq!(engine.unresolved_cells, 1);
    }

    #[test]
    fn flood_fill_does_not_cross_flags() {
        let mut engine = GameEngine::with_minefield(field((1, 6), &[(0, 5)]));

        engine.toggle_flag((0, 2)).unwrap();
        engine.reveal((0, 0)).unwrap();

        assert_eq!(engine.cell_at((0, 1)), CellState::Revealed(0));
        assert_eq!(engine.cell_at((0, 2)), CellState::Flagged);
        assert_eq!(engine.cell_at((0, 3)), CellState::Hidden);
        assert_eq!(engine.cell_at((0, 4)), CellState::Hidden);
    }

    #[test]
    fn flagging_all_mines_and_revealing_rest_wins() {
        let mut engine = GameEngine::with_minefield(field((2, 2), &[(0, 0)]));

        assert_eq!(engine.toggle_flag((0, 0)).unwrap(), FlagOutcome::Changed);
        assert_eq!(engine.reveal((0, 1)).unwrap(), RevealOutcome::Revealed);
        assert_eq!(engine.reveal((1, 0)).unwrap(), RevealOutcome::Revealed);
        assert_eq!(engine.reveal((1, 1)).unwrap(), RevealOutcome::Won);

        assert_eq!(engine.status(), GameStatus::Won);
    }

    #[test]
    fn last_flag_on_the_mine_wins() {
        let mut engine = GameEngine::with_minefield(field((2, 2), &[(0, 0)]));

        engine.reveal((0, 1)).unwrap();
        engine.reveal((1, 0)).unwrap();
        engine.reveal((1, 1)).unwrap();
        assert_eq!(engine.status(), GameStatus::Ongoing);

        assert_eq!(engine.toggle_flag((0, 0)).unwrap(), FlagOutcome::Changed);
        assert_eq!(engine.status(), GameStatus::Won);
    }

    #[test]
    fn flag_budget_is_the_mine_count() {
        let mut engine = GameEngine::with_minefield(field((3, 3), &[(2, 2)]));

        assert_eq!(engine.remaining_flags(), 1);
        engine.toggle_flag((0, 0)).unwrap();
        assert_eq!(engine.remaining_flags(), 0);

        assert_eq!(engine.toggle_flag((0, 1)), Err(GameError::NoFlagsRemaining));
        assert_eq!(engine.cell_at((0, 1)), CellState::Hidden);
        assert_eq!(engine.status(), GameStatus::Ongoing);
    }

    #[test]
    fn unflagging_returns_the_flag_and_the_cell() {
        let mut engine = GameEngine::with_minefield(field((3, 3), &[(2, 2)]));

        engine.toggle_flag((0, 0)).unwrap();
        assert_eq!(engine.unresolved_cells, 8);

        assert_eq!(engine.toggle_flag((0, 0)).unwrap(), FlagOutcome::Changed);
        assert_eq!(engine.cell_at((0, 0)), CellState::Hidden);
        assert_eq!(engine.remaining_flags(), 1);
        assert_eq!(engine.unresolved_cells, 9);
    }

    #[test]
    fn out_of_bounds_is_rejected_without_changes() {
        let mut engine = GameEngine::with_minefield(field((3, 3), &[(1, 1)]));

        assert_eq!(engine.reveal((5, 5)), Err(GameError::OutOfBounds));
        assert_eq!(engine.toggle_flag((0, 3)), Err(GameError::OutOfBounds));
        assert!(engine.board().iter().all(|&cell| cell == CellState::Hidden));
    }

    #[test]
    fn repeat_actions_are_no_ops() {
        let mut engine = GameEngine::with_minefield(field((2, 2), &[(0, 0)]));

        engine.reveal((1, 1)).unwrap();
        assert_eq!(engine.reveal((1, 1)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(engine.toggle_flag((1, 1)).unwrap(), FlagOutcome::NoChange);

        engine.toggle_flag((0, 1)).unwrap();
        assert_eq!(engine.reveal((0, 1)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(engine.cell_at((0, 1)), CellState::Flagged);
    }

    #[test]
    fn finished_game_ignores_further_actions() {
        let mut engine = GameEngine::with_minefield(field((2, 2), &[(0, 0)]));

        engine.reveal((0, 0)).unwrap();
        assert_eq!(engine.status(), GameStatus::Lost);

        assert_eq!(engine.reveal((1, 1)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(engine.toggle_flag((1, 1)).unwrap(), FlagOutcome::NoChange);
        assert_eq!(engine.cell_at((1, 1)), CellState::Hidden);
    }

    #[test]
    fn remaining_flags_tracks_flagged_cells() {
        let mut engine = GameEngine::with_minefield(field((3, 3), &[(0, 0), (2, 2)]));

        engine.toggle_flag((0, 1)).unwrap();
        engine.toggle_flag((1, 1)).unwrap();
        assert_eq!(engine.remaining_flags(), 0);

        engine.toggle_flag((0, 1)).unwrap();
        assert_eq!(engine.remaining_flags(), 1);
        assert_eq!(engine.total_mines(), 2);
    }

    #[test]
    fn mineless_board_wins_on_first_reveal() {
        let mut engine = GameEngine::with_minefield(field((3, 3), &[]));

        assert_eq!(engine.remaining_flags(), 0);
        assert_eq!(engine.reveal((1, 1)).unwrap(), RevealOutcome::Won);
        assert_eq!(engine.status(), GameStatus::Won);
    }

    #[test]
    fn construction_rejects_too_many_mines() {
        let config = GameConfig::new((2, 2), 5);

        assert_eq!(
            GameEngine::from_seed(config, 7).unwrap_err(),
            GameError::TooManyMines
        );
    }

    #[test]
    fn seeded_construction_is_reproducible() {
        let first = GameEngine::from_seed(GameConfig::default(), 42).unwrap();
        let second = GameEngine::from_seed(GameConfig::default(), 42).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.remaining_flags(), 10);
        assert_eq!(first.size(), (9, 9));
    }
}
