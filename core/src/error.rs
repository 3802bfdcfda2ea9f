use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Coordinates outside the board")]
    OutOfBounds,
    #[error("Too many mines for the board size")]
    TooManyMines,
    #[error("No flags remaining")]
    NoFlagsRemaining,
}

pub type Result<T> = core::result::Result<T, GameError>;
