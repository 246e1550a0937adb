use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A tile was requested on a board with every cell taken.
    #[error("no empty cell left to spawn a tile into")]
    NoEmptyCell,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
