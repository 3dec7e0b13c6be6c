#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("unknown command {0:?}; try one of: {1}")]
    UnknownCommand(String, String),

    #[error("an empty line isn't a command")]
    Empty,
}
