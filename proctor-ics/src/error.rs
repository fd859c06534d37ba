use std::io;

use proctor_schedule::ScheduleError;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("no schedule selected: {0}")]
    Prompt(String),

    #[error("failed to set up logging: {0}")]
    Logging(String),

    #[error("failed to write calendar: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error(transparent)]
    Io(#[from] io::Error),
}
