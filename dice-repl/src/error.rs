use crate::command::CommandError;
use dice_solver::{
    config::ConfigError,
    database::{GenerateError, StoreError},
};

/// Utility enum to package errors that can occur while running a command.
#[derive(Debug)]
pub enum Error {
    /// An error pointing into the answer typed by the player.
    Answer(dice_error::Error, String),

    /// The command line could not be understood.
    Command(CommandError),

    /// The solution database could not be read or written.
    Store(StoreError),

    /// A generation run failed.
    Generate(GenerateError),

    /// The configuration could not be loaded.
    Config(ConfigError),
}

impl Error {
    /// Report this error to stderr.
    ///
    /// Errors that point into an answer are rendered as a report over the answer; the others are
    /// printed as a single line.
    pub fn report_to_stderr(&self) {
        let message = match self {
            Self::Answer(err, answer) => {
                if let Err(io_err) = err.report_to_stderr("answer", answer) {
                    eprintln!("error: {}", io_err);
                }
                return;
            },
            Self::Command(err) => err.to_string(),
            Self::Store(err) => err.to_string(),
            Self::Generate(err) => err.to_string(),
            Self::Config(err) => err.to_string(),
        };
        eprintln!("error: {}", message);
    }
}

impl From<CommandError> for Error {
    fn from(err: CommandError) -> Self {
        Self::Command(err)
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<GenerateError> for Error {
    fn from(err: GenerateError) -> Self {
        Self::Generate(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
