use gridline_lib::error::ConfigError;
use gridline_lib::error::ExportError;
use gridline_lib::error::FetchError;

/// Everything that can stop a run.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Lib(#[from] gridline_lib::error::Error),

    #[error("failed to read rows: {0}")]
    Rows(String),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to set up logging: {0}")]
    Logger(#[from] log::SetLoggerError),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Lib(e.into())
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Lib(e.into())
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        CliError::Lib(e.into())
    }
}
