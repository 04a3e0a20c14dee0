//! Run errors and their exit codes

use recycler_config::ConfigError;
use recycler_host_api::HostError;
use recycler_util::ExitClass;
use thiserror::Error;

use crate::input::InputError;

/// Any failure that ends a run before the wrapped command decides the exit code
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("write {stream}: {source}")]
    Output {
        stream: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl RunError {
    pub fn exit_class(&self) -> ExitClass {
        match self {
            RunError::Config(e) => e.exit_class(),
            RunError::Input(_) => ExitClass::Usage,
            RunError::Host(e) => e.exit_class(),
            RunError::Encode(_) | RunError::Output { .. } => ExitClass::Runtime,
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_class().code()
    }
}

pub type RunResult<T> = Result<T, RunError>;
