use std::io;
use std::path::PathBuf;

use porta_pp::{EvalError, LoadError};

/// A porting job could not be set up.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{}: cannot read config: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("{}: invalid config: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid macro definition `{head}`")]
    InvalidDefine { head: String },
}

/// A single file could not be ported.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("{}: cannot write output: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}
