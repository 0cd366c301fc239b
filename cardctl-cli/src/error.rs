use std::fmt;
use std::process::ExitCode;

use cardctl_store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The card does not exist, or holds too few copies
    Missing,
    /// The database could not be reached or rejected the operation
    Store,
    /// Bad arguments or configuration
    Input,
}

#[derive(Debug)]
pub struct AppError {
    pub(crate) kind: ErrorKind,
    pub(crate) source: anyhow::Error,
}

impl AppError {
    pub fn new(kind: ErrorKind, source: anyhow::Error) -> Self {
        Self { kind, source }
    }

    pub fn missing<E: Into<anyhow::Error>>(err: E) -> Self {
        Self::new(ErrorKind::Missing, err.into())
    }

    pub fn input<E: Into<anyhow::Error>>(err: E) -> Self {
        Self::new(ErrorKind::Input, err.into())
    }

    pub fn config(err: anyhow::Error) -> Self {
        Self::new(ErrorKind::Input, err.context("configuration error"))
    }

    pub fn exit_code(&self) -> ExitCode {
        match self.kind {
            ErrorKind::Missing => ExitCode::from(1),
            ErrorKind::Store => ExitCode::from(2),
            ErrorKind::Input => ExitCode::from(3),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let kind = match &err {
            StoreError::NotFound(_) | StoreError::InsufficientQuantity { .. } => ErrorKind::Missing,
            StoreError::Validation(_) => ErrorKind::Input,
            _ => ErrorKind::Store,
        };
        Self::new(kind, err.into())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.source)
    }
}
