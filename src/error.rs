use std::fmt;

/// The error kinds surfaced to a command's submitter (spec §7).
///
/// Every user command either fully succeeds or fails with one of these,
/// leaving all state unchanged. Plain enum + hand-written `Display`,
/// matching the teacher's `format!("jsh: ...")` message style rather than
/// pulling in `thiserror`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpoolerError {
    WrongArgs,
    UnknownType(String),
    UnknownPrinter(String),
    UnknownJob(u64),
    DuplicateName(String),
    Full,
    UndeclaredFileType(String),
    NoConversionPath { from: String, to: String },
    PrinterNotIdle(String),
    NoCompatiblePrinter,
    EmptyPath,
    LaunchFailed(String),
    InvalidState(String),
}

impl fmt::Display for SpoolerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpoolerError::WrongArgs => write!(f, "wrong number of arguments"),
            SpoolerError::UnknownType(name) => write!(f, "unknown file type: {name}"),
            SpoolerError::UnknownPrinter(name) => write!(f, "unknown printer: {name}"),
            SpoolerError::UnknownJob(id) => write!(f, "unknown job: {id}"),
            SpoolerError::DuplicateName(name) => write!(f, "duplicate name: {name}"),
            SpoolerError::Full => write!(f, "capacity exhausted"),
            SpoolerError::UndeclaredFileType(path) => {
                write!(f, "cannot infer file type: {path}")
            }
            SpoolerError::NoConversionPath { from, to } => {
                write!(f, "no conversion path from {from} to {to}")
            }
            SpoolerError::PrinterNotIdle(name) => write!(f, "printer not idle: {name}"),
            SpoolerError::NoCompatiblePrinter => write!(f, "no compatible printer available"),
            SpoolerError::EmptyPath => write!(f, "empty input path"),
            SpoolerError::LaunchFailed(msg) => write!(f, "pipeline launch failed: {msg}"),
            SpoolerError::InvalidState(msg) => write!(f, "invalid state: {msg}"),
        }
    }
}

impl std::error::Error for SpoolerError {}

pub type Result<T> = std::result::Result<T, SpoolerError>;
