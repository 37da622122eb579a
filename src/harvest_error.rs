use std::error::Error;
use std::fmt::{Display, Formatter, Result};

#[macro_export]
macro_rules! create_harvest_error {
     ($kind: expr, $($arg:tt)*) => {
        $crate::harvest_error::HarvestError::new($kind, format!($($arg)*))
    }
}
pub use create_harvest_error;

#[macro_export]
macro_rules! create_harvest_error_result {
     ($kind: expr, $($arg:tt)*) => {
        Err($crate::harvest_error::HarvestError::new($kind, format!($($arg)*)))
    }
}
pub use create_harvest_error_result;

#[macro_export]
macro_rules! fetch_err {
    ($($arg:tt)*) => {
        $crate::harvest_error::HarvestError::new($crate::harvest_error::HarvestErrorKind::Fetch, format!($($arg)*))
    }
}
pub use fetch_err;

#[macro_export]
macro_rules! write_err {
    ($($arg:tt)*) => {
        $crate::harvest_error::HarvestError::new($crate::harvest_error::HarvestErrorKind::Write, format!($($arg)*))
    }
}
pub use write_err;

#[macro_export]
macro_rules! scan_err {
    ($($arg:tt)*) => {
        $crate::harvest_error::HarvestError::new($crate::harvest_error::HarvestErrorKind::Scan, format!($($arg)*))
    }
}
pub use scan_err;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HarvestErrorKind {
    /// network or http status failure for a single listing url
    Fetch,
    /// a link inside a listing page could not be resolved
    Parse,
    /// the playlist output could not be written
    Write,
    /// the playlist directory could not be read
    Scan,
    /// a requested path points outside the playlist directory
    PathSecurity,
    NotFound,
    Config,
}

#[derive(Debug)]
pub struct HarvestError {
    pub kind: HarvestErrorKind,
    pub message: String,
}

impl HarvestError {
    pub const fn new(kind: HarvestErrorKind, message: String) -> Self {
        Self {
            kind,
            message,
        }
    }
}

impl Display for HarvestError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "M3uHarvest error: {}", self.message)
    }
}

impl Error for HarvestError {}
