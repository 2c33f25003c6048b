//! Error type for reading module documents.
//!
//! `ModuleLoadError` covers unreadable files, invalid JSON and documents that
//! reference unknown values or blocks. It implements `Sil2CastErrorExt` so the
//! CLI reports it like every other diagnostic.

use crate::error::{Level, Sil2CastErrorExt};
use crate::location::Location;

#[derive(Debug, Clone)]
pub struct ModuleLoadError {
    level: Level,
    message: String,
    issuer: String,
    location: Option<Location>,
}

impl ModuleLoadError {
    pub fn new(issuer: impl Into<String>, message: impl Into<String>) -> Self {
        ModuleLoadError {
            level: Level::Error,
            message: message.into(),
            issuer: issuer.into(),
            location: None,
        }
    }

    /// Attaches the offending input file.
    pub fn in_file(mut self, path: impl Into<String>) -> Self {
        self.location = Some(Location::new(path.into(), 0, 0));
        self
    }
}

impl std::fmt::Display for ModuleLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{} (in {})", self.message, loc.file),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ModuleLoadError {}

impl Sil2CastErrorExt for ModuleLoadError {
    fn level(&self) -> Level {
        self.level
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn issuer(&self) -> String {
        self.issuer.clone()
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}

impl From<ModuleLoadError> for Box<dyn Sil2CastErrorExt> {
    fn from(err: ModuleLoadError) -> Self {
        Box::new(err)
    }
}
