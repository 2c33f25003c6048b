use crate::error::{Level, Sil2CastErrorExt};
use crate::location::Location;

/// A failure reported across the engine boundary: a rejected node, an engine
/// that could not be started or loaded, or an engine-reported error.
#[derive(Debug, Clone)]
pub struct BridgeError {
    level: Level,
    message: String,
    issuer: String,
    location: Option<Location>,
}

impl BridgeError {
    pub fn new(issuer: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError {
            level: Level::Error,
            message: message.into(),
            issuer: issuer.into(),
            location: None,
        }
    }

    pub fn with(level: Level, message: String, issuer: String, location: Option<Location>) -> Self {
        BridgeError { level, message, issuer, location }
    }

    /// Prefixes the message with the module being handed over.
    pub fn for_module(mut self, module: &str) -> Self {
        self.message = format!("module '{}': {}", module, self.message);
        self
    }

    pub fn at(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.issuer, self.message)
    }
}

impl std::error::Error for BridgeError {}

impl Sil2CastErrorExt for BridgeError {
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

impl From<BridgeError> for Box<dyn Sil2CastErrorExt> {
    fn from(err: BridgeError) -> Self {
        Box::new(err)
    }
}
