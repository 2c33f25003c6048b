//! Error and diagnostic types of the lowering pass.
//!
//! `MalformedIrError` is fatal for the module being lowered; its message names
//! the module and, when known, the function. `UnsupportedInstruction` is a
//! warning collected in the lowering diagnostics while lowering continues.

use crate::error::{Level, Sil2CastErrorExt};
use crate::location::Location;

#[derive(Debug, Clone)]
pub struct MalformedIrError {
    level: Level,
    message: String,
    issuer: String,
    location: Option<Location>,
}

impl MalformedIrError {
    pub fn new(module: &str, function: Option<&str>, message: impl Into<String>) -> Self {
        let message = match function {
            Some(func) => format!("malformed IR in module '{}', function '{}': {}", module, func, message.into()),
            None => format!("malformed IR in module '{}': {}", module, message.into()),
        };
        MalformedIrError {
            level: Level::Error,
            message,
            issuer: "sil2cast.lower".to_string(),
            location: None,
        }
    }

    pub fn at(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }
}

impl std::fmt::Display for MalformedIrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(loc) = &self.location {
            write!(f, "{} (at {}:{}:{})", self.message, loc.file, loc.line, loc.column)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for MalformedIrError {}

impl Sil2CastErrorExt for MalformedIrError {
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

impl From<MalformedIrError> for Box<dyn Sil2CastErrorExt> {
    fn from(err: MalformedIrError) -> Self {
        Box::new(err)
    }
}

/// Warning recorded when an instruction kind has no translation.
#[derive(Debug, Clone)]
pub struct UnsupportedInstruction {
    pub name: String,
    pub function: String,
    location: Option<Location>,
}

impl UnsupportedInstruction {
    pub fn new(name: &str, function: &str, location: Option<Location>) -> Self {
        UnsupportedInstruction {
            name: name.to_string(),
            function: function.to_string(),
            location,
        }
    }
}

impl std::fmt::Display for UnsupportedInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl Sil2CastErrorExt for UnsupportedInstruction {
    fn level(&self) -> Level {
        Level::Warning
    }

    fn message(&self) -> String {
        format!("unsupported instruction '{}' in function '{}'", self.name, self.function)
    }

    fn issuer(&self) -> String {
        "sil2cast.lower.translate".to_string()
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}

impl From<UnsupportedInstruction> for Box<dyn Sil2CastErrorExt> {
    fn from(err: UnsupportedInstruction) -> Self {
        Box::new(err)
    }
}
