use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level_str = match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        };
        write!(f, "{}", level_str)
    }
}

/// Common surface of every error and diagnostic the crate reports.
pub trait Sil2CastErrorExt {
    fn level(&self) -> Level;
    fn message(&self) -> String;
    fn issuer(&self) -> String;
    fn location(&self) -> Option<crate::location::Location>;
}

/// Boxed error used at every public boundary of the lowering pipeline.
pub type LowerResult<T> = Result<T, Box<dyn Sil2CastErrorExt>>;

impl fmt::Debug for dyn Sil2CastErrorExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loc_str = match self.location() {
            Some(loc) => format!("{}:{}:{}", loc.file, loc.line, loc.column),
            None => "unknown".to_string(),
        };

        write!(
            f,
            "SIL2CAST | {} | {} | {} | {}",
            self.level(),
            loc_str,
            self.issuer(),
            self.message()
        )
    }
}

impl fmt::Display for dyn Sil2CastErrorExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
