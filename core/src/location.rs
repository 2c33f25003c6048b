use serde::{Deserialize, Serialize};

/// A decoded source position attached to a lowered node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Location {
    /// The file in which the location is found.
    pub file: String,
    /// The line number of the location (1-based).
    pub line: usize,
    /// The column number of the location (1-based).
    pub column: usize,
}

impl Location {
    /// Creates a new `Location`.
    pub fn new(file: String, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }

    /// The file path trimmed to start at the `swift-source/` checkout root when
    /// the path contains one. Other paths are returned untouched.
    pub fn short_file(&self) -> &str {
        match self.file.find("swift-source/") {
            Some(idx) => &self.file[idx..],
            None => &self.file,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
