use std::fmt;

use serde::{Deserialize, Serialize};

/// Source position attached to a statement by the debug metadata.
///
/// `file` is `None` when the host could not attribute the statement to a
/// source file; such statements are never recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    #[serde(default)]
    pub file: Option<String>,
    /// 1-based line number (`0` when unknown).
    #[serde(default)]
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self { file: Some(file.into()), line }
    }

    /// A location with no source file attached.
    pub fn unknown(line: u32) -> Self {
        Self { file: None, line }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}", file, self.line),
            None => write!(f, "<unknown>:{}", self.line),
        }
    }
}

/// Kind of memory access reported for a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Read,
    Write,
    /// Combined or indeterminate access (calls to known primitives).
    Both,
}

impl AccessKind {
    /// Suffix appended after `file:line` in the output list.
    pub fn suffix(self) -> &'static str {
        match self {
            AccessKind::Read => ":read",
            AccessKind::Write => ":write",
            AccessKind::Both => "",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccessKind::Read => "read",
            AccessKind::Write => "write",
            AccessKind::Both => "both",
        }
    }
}

/// One line of the output list: `<file>:<line>[:read|:write]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessRecord {
    pub file: String,
    pub line: u32,
    pub kind: AccessKind,
}

impl AccessRecord {
    pub fn new(file: impl Into<String>, line: u32, kind: AccessKind) -> Self {
        Self { file: file.into(), line, kind }
    }

    /// Build a record for `location`, or `None` if it has no source file.
    pub fn from_location(location: &SourceLocation, kind: AccessKind) -> Option<Self> {
        location.file.as_ref().map(|file| Self::new(file.clone(), location.line, kind))
    }

    /// The record as written to the output file, newline included.
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }

    /// Parse a line of the output list back into a record.
    ///
    /// The file part may itself contain `:` (e.g. Windows drive letters), so
    /// the line is split from the right.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let (rest, kind) = if let Some(rest) = line.strip_suffix(":read") {
            (rest, AccessKind::Read)
        } else if let Some(rest) = line.strip_suffix(":write") {
            (rest, AccessKind::Write)
        } else {
            (line, AccessKind::Both)
        };
        let (file, line_no) = rest.rsplit_once(':')?;
        if file.is_empty() {
            return None;
        }
        let line_no = line_no.parse().ok()?;
        Some(Self::new(file, line_no, kind))
    }
}

impl fmt::Display for AccessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}{}", self.file, self.line, self.kind.suffix())
    }
}
