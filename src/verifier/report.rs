use std::fmt;

use crate::ast::Expr;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeclarationKind {
    Theorem,
    Definition,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    /// Every step was verified
    Proved,
    /// A `sorry` was accepted somewhere in the proof; `line` is the first one
    Admitted { line: usize },
}

/// The outcome of one verified declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub kind: DeclarationKind,
    pub name: String,
    pub line: usize,
    pub status: Status,
    /// What was known just before the declaration's scope was closed
    pub facts: Vec<Expr>,
}

/// The facts visible at a `check` step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckDump {
    pub line: usize,
    pub facts: Vec<Expr>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub entries: Vec<Entry>,
    pub checks: Vec<CheckDump>,
}

impl Report {
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
    /// True when no declaration relied on `sorry`
    pub fn is_fully_proved(&self) -> bool {
        self.entries.iter().all(|entry| entry.status == Status::Proved)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DeclarationKind::Theorem => "theorem",
            DeclarationKind::Definition => "definition",
        };
        write!(f, "{} `{}` (line {}): ", kind, self.name, self.line)?;
        match self.status {
            Status::Proved => write!(f, "proved"),
            Status::Admitted { line } => write!(f, "admitted (sorry in line {})", line),
        }
    }
}

impl fmt::Display for CheckDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "facts at line {}:", self.line)?;
        for fact in &self.facts {
            write!(f, "\n    {}", fact)?;
        }
        Ok(())
    }
}
