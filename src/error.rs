use std::fmt;
use crate::ast::Expr;

/// Produces `Err(InternalError)` (converted into the surrounding error type)
/// tagged with the file and line of the broken invariant
#[macro_export]
macro_rules! internal_error {
    ($($arg:tt)*) => {
        Err($crate::error::InternalError {
            file: file!(),
            line: line!(),
            message: format!($($arg)*),
        }.into())
    };
}

/// An invariant that the earlier passes should have guaranteed does not hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalError {
    pub file: &'static str,
    pub line: u32,
    pub message: String,
}
impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "internal error originated at {}:{}: {}", self.file, self.line, self.message)
    }
}
impl std::error::Error for InternalError {

}

/// Every way a proof script can be rejected.
/// All of them are fatal: verification stops at the first one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// undefined or duplicate theorem, definition or object
    Name { line: usize, message: String },
    /// wrong argument count, or a higher order argument that could not be substituted
    Arity { line: usize, message: String },
    /// a requirement of a referenced theorem does not hold at the reference
    Precondition {
        theorem: String,
        requirement_line: usize,
        reference_line: usize,
        requirement: Expr,
    },
    /// the statement was refuted by the known facts
    False { line: usize, expr: Expr },
    /// the statement could neither be proven nor refuted
    Unknown { line: usize, expr: Expr },
    /// no object satisfying all rules of the definition was shown to exist
    Existence { line: usize, name: String, goal: Expr },
    Internal(InternalError),
}

impl VerifyError {
    /// The source line the error should be reported at, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            VerifyError::Name { line, .. }
            | VerifyError::Arity { line, .. }
            | VerifyError::False { line, .. }
            | VerifyError::Unknown { line, .. }
            | VerifyError::Existence { line, .. } => Some(*line),
            VerifyError::Precondition { reference_line, .. } => Some(*reference_line),
            VerifyError::Internal(_) => None,
        }
    }
}

impl From<InternalError> for VerifyError {
    fn from(err: InternalError) -> Self {
        VerifyError::Internal(err)
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::Name { line, message } => {
                write!(f, "name error in line {}: {}", line, message)
            }
            VerifyError::Arity { line, message } => {
                write!(f, "arity error in line {}: {}", line, message)
            }
            VerifyError::Precondition { theorem, requirement_line, reference_line, requirement } => {
                write!(f, "failed to verify requirement in line {} of theorem `{}`, referenced in line {}\n{}",
                       requirement_line, theorem, reference_line, requirement)
            }
            VerifyError::False { line, expr } => {
                write!(f, "statement in line {} is false\n{}", line, expr)
            }
            VerifyError::Unknown { line, expr } => {
                write!(f, "failed to verify statement in line {}\n{}", line, expr)
            }
            VerifyError::Existence { line, name, goal } => {
                write!(f, "could not show that an object satisfying the rules of `{}` (line {}) exists\n{}",
                       name, line, goal)
            }
            VerifyError::Internal(err) => write!(f, "{}", err),
        }
    }
}
impl std::error::Error for VerifyError {

}

pub type BoxedErrorTrait = Box<dyn std::error::Error + 'static>;
