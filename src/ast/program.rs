use crate::ast::Expr;

/// An expression together with the source line it starts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprLine {
    pub expr: Expr,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theorem {
    pub name: String,
    pub line: usize,
    pub parameters: Vec<String>,
    pub requirements: Vec<ExprLine>,
    pub hypothesis: ExprLine,
    pub proof: Block,
}

/// Introduces a new object constrained by its rules.
/// The optional proof shows that such an object exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    pub line: usize,
    pub rules: Vec<ExprLine>,
    pub proof: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Theorem(Theorem),
    Definition(Definition),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub line: usize,
    pub kind: StepKind,
    pub justification: Option<Justification>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    Claim(Expr),
    /// `let x: P(x)` proves that some `x` satisfies `P`, then names it
    Let(String, Expr),
    Conditional(Conditional),
    /// Dumps the facts known at this point
    Check,
    /// Accepts the rest of the enclosing proof unverified
    Sorry,
}

/// `if (C)` / `else` / `both`: the `both` block is verified once under `C` and once under `¬C`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    pub condition: ExprLine,
    pub if_block: Block,
    pub else_block: Block,
    pub both_block: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Justification {
    Theorem(TheoremRef),
    Definition(String),
    Sorry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TheoremRef {
    pub name: String,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub declarations: Vec<Declaration>,
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Theorem(theorem) => &theorem.name,
            Declaration::Definition(definition) => &definition.name,
        }
    }
    pub fn line(&self) -> usize {
        match self {
            Declaration::Theorem(theorem) => theorem.line,
            Declaration::Definition(definition) => definition.line,
        }
    }
}
