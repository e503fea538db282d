use indexmap::IndexMap;
use itertools::Itertools;

use crate::ast::*;
use crate::config::Config;
use crate::error::VerifyError;
use crate::scope::ScopeStack;

mod analyse;
mod apply;
mod compare;
mod report;
pub mod rewrite;

pub use report::{CheckDump, DeclarationKind, Entry, Report, Status};

/// Proven statements, scoped so that temporary assumptions can be withdrawn
pub type FactStore = ScopeStack<Expr>;

const THEOREM: &'static str = "Theorem";
const DEFINITION: &'static str = "Definition";
const STATEMENT: &'static str = "Statement";
const IF: &'static str = "If";
const ELSE: &'static str = "Else";

/// The value of a statement relative to the known facts.
/// `False` means refuted by them, not merely unproven
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    pub fn negate(self) -> Truth {
        match self {
            Truth::True => Truth::False,
            Truth::False => Truth::True,
            Truth::Unknown => Truth::Unknown,
        }
    }
}

/// What a block established, and whether a `sorry` cut it short
#[derive(Debug, Default)]
struct BlockOutcome {
    concluded: Vec<Expr>,
    stopped_at: Option<usize>,
}

impl BlockOutcome {
    fn stopped(line: usize) -> BlockOutcome {
        BlockOutcome { concluded: vec![], stopped_at: Some(line) }
    }
}

pub struct Verifier {
    config: Config,
    facts: FactStore,
    theorems: IndexMap<String, Theorem>,
    definitions: IndexMap<String, Definition>,
    /// first `sorry` of the declaration being verified
    admitted: Option<usize>,
    /// set while a conjunction is being refuted, so nested conjunctions do not refute again
    refuting: bool,
    report: Report,
}

impl Verifier {
    pub fn new(config: Config) -> Verifier {
        Verifier {
            config,
            facts: FactStore::new(),
            theorems: IndexMap::new(),
            definitions: IndexMap::new(),
            admitted: None,
            refuting: false,
            report: Report::default(),
        }
    }
    /// Verify every declaration in order, stopping at the first error
    pub fn verify(mut self, program: &Program) -> Result<Report, VerifyError> {
        for declaration in &program.declarations {
            match declaration {
                Declaration::Theorem(theorem) => self.verify_theorem(theorem)?,
                Declaration::Definition(definition) => self.verify_definition(definition)?,
            }
        }
        Ok(self.report)
    }
    /// Add a fact to the innermost scope
    pub fn assume(&mut self, fact: Expr) {
        trace!("adding fact {}", fact);
        self.facts.add(fact);
    }
    pub fn facts(&self) -> &FactStore {
        &self.facts
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    /// Evaluate a statement against the current facts, with indirect matching enabled
    pub fn analyse_statement(&mut self, expr: &Expr) -> Result<Truth, VerifyError> {
        self.analyse(expr, true)
    }

    fn verify_theorem(&mut self, theorem: &Theorem) -> Result<(), VerifyError> {
        info!("verifying theorem `{}` in line {}", theorem.name, theorem.line);
        self.admitted = None;
        self.facts.enter(THEOREM);
        for requirement in &theorem.requirements {
            self.assume(requirement.expr.clone());
        }
        let outcome = self.verify_block(&theorem.proof)?;
        if outcome.stopped_at.is_none() {
            self.verify_claim(&theorem.hypothesis.expr, theorem.hypothesis.line, None)?;
        }
        let facts = self.facts.iter().cloned().collect();
        self.facts.exit(THEOREM)?;
        self.theorems.insert(theorem.name.clone(), theorem.clone());
        self.record(DeclarationKind::Theorem, &theorem.name, theorem.line, facts);
        Ok(())
    }

    fn verify_definition(&mut self, definition: &Definition) -> Result<(), VerifyError> {
        info!("verifying definition `{}` in line {}", definition.name, definition.line);
        self.admitted = None;
        self.facts.enter(DEFINITION);
        let outcome = self.verify_block(&definition.proof)?;
        if outcome.stopped_at.is_none() && !definition.rules.is_empty() {
            self.verify_existence(definition)?;
        }
        let facts = self.facts.iter().cloned().collect();
        self.facts.exit(DEFINITION)?;
        self.definitions.insert(definition.name.clone(), definition.clone());
        self.record(DeclarationKind::Definition, &definition.name, definition.line, facts);
        Ok(())
    }

    /// Some object has to satisfy all the rules at once: `∃_name(rule1 ∧ rule2 ∧ ...)`
    fn verify_existence(&mut self, definition: &Definition) -> Result<(), VerifyError> {
        let witness = format!("_{}", definition.name);
        let conjunction = definition.rules.iter()
            .map(|rule| rule.expr.rename(&definition.name, &witness))
            .fold1(Expr::and);
        let goal = match conjunction {
            Some(conjunction) => Expr::exists(witness, conjunction),
            None => return Ok(()),
        };
        debug!("existence obligation of `{}`: {}", definition.name, goal);
        if self.analyse(&goal, true)? != Truth::True {
            return Err(VerifyError::Existence { line: definition.line, name: definition.name.clone(), goal });
        }
        Ok(())
    }

    fn record(&mut self, kind: DeclarationKind, name: &str, line: usize, facts: Vec<Expr>) {
        let status = match self.admitted.take() {
            Some(line) => Status::Admitted { line },
            None => Status::Proved,
        };
        let entry = Entry { kind, name: name.to_string(), line, status, facts };
        info!("{}", entry);
        self.report.entries.push(entry);
    }

    fn admit(&mut self, line: usize) {
        warn!("accepting line {} without verification (sorry)", line);
        if self.admitted.is_none() {
            self.admitted = Some(line);
        }
    }

    fn verify_block(&mut self, block: &Block) -> Result<BlockOutcome, VerifyError> {
        let mut concluded = vec![];
        for step in &block.steps {
            match &step.kind {
                StepKind::Sorry => {
                    self.admit(step.line);
                    return Ok(BlockOutcome { concluded, stopped_at: Some(step.line) });
                }
                StepKind::Check => self.check(step.line),
                StepKind::Claim(expr) => {
                    self.verify_claim(expr, step.line, step.justification.as_ref())?;
                    self.assume(expr.clone());
                    concluded.push(expr.clone());
                }
                StepKind::Let(name, expr) => {
                    let goal = Expr::exists(name.clone(), expr.clone());
                    self.verify_claim(&goal, step.line, step.justification.as_ref())?;
                    self.assume(expr.clone());
                    concluded.push(expr.clone());
                }
                StepKind::Conditional(conditional) => {
                    let outcome = self.verify_conditional(conditional)?;
                    concluded.extend(outcome.concluded);
                    if outcome.stopped_at.is_some() {
                        return Ok(BlockOutcome { concluded, stopped_at: outcome.stopped_at });
                    }
                }
            }
        }
        Ok(BlockOutcome { concluded, stopped_at: None })
    }

    /// The `both` block runs once under the condition and once under its negation.
    /// Only what it concludes reaches the enclosing block
    fn verify_conditional(&mut self, conditional: &Conditional) -> Result<BlockOutcome, VerifyError> {
        let condition = &conditional.condition.expr;
        debug!("case split on {} in line {}", condition, conditional.condition.line);
        let mut outcome = BlockOutcome::default();
        for (tag, assumption, branch) in vec![
            (IF, condition.clone(), &conditional.if_block),
            (ELSE, condition.clone().negate(), &conditional.else_block),
        ] {
            self.facts.enter(tag);
            self.assume(assumption);
            let branch_outcome = self.verify_branch(branch, &conditional.both_block)?;
            self.facts.exit(tag)?;
            if let Some(line) = branch_outcome.stopped_at {
                return Ok(BlockOutcome::stopped(line));
            }
            outcome = branch_outcome;
        }
        for fact in &outcome.concluded {
            self.assume(fact.clone());
        }
        Ok(outcome)
    }

    fn verify_branch(&mut self, branch: &Block, both: &Block) -> Result<BlockOutcome, VerifyError> {
        let outcome = self.verify_block(branch)?;
        if outcome.stopped_at.is_some() {
            return Ok(outcome);
        }
        self.verify_block(both)
    }

    /// Justify and analyse one statement inside its own scope, so that whatever the justification
    /// brings in is gone afterwards
    fn verify_claim(&mut self, expr: &Expr, line: usize, justification: Option<&Justification>) -> Result<(), VerifyError> {
        if let Some(Justification::Sorry) = justification {
            self.admit(line);
            return Ok(());
        }
        debug!("verifying statement in line {}: {}", line, expr);
        self.facts.enter(STATEMENT);
        match justification {
            Some(Justification::Theorem(reference)) => self.apply_theorem(reference, line)?,
            Some(Justification::Definition(name)) => self.apply_definition(name, line)?,
            Some(Justification::Sorry) | None => {}
        }
        let truth = self.analyse(expr, true)?;
        self.facts.exit(STATEMENT)?;
        match truth {
            Truth::True => Ok(()),
            Truth::False => Err(VerifyError::False { line, expr: expr.clone() }),
            Truth::Unknown => Err(VerifyError::Unknown { line, expr: expr.clone() }),
        }
    }

    fn check(&mut self, line: usize) {
        let facts = self.facts.iter().cloned().collect_vec();
        debug!("check in line {}: {} facts visible", line, facts.len());
        self.report.checks.push(CheckDump { line, facts });
    }
}
