use std::collections::{HashMap, HashSet};

use crate::ast::*;
use crate::config::Config;
use crate::error::VerifyError;
use crate::scope::ScopeStack;

const THEOREM: &'static str = "Theorem";
const DEFINITION: &'static str = "Definition";
const BINDER: &'static str = "Binder";
const REFERENCE: &'static str = "Reference";
const IF: &'static str = "If";
const ELSE: &'static str = "Else";
const BOTH: &'static str = "Both";

/// Checks that every name is declared before it is used, and that no name is declared twice
/// while it is still visible.
/// Object names are scoped, theorem and definition names are global
#[derive(Debug)]
pub struct SymbolTable<'c> {
    objects: ScopeStack<String>,
    theorems: HashMap<String, usize>, // theorem name --> number of parameters
    definitions: HashSet<String>,
    config: &'c Config,
}

/// Run name resolution over a whole program
pub fn resolve(program: &Program, config: &Config) -> Result<(), VerifyError> {
    let mut table = SymbolTable::new(config);
    for declaration in &program.declarations {
        table.declaration(declaration)?;
    }
    Ok(())
}

fn name_error<T>(line: usize, message: String) -> Result<T, VerifyError> {
    Err(VerifyError::Name { line, message })
}

/// Numeric literals are names that never need a declaration
fn is_numeral(name: &str) -> bool {
    name.chars().next().map_or(false, |c| c.is_ascii_digit())
}

impl<'c> SymbolTable<'c> {
    pub fn new(config: &'c Config) -> SymbolTable<'c> {
        SymbolTable {
            objects: ScopeStack::new(),
            theorems: HashMap::new(),
            definitions: HashSet::new(),
            config,
        }
    }
    pub fn declaration(&mut self, declaration: &Declaration) -> Result<(), VerifyError> {
        match declaration {
            Declaration::Theorem(theorem) => self.theorem(theorem),
            Declaration::Definition(definition) => self.definition(definition),
        }
    }
    fn theorem(&mut self, theorem: &Theorem) -> Result<(), VerifyError> {
        if self.theorems.contains_key(&theorem.name) {
            return name_error(theorem.line, format!("a theorem named `{}` has already been defined", theorem.name));
        }
        self.objects.enter(THEOREM);
        for parameter in &theorem.parameters {
            self.declare(parameter, theorem.line)?;
        }
        for requirement in &theorem.requirements {
            self.expr(&requirement.expr, requirement.line)?;
        }
        self.expr(&theorem.hypothesis.expr, theorem.hypothesis.line)?;
        self.block(&theorem.proof)?;
        self.objects.exit(THEOREM)?;
        self.theorems.insert(theorem.name.clone(), theorem.parameters.len());
        Ok(())
    }
    fn definition(&mut self, definition: &Definition) -> Result<(), VerifyError> {
        if self.definitions.contains(&definition.name) {
            return name_error(definition.line, format!("a definition named `{}` has already been defined", definition.name));
        }
        // the defined object stays visible for the rest of the program
        self.declare(&definition.name, definition.line)?;
        self.definitions.insert(definition.name.clone());
        self.objects.enter(DEFINITION);
        for rule in &definition.rules {
            self.expr(&rule.expr, rule.line)?;
        }
        self.block(&definition.proof)?;
        self.objects.exit(DEFINITION)?;
        Ok(())
    }
    fn declare(&mut self, name: &str, line: usize) -> Result<(), VerifyError> {
        if name.starts_with('_') {
            return name_error(line, format!("`{}`: names starting with `_` are reserved", name));
        }
        if self.objects.contains(name) {
            return name_error(line, format!("`{}` is already declared in this scope", name));
        }
        self.objects.add(name.to_string());
        Ok(())
    }
    fn block(&mut self, block: &Block) -> Result<(), VerifyError> {
        for step in &block.steps {
            self.step(step)?;
        }
        Ok(())
    }
    fn step(&mut self, step: &Step) -> Result<(), VerifyError> {
        match &step.kind {
            StepKind::Sorry | StepKind::Check => {}
            StepKind::Claim(expr) => self.expr(expr, step.line)?,
            StepKind::Let(name, expr) => {
                self.declare(name, step.line)?;
                self.expr(expr, step.line)?;
            }
            StepKind::Conditional(conditional) => {
                self.expr(&conditional.condition.expr, conditional.condition.line)?;
                self.scoped_block(IF, &conditional.if_block)?;
                self.scoped_block(ELSE, &conditional.else_block)?;
                self.scoped_block(BOTH, &conditional.both_block)?;
            }
        }
        if let Some(justification) = &step.justification {
            self.justification(justification, step.line)?;
        }
        Ok(())
    }
    fn scoped_block(&mut self, tag: &'static str, block: &Block) -> Result<(), VerifyError> {
        self.objects.enter(tag);
        self.block(block)?;
        self.objects.exit(tag)?;
        Ok(())
    }
    fn justification(&mut self, justification: &Justification, line: usize) -> Result<(), VerifyError> {
        match justification {
            Justification::Sorry => Ok(()),
            Justification::Definition(name) => {
                if self.definitions.contains(name) {
                    Ok(())
                } else {
                    name_error(line, format!("reference to undefined definition `{}`", name))
                }
            }
            Justification::Theorem(reference) => {
                let arity = match self.theorems.get(&reference.name) {
                    Some(arity) => *arity,
                    None => return name_error(line, format!("reference to undefined theorem `{}`", reference.name)),
                };
                if arity != reference.args.len() {
                    return Err(VerifyError::Arity {
                        line,
                        message: format!("expected {} arguments but found {} at reference to theorem `{}`",
                                         arity, reference.args.len(), reference.name),
                    });
                }
                // placeholders are only meaningful inside the arguments of a reference
                self.objects.enter(REFERENCE);
                for slot in 0..self.config.placeholder_slots {
                    self.objects.add(format!("_{}", slot));
                }
                for arg in &reference.args {
                    self.expr(arg, line)?;
                }
                self.objects.exit(REFERENCE)?;
                Ok(())
            }
        }
    }
    fn expr(&mut self, expr: &Expr, line: usize) -> Result<(), VerifyError> {
        match expr.kind() {
            ExprKind::Binary(lhs, op, rhs) => {
                self.expr(lhs, line)?;
                if let BinOp::Named(name) = op {
                    self.used(name, line)?;
                }
                self.expr(rhs, line)
            }
            ExprKind::Not(inner) => self.expr(inner, line),
            ExprKind::Quantifier(_, bound, body) | ExprKind::SetBuilder(bound, body) => {
                self.objects.enter(BINDER);
                self.declare(bound, line)?;
                self.expr(body, line)?;
                self.objects.exit(BINDER)?;
                Ok(())
            }
            ExprKind::Call(name, args) => {
                self.used(name, line)?;
                for arg in args {
                    self.expr(arg, line)?;
                }
                Ok(())
            }
            ExprKind::Variable(name) => self.used(name, line),
            ExprKind::Tuple(elements) | ExprKind::SetEnum(elements) => {
                for element in elements {
                    self.expr(element, line)?;
                }
                Ok(())
            }
        }
    }
    fn used(&self, name: &str, line: usize) -> Result<(), VerifyError> {
        if is_numeral(name) || self.objects.contains(name) {
            Ok(())
        } else {
            name_error(line, format!("`{}` is not declared", name))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{parse, resolve};
    use crate::config::Config;
    use crate::error::VerifyError;

    fn resolve_source(source: &str) -> Result<(), VerifyError> {
        let program = parse(source).expect("should parse");
        resolve(&program, &Config::default())
    }
    fn expect_name_error(source: &str, expected_line: usize) {
        match resolve_source(source) {
            Err(VerifyError::Name { line, .. }) => assert_eq!(line, expected_line),
            other => panic!("expected a name error, found {:?}", other),
        }
    }

    #[test]
    fn resolve_simple_0() {
        let source = "theorem T(P, a):\nP(a)\n⇒ ∃x(P(x) ∧ x = 0)\n{\n}\n";
        resolve_source(source).expect("everything is declared");
    }
    #[test]
    fn resolve_undeclared_0() {
        expect_name_error("theorem T(a):\n⇒ P(a)\n{\n}\n", 2);
    }
    #[test]
    fn resolve_shadow_0() {
        // no shadowing, even by a quantifier
        expect_name_error("theorem T(x, P):\n⇒ ∀x(P(x))\n{\n}\n", 2);
    }
    #[test]
    fn resolve_reserved_0() {
        expect_name_error("theorem T(_a):\n⇒ _a = _a\n{\n}\n", 1);
    }
    #[test]
    fn resolve_duplicate_0() {
        let source = "theorem T(a):\n⇒ a = a\n{\n}\ntheorem T(b):\n⇒ b = b\n{\n}\n";
        expect_name_error(source, 5);
    }
    #[test]
    fn resolve_reference_0() {
        let source = "\
theorem Refl(a):
⇒ a = a
{
}
theorem T(b, P):
⇒ b = b
{
    b = b | Refl(b)
    P(b) | Missing(b)
}
";
        expect_name_error(source, 9);
    }
    #[test]
    fn resolve_arity_0() {
        let source = "theorem Refl(a):\n⇒ a = a\n{\n}\ntheorem T(b):\n⇒ b = b\n{\n    b = b | Refl(b, b)\n}\n";
        match resolve_source(source) {
            Err(VerifyError::Arity { line: 8, .. }) => {}
            other => panic!("expected an arity error, found {:?}", other),
        }
    }
    #[test]
    fn resolve_placeholder_0() {
        let source = "\
theorem Ind(P):
⇒ P(0)
{
    sorry
}
theorem T(n):
⇒ n = n
{
    n = n | Ind(_0 = _0)
    _0 = n
}
";
        // placeholders are only in scope inside the reference arguments
        expect_name_error(source, 10);
    }
    #[test]
    fn resolve_let_scope_0() {
        let source = "\
define S:
    S = S
end
{
    if (S = S)
    {
        let y: y = S
    }
    else
    {
        let y: y = S
    }
    both
    {
        y = S
    }
}
";
        expect_name_error(source, 15);
    }
}
