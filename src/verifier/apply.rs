use std::collections::HashMap;

use crate::ast::{Expr, ExprKind, TheoremRef};
use crate::error::VerifyError;
use crate::verifier::rewrite::{placeholder, RewriteError, Rewriter, Substitution};
use crate::verifier::{Truth, Verifier};

/// Expands calls of higher order parameters.
/// A parameter bound to an argument containing `_0`, `_1`, ... acts as a template:
/// `P(x, y)` becomes the template with `_0` and `_1` replaced by `x` and `y`
struct HigherOrderSlots {
    templates: HashMap<String, Expr>,
}

impl HigherOrderSlots {
    fn fill(&self, template: &Expr, args: Vec<Expr>) -> Result<Expr, RewriteError> {
        let positional = args.into_iter()
            .enumerate()
            .map(|(i, arg)| (placeholder(i), arg))
            .collect::<Substitution>();
        let filled = template.substitute(&positional)?;
        if filled.has_placeholder() {
            return Err(RewriteError::LeftoverPlaceholder { template: template.clone(), result: filled });
        }
        Ok(filled)
    }
}

impl super::rewrite::Intercept for HigherOrderSlots {
    fn intercept(&self, expr: &Expr, rewriter: &mut Rewriter<'_>) -> Result<Option<Expr>, RewriteError> {
        let (name, args) = match expr.kind() {
            ExprKind::Call(name, args) => (name, args),
            _ => return Ok(None),
        };
        match self.templates.get(name) {
            Some(template) => {
                // the arguments live in the theorem's namespace, so they are rewritten first
                let args = rewriter.rewrite_all(args)?;
                self.fill(template, args).map(Some)
            }
            None => Ok(None),
        }
    }
}

impl Verifier {
    /// Instantiate a theorem at a reference: every requirement must hold, then the hypothesis becomes a fact
    pub(crate) fn apply_theorem(&mut self, reference: &TheoremRef, line: usize) -> Result<(), VerifyError> {
        let theorem = match self.theorems.get(&reference.name) {
            Some(theorem) => theorem.clone(),
            None => return Err(VerifyError::Name {
                line,
                message: format!("reference to undefined theorem `{}`", reference.name),
            }),
        };
        if theorem.parameters.len() != reference.args.len() {
            return Err(VerifyError::Arity {
                line,
                message: format!("expected {} arguments but found {} at reference to theorem `{}`",
                                 theorem.parameters.len(), reference.args.len(), theorem.name),
            });
        }
        let mut sub = Substitution::new();
        let mut templates = HashMap::new();
        for (parameter, arg) in theorem.parameters.iter().zip(&reference.args) {
            if arg.has_placeholder() {
                templates.insert(parameter.clone(), arg.clone());
            } else {
                sub.insert(parameter.clone(), arg.clone());
            }
        }
        let slots = HigherOrderSlots { templates };
        let instantiate = |expr: &Expr| {
            Rewriter::with_intercept(sub.clone(), &slots)
                .rewrite(expr)
                .map_err(|why| VerifyError::Arity { line, message: why.to_string() })
        };

        for requirement in &theorem.requirements {
            let instance = instantiate(&requirement.expr)?;
            debug!("checking requirement {} of `{}`", instance, theorem.name);
            if self.analyse(&instance, true)? != Truth::True {
                return Err(VerifyError::Precondition {
                    theorem: theorem.name.clone(),
                    requirement_line: requirement.line,
                    reference_line: line,
                    requirement: instance,
                });
            }
        }
        let conclusion = instantiate(&theorem.hypothesis.expr)?;
        debug!("`{}` gives {}", theorem.name, conclusion);
        self.facts.add(conclusion);
        Ok(())
    }

    /// A definition reference makes its rules available as they are written
    pub(crate) fn apply_definition(&mut self, name: &str, line: usize) -> Result<(), VerifyError> {
        let definition = match self.definitions.get(name) {
            Some(definition) => definition,
            None => return Err(VerifyError::Name {
                line,
                message: format!("reference to undefined definition `{}`", name),
            }),
        };
        for rule in &definition.rules {
            self.facts.add(rule.expr.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::HigherOrderSlots;
    use crate::ast::{parse_expression, Expr};
    use crate::verifier::rewrite::{RewriteError, Rewriter, Substitution};

    fn expr(source: &str) -> Expr {
        parse_expression(source).expect("should parse")
    }

    #[test]
    fn higher_order_0() {
        let mut templates = std::collections::HashMap::new();
        templates.insert("P".to_string(), expr("_0 = n"));
        let slots = HigherOrderSlots { templates };
        let mut sub = Substitution::new();
        sub.insert("n".to_string(), expr("m"));
        sub.insert("k".to_string(), expr("f(m)"));
        let rewritten = Rewriter::with_intercept(sub, &slots)
            .rewrite(&expr("P(k) ⇒ ∀x(P(x))"))
            .expect("should rewrite");
        // the template keeps its own names, the call arguments are rewritten first
        assert_eq!(rewritten, expr("f(m) = n ⇒ ∀_x(_x = n)"));
    }
    #[test]
    fn higher_order_1() {
        let mut templates = std::collections::HashMap::new();
        templates.insert("R".to_string(), expr("_0 ∈ _1"));
        let slots = HigherOrderSlots { templates };
        let err = Rewriter::with_intercept(Substitution::new(), &slots)
            .rewrite(&expr("R(a)"))
            .expect_err("one argument can not fill two slots");
        match err {
            RewriteError::LeftoverPlaceholder { .. } => {}
            other => panic!("unexpected error {:?}", other),
        }
    }
}
