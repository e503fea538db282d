use std::collections::HashMap;
use std::fmt;

use crate::ast::{Expr, ExprKind};

/// Names are mapped to the expressions that replace them
pub type Substitution = HashMap<String, Expr>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    /// A name in function position was mapped to something that is not a plain name
    ObjectUsedAsFunction { name: String, replacement: Expr },
    /// A higher order argument still had placeholders after being applied
    LeftoverPlaceholder { template: Expr, result: Expr },
}

impl fmt::Display for RewriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteError::ObjectUsedAsFunction { name, replacement } => {
                write!(f, "`{}` is used as a function, but `{}` is not a function name", name, replacement)
            }
            RewriteError::LeftoverPlaceholder { template, result } => {
                write!(f, "not enough arguments to fill `{}`, left with `{}`", template, result)
            }
        }
    }
}
impl std::error::Error for RewriteError {

}

/// Gets a look at every node before the rewriter descends into it.
/// Returning `Some` replaces the node (and skips its children)
pub trait Intercept {
    fn intercept(&self, expr: &Expr, rewriter: &mut Rewriter<'_>) -> Result<Option<Expr>, RewriteError>;
}

impl<F> Intercept for F
    where F: Fn(&Expr, &mut Rewriter<'_>) -> Result<Option<Expr>, RewriteError>
{
    fn intercept(&self, expr: &Expr, rewriter: &mut Rewriter<'_>) -> Result<Option<Expr>, RewriteError> {
        self(expr, rewriter)
    }
}

/// Capture avoiding substitution.
/// Every bound name met on the way down is renamed by prefixing `_`,
/// so no replacement can be captured by a binder of the rewritten expression
pub struct Rewriter<'a> {
    sub: Substitution,
    intercept: Option<&'a dyn Intercept>,
}

impl<'a> Rewriter<'a> {
    pub fn new(sub: Substitution) -> Rewriter<'a> {
        Rewriter { sub, intercept: None }
    }
    pub fn with_intercept(sub: Substitution, intercept: &'a dyn Intercept) -> Rewriter<'a> {
        Rewriter { sub, intercept: Some(intercept) }
    }
    pub fn rewrite(&mut self, expr: &Expr) -> Result<Expr, RewriteError> {
        if let Some(hook) = self.intercept {
            if let Some(replacement) = hook.intercept(expr, self)? {
                return Ok(replacement);
            }
        }
        let rewritten = match expr.kind() {
            ExprKind::Binary(lhs, op, rhs) => {
                Expr::binary(self.rewrite(lhs)?, op.clone(), self.rewrite(rhs)?)
            }
            ExprKind::Not(inner) => self.rewrite(inner)?.negate(),
            ExprKind::Quantifier(quantifier, bound, body) => {
                let (bound, body) = self.rebind(bound, body)?;
                Expr::quantified(*quantifier, bound, body)
            }
            ExprKind::SetBuilder(bound, predicate) => {
                let (bound, predicate) = self.rebind(bound, predicate)?;
                Expr::set_builder(bound, predicate)
            }
            ExprKind::Call(name, args) => {
                let name = match self.sub.get(name).map(|replacement| replacement.kind()) {
                    None => name.clone(),
                    Some(ExprKind::Variable(renamed)) => renamed.clone(),
                    Some(_) => {
                        return Err(RewriteError::ObjectUsedAsFunction {
                            name: name.clone(),
                            replacement: self.sub[name].clone(),
                        });
                    }
                };
                Expr::call(name, self.rewrite_all(args)?)
            }
            ExprKind::Variable(name) => match self.sub.get(name) {
                Some(replacement) => replacement.clone(),
                None => expr.clone(),
            },
            ExprKind::Tuple(elements) => Expr::tuple(self.rewrite_all(elements)?),
            ExprKind::SetEnum(elements) => Expr::set_enum(self.rewrite_all(elements)?),
        };
        Ok(rewritten)
    }
    pub fn rewrite_all(&mut self, exprs: &[Expr]) -> Result<Vec<Expr>, RewriteError> {
        exprs.iter().map(|e| self.rewrite(e)).collect()
    }
    /// Rename `bound` for the duration of rewriting `body`, then restore whatever mapping it shadowed
    fn rebind(&mut self, bound: &str, body: &Expr) -> Result<(String, Expr), RewriteError> {
        let fresh = self.fresh_name(bound, body);
        let shadowed = self.sub.insert(bound.to_string(), Expr::variable(fresh.clone()));
        let body = self.rewrite(body);
        match shadowed {
            Some(previous) => self.sub.insert(bound.to_string(), previous),
            None => self.sub.remove(bound),
        };
        Ok((fresh, body?))
    }
    fn fresh_name(&self, bound: &str, body: &Expr) -> String {
        let mut fresh = format!("_{}", bound);
        while body.occurs_free(&fresh) || self.sub.values().any(|value| value.occurs_free(&fresh)) {
            fresh.insert(0, '_');
        }
        fresh
    }
}

/// `_0`, `_1`, ... stand for the positional arguments of a higher order argument
pub fn placeholder(index: usize) -> String {
    format!("_{}", index)
}

pub fn is_placeholder(name: &str) -> bool {
    name.starts_with('_')
        && name.len() > 1
        && name[1..].chars().all(|c| c.is_ascii_digit())
}

impl Expr {
    pub fn substitute(&self, sub: &Substitution) -> Result<Expr, RewriteError> {
        Rewriter::new(sub.clone()).rewrite(self)
    }
    /// Replace the free occurrences of `from` with the name `to`
    pub fn rename(&self, from: &str, to: &str) -> Expr {
        let mut sub = Substitution::new();
        sub.insert(from.to_string(), Expr::variable(to));
        Rewriter::new(sub)
            .rewrite(self)
            .expect("renaming to a plain name never puts an object in function position")
    }
    pub fn has_placeholder(&self) -> bool {
        self.find(&|e: &Expr| match e.kind() {
            ExprKind::Variable(name) => is_placeholder(name),
            _ => false,
        })
    }
}
