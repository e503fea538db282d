use indexmap::IndexSet;
use itertools::Itertools;

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use ExprKind::*;

/// An immutable expression tree. Subtrees are shared, so cloning is cheap
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Expr {
    kind: Rc<ExprKind>,
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Binary(Expr, BinOp, Expr),
    Not(Expr),
    /// A quantifier binds one name in its body
    Quantifier(Quantifier, String, Expr),
    /// Predicate or function application. Constants are just variables, not zero argument calls
    Call(String, Vec<Expr>),
    /// An object name, or a numeric literal (which is an opaque name)
    Variable(String),
    /// `[a, b, ...]`
    Tuple(Vec<Expr>),
    /// `{a, b, ...}`
    SetEnum(Vec<Expr>),
    /// `{x : P(x)}` binds `x` in the predicate
    SetBuilder(String, Expr),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BinOp {
    Iff,
    Implies,
    Or,
    And,
    Equals,
    ElementOf,
    Subset,
    Plus,
    Minus,
    Times,
    Divide,
    /// Any identifier used in infix position, like `a R b`
    Named(String),
}

/// What an operator produces: statements combine statements,
/// relations compare objects, arithmetic builds new objects
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OperatorClass {
    Statement,
    Relation,
    Arithmetic,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Quantifier {
    ForAll,
    Exists,
}

impl BinOp {
    /// Binding strength, higher binds tighter. Every level is left associative
    pub fn precedence(&self) -> u32 {
        match self {
            BinOp::Iff => 0,
            BinOp::Implies => 1,
            BinOp::Or => 2,
            BinOp::And => 3,
            BinOp::Equals | BinOp::ElementOf | BinOp::Subset => 5,
            BinOp::Plus | BinOp::Minus => 10,
            BinOp::Times | BinOp::Divide => 12,
            BinOp::Named(_) => 100,
        }
    }
    pub fn class(&self) -> OperatorClass {
        match self {
            BinOp::Iff | BinOp::Implies | BinOp::Or | BinOp::And => OperatorClass::Statement,
            BinOp::Equals | BinOp::ElementOf | BinOp::Subset => OperatorClass::Relation,
            BinOp::Plus | BinOp::Minus | BinOp::Times | BinOp::Divide | BinOp::Named(_) => OperatorClass::Arithmetic,
        }
    }
    pub fn symbol(&self) -> &str {
        match self {
            BinOp::Iff => "⇔",
            BinOp::Implies => "⇒",
            BinOp::Or => "∨",
            BinOp::And => "∧",
            BinOp::Equals => "=",
            BinOp::ElementOf => "∈",
            BinOp::Subset => "⊆",
            BinOp::Plus => "+",
            BinOp::Minus => "-",
            BinOp::Times => "⋅",
            BinOp::Divide => "÷",
            BinOp::Named(name) => name.as_str(),
        }
    }
}

impl Quantifier {
    pub fn symbol(&self) -> &'static str {
        match self {
            Quantifier::ForAll => "∀",
            Quantifier::Exists => "∃",
        }
    }
}

impl ExprKind {
    fn into_expr(self) -> Expr {
        Expr { kind: Rc::new(self) }
    }
}

impl From<ExprKind> for Expr {
    fn from(kind: ExprKind) -> Expr {
        kind.into_expr()
    }
}

impl Expr {
    pub fn variable(name: impl Into<String>) -> Expr {
        Variable(name.into()).into_expr()
    }
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Expr {
        Call(name.into(), args).into_expr()
    }
    pub fn binary(lhs: Expr, op: BinOp, rhs: Expr) -> Expr {
        Binary(lhs, op, rhs).into_expr()
    }
    pub fn and(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(lhs, BinOp::And, rhs)
    }
    pub fn implies(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(lhs, BinOp::Implies, rhs)
    }
    pub fn equals(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(lhs, BinOp::Equals, rhs)
    }
    pub fn negate(self) -> Expr {
        Not(self).into_expr()
    }
    pub fn quantified(quantifier: Quantifier, bound: impl Into<String>, body: Expr) -> Expr {
        ExprKind::Quantifier(quantifier, bound.into(), body).into_expr()
    }
    pub fn forall(bound: impl Into<String>, body: Expr) -> Expr {
        Expr::quantified(Quantifier::ForAll, bound, body)
    }
    pub fn exists(bound: impl Into<String>, body: Expr) -> Expr {
        Expr::quantified(Quantifier::Exists, bound, body)
    }
    pub fn tuple(elements: Vec<Expr>) -> Expr {
        Tuple(elements).into_expr()
    }
    pub fn set_enum(elements: Vec<Expr>) -> Expr {
        SetEnum(elements).into_expr()
    }
    pub fn set_builder(bound: impl Into<String>, predicate: Expr) -> Expr {
        SetBuilder(bound.into(), predicate).into_expr()
    }
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }
    /// Does `name` occur in this expression without being bound by a quantifier or set builder?
    pub fn occurs_free(&self, name: &str) -> bool {
        match self.kind.deref() {
            Binary(lhs, _, rhs) => lhs.occurs_free(name) || rhs.occurs_free(name),
            Not(inner) => inner.occurs_free(name),
            ExprKind::Quantifier(_, bound, body) | SetBuilder(bound, body) => {
                bound != name && body.occurs_free(name)
            }
            Call(fun, args) => fun == name || args.iter().any(|a| a.occurs_free(name)),
            Variable(var) => var == name,
            Tuple(elements) | SetEnum(elements) => elements.iter().any(|e| e.occurs_free(name)),
        }
    }
    /// Is there a subexpression (including this one) satisfying the predicate?
    pub fn find(&self, predicate: &impl Fn(&Expr) -> bool) -> bool {
        if predicate(self) {
            return true;
        }
        match self.kind.deref() {
            Binary(lhs, _, rhs) => lhs.find(predicate) || rhs.find(predicate),
            Not(inner) | ExprKind::Quantifier(_, _, inner) | SetBuilder(_, inner) => inner.find(predicate),
            Call(_, args) | Tuple(args) | SetEnum(args) => args.iter().any(|a| a.find(predicate)),
            Variable(_) => false,
        }
    }
    /// Every name used as an object or a function anywhere in the expression, in order of appearance
    pub fn object_names(&self) -> IndexSet<String> {
        let mut names = IndexSet::new();
        self.collect_names(&mut names);
        names
    }
    fn collect_names(&self, names: &mut IndexSet<String>) {
        match self.kind.deref() {
            Binary(lhs, _, rhs) => {
                lhs.collect_names(names);
                rhs.collect_names(names);
            }
            Not(inner) | ExprKind::Quantifier(_, _, inner) | SetBuilder(_, inner) => inner.collect_names(names),
            Call(fun, args) => {
                names.insert(fun.clone());
                for arg in args {
                    arg.collect_names(names);
                }
            }
            Variable(name) => {
                names.insert(name.clone());
            }
            Tuple(elements) | SetEnum(elements) => {
                for element in elements {
                    element.collect_names(names);
                }
            }
        }
    }
    /// Names introduced by a quantifier or set builder somewhere inside the expression
    pub fn bound_names(&self) -> IndexSet<String> {
        let mut names = IndexSet::new();
        self.collect_bound(&mut names);
        names
    }
    fn collect_bound(&self, names: &mut IndexSet<String>) {
        match self.kind.deref() {
            Binary(lhs, _, rhs) => {
                lhs.collect_bound(names);
                rhs.collect_bound(names);
            }
            Not(inner) => inner.collect_bound(names),
            ExprKind::Quantifier(_, bound, inner) | SetBuilder(bound, inner) => {
                names.insert(bound.clone());
                inner.collect_bound(names);
            }
            Call(_, args) | Tuple(args) | SetEnum(args) => {
                for arg in args {
                    arg.collect_bound(names);
                }
            }
            Variable(_) => {}
        }
    }
    /// Does this expression need parentheses when it appears as an operand of `parent`?
    fn needs_parens(&self, parent: &BinOp, right_side: bool) -> bool {
        match self.kind.deref() {
            Binary(_, op, _) if right_side => op.precedence() <= parent.precedence(),
            Binary(_, op, _) => op.precedence() < parent.precedence(),
            _ => false,
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Expr, parent: &BinOp, right_side: bool) -> fmt::Result {
    if operand.needs_parens(parent, right_side) {
        write!(f, "({})", operand)
    } else {
        write!(f, "{}", operand)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind.deref() {
            Binary(lhs, op, rhs) => {
                write_operand(f, lhs, op, false)?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, rhs, op, true)
            }
            Not(inner) => match inner.kind() {
                Binary(..) => write!(f, "¬({})", inner),
                _ => write!(f, "¬{}", inner),
            },
            ExprKind::Quantifier(quantifier, bound, body) => {
                write!(f, "{}{}({})", quantifier.symbol(), bound, body)
            }
            Call(fun, args) => write!(f, "{}({})", fun, args.iter().join(", ")),
            Variable(name) => write!(f, "{}", name),
            Tuple(elements) => write!(f, "[{}]", elements.iter().join(", ")),
            SetEnum(elements) => write!(f, "{{{}}}", elements.iter().join(", ")),
            SetBuilder(bound, predicate) => write!(f, "{{{} : {}}}", bound, predicate),
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Expr, BinOp};

    fn p(x: &str) -> Expr {
        Expr::call("P", vec![Expr::variable(x)])
    }

    #[test]
    fn display_0() {
        let expr = Expr::forall("x", Expr::implies(p("x"), Expr::call("Q", vec![Expr::variable("x")])));
        assert_eq!(expr.to_string(), "∀x(P(x) ⇒ Q(x))");
    }
    #[test]
    fn display_1() {
        // left associative chains need no parentheses, right nested ones do
        let a = Expr::variable("a");
        let b = Expr::variable("b");
        let c = Expr::variable("c");
        let left = Expr::binary(Expr::binary(a.clone(), BinOp::Minus, b.clone()), BinOp::Minus, c.clone());
        let right = Expr::binary(a.clone(), BinOp::Minus, Expr::binary(b.clone(), BinOp::Minus, c.clone()));
        assert_eq!(left.to_string(), "a - b - c");
        assert_eq!(right.to_string(), "a - (b - c)");
        let mixed = Expr::equals(Expr::binary(a, BinOp::Plus, b), c).negate();
        assert_eq!(mixed.to_string(), "¬(a + b = c)");
    }
    #[test]
    fn display_2() {
        let set = Expr::set_builder("x", Expr::binary(Expr::variable("x"), BinOp::ElementOf, Expr::variable("A")));
        let list = Expr::tuple(vec![Expr::variable("a"), Expr::set_enum(vec![Expr::variable("b")])]);
        assert_eq!(set.to_string(), "{x : x ∈ A}");
        assert_eq!(list.to_string(), "[a, {b}]");
    }
    #[test]
    fn occurs_free_0() {
        let expr = Expr::and(Expr::forall("x", p("x")), p("y"));
        assert!(!expr.occurs_free("x"));
        assert!(expr.occurs_free("y"));
        assert!(expr.occurs_free("P"));
    }
    #[test]
    fn object_names_0() {
        let expr = Expr::equals(Expr::call("f", vec![Expr::variable("a")]), Expr::variable("b"));
        let names = expr.object_names().into_iter().collect::<Vec<_>>();
        assert_eq!(names, vec!["f", "a", "b"]);
    }
    #[test]
    fn bound_names_0() {
        let expr = Expr::forall("x", Expr::and(
            Expr::call("P", vec![Expr::variable("x")]),
            Expr::set_builder("y", Expr::call("Q", vec![Expr::variable("y"), Expr::variable("a")])),
        ));
        let names = expr.bound_names().into_iter().collect::<Vec<_>>();
        assert_eq!(names, vec!["x", "y"]);
    }
}
