use crate::ast::{BinOp, Expr, ExprKind, OperatorClass, Quantifier};
use crate::error::VerifyError;
use crate::verifier::{Truth, Verifier};

const IMPLIES: &'static str = "Implies";
const AND: &'static str = "And";

impl Verifier {
    /// Three valued evaluation of a statement against the facts in scope.
    /// `recursion` enables indirect matching through the connectives of stored facts
    pub(crate) fn analyse(&mut self, expr: &Expr, recursion: bool) -> Result<Truth, VerifyError> {
        if self.is_proven(expr, recursion)? {
            return Ok(Truth::True);
        }
        // negations already look for their operand among the facts
        if !matches!(expr.kind(), ExprKind::Not(_)) && self.is_proven(&expr.clone().negate(), recursion)? {
            return Ok(Truth::False);
        }
        let truth = match expr.kind() {
            ExprKind::Binary(lhs, op, rhs) => self.analyse_binary(expr, lhs, op, rhs, recursion)?,
            ExprKind::Not(inner) => self.analyse(inner, recursion)?.negate(),
            ExprKind::Quantifier(Quantifier::ForAll, _, body) => self.analyse(body, recursion)?,
            ExprKind::Quantifier(Quantifier::Exists, bound, body) => {
                // ∃x(P) is ¬∀x(¬P)
                let dual = Expr::forall(bound.clone(), body.clone().negate()).negate();
                self.analyse(&dual, recursion)?
            }
            ExprKind::Call(..) | ExprKind::Variable(_) => Truth::Unknown,
            ExprKind::Tuple(_) | ExprKind::SetEnum(_) | ExprKind::SetBuilder(..) => {
                return internal_error!("`{}` is an object, not a statement", expr);
            }
        };
        trace!("{} evaluates to {:?}", expr, truth);
        Ok(truth)
    }

    fn analyse_binary(&mut self, expr: &Expr, lhs: &Expr, op: &BinOp, rhs: &Expr, recursion: bool) -> Result<Truth, VerifyError> {
        if op.class() == OperatorClass::Arithmetic {
            return internal_error!("`{}` is an object, not a statement", expr);
        }
        let truth = match op {
            BinOp::Implies => {
                let antecedent = self.analyse(lhs, recursion)?;
                self.facts.enter(IMPLIES);
                self.facts.add(lhs.clone());
                let consequent = self.analyse(rhs, recursion);
                self.facts.exit(IMPLIES)?;
                match (antecedent, consequent?) {
                    (Truth::False, _) | (_, Truth::True) => Truth::True,
                    (Truth::True, Truth::False) => Truth::False,
                    _ => Truth::Unknown,
                }
            }
            BinOp::Iff => {
                match (self.analyse(lhs, recursion)?, self.analyse(rhs, recursion)?) {
                    (Truth::Unknown, _) | (_, Truth::Unknown) => Truth::Unknown,
                    (l, r) if l == r => Truth::True,
                    _ => Truth::False,
                }
            }
            BinOp::Or => {
                match (self.analyse(lhs, recursion)?, self.analyse(rhs, recursion)?) {
                    (Truth::True, _) | (_, Truth::True) => Truth::True,
                    (Truth::False, Truth::False) => Truth::False,
                    _ => Truth::Unknown,
                }
            }
            BinOp::And => self.analyse_conjunction(lhs, rhs, recursion)?,
            BinOp::Equals => {
                if self.compare(lhs, rhs, true) || self.equal_by_chain(lhs, rhs, 0) {
                    Truth::True
                } else {
                    Truth::Unknown
                }
            }
            _ => Truth::Unknown,
        };
        Ok(truth)
    }

    fn analyse_conjunction(&mut self, lhs: &Expr, rhs: &Expr, recursion: bool) -> Result<Truth, VerifyError> {
        let left = self.analyse(lhs, recursion)?;
        let right = self.analyse(rhs, recursion)?;
        let truth = match (left, right) {
            (Truth::False, _) | (_, Truth::False) => Truth::False,
            (Truth::True, Truth::True) => Truth::True,
            _ if self.refuting => Truth::Unknown,
            _ => {
                if self.refuted_assuming(lhs, rhs, recursion)? || self.refuted_assuming(rhs, lhs, recursion)? {
                    Truth::False
                } else {
                    Truth::Unknown
                }
            }
        };
        Ok(truth)
    }

    /// Does `claim` evaluate to FALSE once `assumption` is taken as a fact?
    /// Conjunctions inside `claim` are only judged by their sides, which keeps this quadratic
    fn refuted_assuming(&mut self, assumption: &Expr, claim: &Expr, recursion: bool) -> Result<bool, VerifyError> {
        self.facts.enter(AND);
        self.facts.add(assumption.clone());
        let refuting = std::mem::replace(&mut self.refuting, true);
        let truth = self.analyse(claim, recursion);
        self.refuting = refuting;
        self.facts.exit(AND)?;
        Ok(truth? == Truth::False)
    }

    /// Is some fact in scope enough to establish `goal` on its own?
    fn is_proven(&mut self, goal: &Expr, recursion: bool) -> Result<bool, VerifyError> {
        // the fact store may grow and shrink while a fact is being tried, so walk it by index
        let mut cursor = self.facts.cursor();
        while let Some(fact) = self.facts.advance(&mut cursor) {
            if self.proves(&fact, goal, recursion)? {
                trace!("{} proves {}", fact, goal);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn proves(&mut self, fact: &Expr, goal: &Expr, recursion: bool) -> Result<bool, VerifyError> {
        if self.compare(fact, goal, true) || self.matches_quantified(fact, goal) {
            return Ok(true);
        }
        if !recursion {
            return Ok(false);
        }
        // side conditions are evaluated without indirect matching, which keeps this finite
        let proven = match fact.kind() {
            ExprKind::Binary(l, BinOp::Implies, r) => {
                self.proves(r, goal, true)? && self.analyse(l, false)? == Truth::True
            }
            ExprKind::Binary(l, BinOp::And, r) => {
                self.proves(l, goal, true)? || self.proves(r, goal, true)?
            }
            ExprKind::Binary(l, BinOp::Or, r) => {
                (self.proves(r, goal, true)? && self.analyse(l, false)? == Truth::False)
                    || (self.proves(l, goal, true)? && self.analyse(r, false)? == Truth::False)
            }
            ExprKind::Binary(l, BinOp::Iff, r) => {
                (self.proves(r, goal, true)? && self.analyse(l, false)? == Truth::True)
                    || (self.proves(l, goal, true)? && self.analyse(r, false)? == Truth::True)
            }
            _ => false,
        };
        Ok(proven)
    }

    /// Single step quantifier matching between one fact and a goal
    fn matches_quantified(&self, fact: &Expr, goal: &Expr) -> bool {
        if let ExprKind::Quantifier(Quantifier::ForAll, bound, body) = fact.kind() {
            // instantiate with every name the goal mentions
            if goal.object_names().iter().any(|name| self.compare(&body.rename(bound, name), goal, true)) {
                return true;
            }
            if self.compare_with_witness(body, goal, bound) {
                return true;
            }
            // ∀x(P) also gives ∃x(P)
            if let ExprKind::Quantifier(Quantifier::Exists, _, _) = goal.kind() {
                if self.compare(&Expr::exists(bound.clone(), body.clone()), goal, true) {
                    return true;
                }
            }
        }
        if let ExprKind::Quantifier(Quantifier::Exists, bound, body) = goal.kind() {
            if self.compare_with_witness(body, fact, bound) {
                return true;
            }
        }
        false
    }

    /// Equality through chains of `=` facts, at most `equality_depth` links deep
    pub(crate) fn equal_by_chain(&self, a: &Expr, b: &Expr, depth: usize) -> bool {
        if self.equal_by_structure(a, b, depth) {
            return true;
        }
        if depth > self.config.equality_depth {
            return false;
        }
        self.facts.iter().any(|fact| match fact.kind() {
            ExprKind::Binary(l, BinOp::Equals, r) => {
                (self.equal_by_chain(l, a, depth + 1) && self.equal_by_chain(r, b, depth + 1))
                    || (self.equal_by_chain(l, b, depth + 1) && self.equal_by_chain(r, a, depth + 1))
            }
            _ => false,
        })
    }

    fn equal_by_structure(&self, a: &Expr, b: &Expr, depth: usize) -> bool {
        match (a.kind(), b.kind()) {
            (ExprKind::Variable(x), ExprKind::Variable(y)) => x == y,
            (ExprKind::Binary(la, op_a, ra), ExprKind::Binary(lb, op_b, rb)) => {
                op_a == op_b && self.equal_by_chain(la, lb, depth) && self.equal_by_chain(ra, rb, depth)
            }
            (ExprKind::Not(x), ExprKind::Not(y)) => self.equal_by_chain(x, y, depth),
            (ExprKind::Call(fa, args_a), ExprKind::Call(fb, args_b)) => fa == fb && self.equal_all(args_a, args_b, depth),
            (ExprKind::Tuple(xs), ExprKind::Tuple(ys)) | (ExprKind::SetEnum(xs), ExprKind::SetEnum(ys)) => self.equal_all(xs, ys, depth),
            // binders only match up to renaming
            _ => self.compare(a, b, false),
        }
    }

    fn equal_all(&self, xs: &[Expr], ys: &[Expr], depth: usize) -> bool {
        xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| self.equal_by_chain(x, y, depth))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{parse_expression, Expr};
    use crate::config::Config;
    use crate::verifier::{Truth, Verifier};
    use std::time::{Duration, Instant};

    fn expr(source: &str) -> Expr {
        parse_expression(source).expect("should parse")
    }
    fn verifier_with(facts: &[&str]) -> Verifier {
        let mut verifier = Verifier::new(Config::default());
        for fact in facts {
            verifier.assume(expr(fact));
        }
        verifier
    }
    fn truth_of(verifier: &mut Verifier, source: &str) -> Truth {
        verifier.analyse_statement(&expr(source)).expect("should not error")
    }

    #[test]
    fn analyse_contradiction_0() {
        let mut verifier = verifier_with(&[]);
        assert_eq!(truth_of(&mut verifier, "P ∧ ¬P"), Truth::False);
        assert_eq!(truth_of(&mut verifier, "¬(P ∧ ¬P)"), Truth::True);
    }
    #[test]
    fn analyse_tautology_0() {
        let mut verifier = verifier_with(&[]);
        assert_eq!(truth_of(&mut verifier, "P ⇒ P"), Truth::True);
        assert_eq!(truth_of(&mut verifier, "∃x(x = x)"), Truth::True);
        assert_eq!(truth_of(&mut verifier, "Q"), Truth::Unknown);
    }
    #[test]
    fn analyse_connectives_0() {
        let mut verifier = verifier_with(&["A", "¬B"]);
        assert_eq!(truth_of(&mut verifier, "A ∨ C"), Truth::True);
        assert_eq!(truth_of(&mut verifier, "B ∨ ¬A"), Truth::False);
        assert_eq!(truth_of(&mut verifier, "A ⇒ B"), Truth::False);
        assert_eq!(truth_of(&mut verifier, "B ⇒ C"), Truth::True);
        assert_eq!(truth_of(&mut verifier, "A ⇔ ¬B"), Truth::True);
        assert_eq!(truth_of(&mut verifier, "A ⇔ C"), Truth::Unknown);
    }
    #[test]
    fn analyse_modus_ponens_0() {
        let mut verifier = verifier_with(&["P(a)", "P(a) ⇒ Q(a)"]);
        assert_eq!(truth_of(&mut verifier, "Q(a)"), Truth::True);
        assert_eq!(truth_of(&mut verifier, "Q(b)"), Truth::Unknown);
    }
    #[test]
    fn analyse_disjunction_0() {
        let mut verifier = verifier_with(&["P ∨ Q", "¬P"]);
        assert_eq!(truth_of(&mut verifier, "Q"), Truth::True);
    }
    #[test]
    fn analyse_forall_0() {
        let mut verifier = verifier_with(&["∀x(P(x) ⇒ Q(x))"]);
        assert_eq!(truth_of(&mut verifier, "P(c) ⇒ Q(c)"), Truth::True);
        assert_eq!(truth_of(&mut verifier, "∃y(P(y) ⇒ Q(y))"), Truth::True);
    }
    #[test]
    fn analyse_exists_0() {
        let mut verifier = verifier_with(&["R(c, d) ∧ S(d)"]);
        assert_eq!(truth_of(&mut verifier, "∃x(R(c, x) ∧ S(x))"), Truth::True);
        assert_eq!(truth_of(&mut verifier, "∃x(R(x, x) ∧ S(x))"), Truth::Unknown);
    }
    #[test]
    fn analyse_exists_1() {
        // the only candidate witness is the variable bound by the fact's own ∀y
        let mut verifier = verifier_with(&["∀y(R(y, y))"]);
        assert_eq!(truth_of(&mut verifier, "∃x(∀y(R(x, y)))"), Truth::Unknown);
        let mut verifier = verifier_with(&["∀y(R(c, y))"]);
        assert_eq!(truth_of(&mut verifier, "∃x(∀y(R(x, y)))"), Truth::True);
    }
    #[test]
    fn analyse_forall_1() {
        // every x has its own y, which is no reason for any y to be related to itself
        let mut verifier = verifier_with(&["∀x(∃y(R(x, y)))"]);
        assert_eq!(truth_of(&mut verifier, "∃y(R(y, y))"), Truth::Unknown);
        assert_eq!(truth_of(&mut verifier, "∃y(R(c, y))"), Truth::True);
    }
    #[test]
    fn analyse_negated_fact_0() {
        // a proven negation refutes even an equality, which is otherwise never FALSE
        let mut verifier = verifier_with(&["¬(a = b)", "¬P(c)"]);
        assert_eq!(truth_of(&mut verifier, "a = b"), Truth::False);
        assert_eq!(truth_of(&mut verifier, "P(c)"), Truth::False);
        assert_eq!(truth_of(&mut verifier, "a = c"), Truth::Unknown);
        assert_eq!(truth_of(&mut verifier, "P(d)"), Truth::Unknown);
    }
    #[test]
    fn analyse_long_conjunction_0() {
        let atoms = (0..24).map(|i| format!("A{}", i)).collect::<Vec<_>>();
        let conjunction = atoms.join(" ∧ ");
        let implications = (0..20).map(|i| format!("B{} ⇒ C{}", i, i)).collect::<Vec<_>>();
        let facts = implications.iter().map(|fact| fact.as_str()).collect::<Vec<_>>();
        let mut verifier = verifier_with(&facts);
        let start = Instant::now();
        assert_eq!(truth_of(&mut verifier, &conjunction), Truth::Unknown);
        let refuted = format!("{} ∧ ¬A3", conjunction);
        assert_eq!(truth_of(&mut verifier, &refuted), Truth::False);
        assert!(start.elapsed() < Duration::from_secs(5), "took {:?}", start.elapsed());
        assert_eq!(verifier.facts().len(), 20);
    }
    #[test]
    fn analyse_equality_0() {
        let mut verifier = verifier_with(&["a = b", "b = c"]);
        assert_eq!(truth_of(&mut verifier, "a = c"), Truth::True);
        assert_eq!(truth_of(&mut verifier, "f(a) = f(c)"), Truth::True);
        // equality is never refuted
        assert_eq!(truth_of(&mut verifier, "a = d"), Truth::Unknown);
    }
    #[test]
    fn analyse_equality_1() {
        let mut config = Config::default();
        config.equality_depth = 0;
        let mut verifier = Verifier::new(config);
        for fact in &["a = b", "b = c", "c = d", "d = e"] {
            verifier.assume(expr(fact));
        }
        assert_eq!(truth_of(&mut verifier, "a = e"), Truth::Unknown);
        let mut verifier = verifier_with(&["a = b", "b = c", "c = d"]);
        assert_eq!(truth_of(&mut verifier, "a = d"), Truth::True);
    }
    #[test]
    fn analyse_object_0() {
        let mut verifier = verifier_with(&[]);
        let _ = verifier.analyse_statement(&expr("a + b")).expect_err("arithmetic is not a statement");
        let _ = verifier.analyse_statement(&expr("[a, b]")).expect_err("a tuple is not a statement");
    }
    #[test]
    fn analyse_scopes_restored_0() {
        let mut verifier = verifier_with(&["A"]);
        assert_eq!(truth_of(&mut verifier, "(B ⇒ C) ∧ (C ∧ ¬C)"), Truth::False);
        assert_eq!(verifier.facts().len(), 1);
        assert_eq!(verifier.facts().depth(), 1);
    }
}
