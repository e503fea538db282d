use crate::ast::{BinOp, Expr, ExprKind};
use crate::verifier::Verifier;

/// Gets first say on every pair of nodes; returning `true` accepts the pair as equal
pub(crate) type CompareHook<'h> = dyn FnMut(&Expr, &Expr) -> bool + 'h;

impl Verifier {
    /// Are the two expressions the same, up to the names of bound variables?
    /// With `use_facts`, any two sides of a known `=` or `⇔` fact are also interchangeable
    pub fn compare(&self, a: &Expr, b: &Expr, use_facts: bool) -> bool {
        self.compare_with(a, b, use_facts, None)
    }

    pub(crate) fn compare_with(&self, a: &Expr, b: &Expr, use_facts: bool, mut hook: Option<&mut CompareHook<'_>>) -> bool {
        if use_facts && self.interchangeable(a, b) {
            return true;
        }
        if let Some(hook) = hook.as_deref_mut() {
            if hook(a, b) {
                return true;
            }
        }
        match (a.kind(), b.kind()) {
            (ExprKind::Binary(la, op_a, ra), ExprKind::Binary(lb, op_b, rb)) => {
                op_a == op_b
                    && self.compare_with(la, lb, use_facts, hook.as_deref_mut())
                    && self.compare_with(ra, rb, use_facts, hook.as_deref_mut())
            }
            (ExprKind::Not(x), ExprKind::Not(y)) => self.compare_with(x, y, use_facts, hook),
            (ExprKind::Quantifier(qa, xa, pa), ExprKind::Quantifier(qb, xb, pb)) => {
                qa == qb && self.compare_bound(xa, pa, xb, pb, use_facts, hook)
            }
            (ExprKind::SetBuilder(xa, pa), ExprKind::SetBuilder(xb, pb)) => {
                self.compare_bound(xa, pa, xb, pb, use_facts, hook)
            }
            (ExprKind::Call(fa, args_a), ExprKind::Call(fb, args_b)) => {
                fa == fb && self.compare_all(args_a, args_b, use_facts, hook)
            }
            (ExprKind::Variable(x), ExprKind::Variable(y)) => x == y,
            (ExprKind::Tuple(xs), ExprKind::Tuple(ys)) | (ExprKind::SetEnum(xs), ExprKind::SetEnum(ys)) => {
                self.compare_all(xs, ys, use_facts, hook)
            }
            _ => false,
        }
    }

    fn compare_all(&self, xs: &[Expr], ys: &[Expr], use_facts: bool, mut hook: Option<&mut CompareHook<'_>>) -> bool {
        xs.len() == ys.len()
            && xs.iter().zip(ys).all(|(x, y)| self.compare_with(x, y, use_facts, hook.as_deref_mut()))
    }

    /// Alpha equivalence: rename `b`'s bound name to `a`'s, unless that would capture a free name of `b`
    fn compare_bound(&self, xa: &str, pa: &Expr, xb: &str, pb: &Expr, use_facts: bool, hook: Option<&mut CompareHook<'_>>) -> bool {
        if xa == xb {
            return self.compare_with(pa, pb, use_facts, hook);
        }
        if pb.occurs_free(xa) {
            return false;
        }
        let renamed = pb.rename(xb, xa);
        self.compare_with(pa, &renamed, use_facts, hook)
    }

    /// Is there a known fact `l = r` or `l ⇔ r` with `{l, r}` matching `{a, b}`?
    /// The sides themselves are compared structurally, so this never recurses into the facts again
    fn interchangeable(&self, a: &Expr, b: &Expr) -> bool {
        self.facts.iter().any(|fact| match fact.kind() {
            ExprKind::Binary(l, BinOp::Equals, r) | ExprKind::Binary(l, BinOp::Iff, r) => {
                (self.compare(l, a, false) && self.compare(r, b, false))
                    || (self.compare(l, b, false) && self.compare(r, a, false))
            }
            _ => false,
        })
    }

    /// Compare `pattern` against `target`, where the free name `placeholder` in the pattern
    /// may stand for any single expression, as long as it is the same one everywhere.
    /// A witness may not mention a variable bound above the place it is found
    pub fn compare_with_witness(&self, pattern: &Expr, target: &Expr, placeholder: &str) -> bool {
        // give the placeholder a name the target does not use, so only the hook can match it
        let mut slot = format!("_{}", placeholder);
        while target.occurs_free(&slot) || pattern.occurs_free(&slot) {
            slot.insert(0, '_');
        }
        let pattern = pattern.rename(placeholder, &slot);
        // binders of the target are renamed to these while their bodies are compared
        let binders = pattern.bound_names();
        let mut witness: Option<Expr> = None;
        let mut bind = |p: &Expr, t: &Expr| -> bool {
            match p.kind() {
                ExprKind::Variable(name) if *name == slot => match &witness {
                    _ if binders.iter().any(|bound| t.occurs_free(bound)) => {
                        trace!("{} would let a bound variable escape", t);
                        false
                    }
                    Some(bound) => self.compare(bound, t, false),
                    None => {
                        trace!("witness for {} is {}", placeholder, t);
                        witness = Some(t.clone());
                        true
                    }
                },
                _ => false,
            }
        };
        let hook: &mut CompareHook<'_> = &mut bind;
        self.compare_with(&pattern, target, false, Some(hook))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{parse_expression, Expr};
    use crate::config::Config;
    use crate::verifier::Verifier;

    fn expr(source: &str) -> Expr {
        parse_expression(source).expect("should parse")
    }

    #[test]
    fn compare_0() {
        let verifier = Verifier::new(Config::default());
        assert!(verifier.compare(&expr("P(a) ∧ Q(b)"), &expr("P(a) ∧ Q(b)"), true));
        assert!(!verifier.compare(&expr("P(a) ∧ Q(b)"), &expr("Q(b) ∧ P(a)"), true));
        assert!(!verifier.compare(&expr("P(a)"), &expr("P(a, a)"), true));
    }
    #[test]
    fn compare_alpha_0() {
        let verifier = Verifier::new(Config::default());
        assert!(verifier.compare(&expr("∀x(P(x))"), &expr("∀y(P(y))"), false));
        assert!(verifier.compare(&expr("{x : x ∈ A}"), &expr("{z : z ∈ A}"), false));
        assert!(!verifier.compare(&expr("∀x(P(x))"), &expr("∃y(P(y))"), false));
    }
    #[test]
    fn compare_alpha_1() {
        // renaming y to x in the second would capture its free x
        let verifier = Verifier::new(Config::default());
        assert!(!verifier.compare(&expr("∀x(R(x, x))"), &expr("∀y(R(y, x))"), false));
    }
    #[test]
    fn compare_facts_0() {
        let mut verifier = Verifier::new(Config::default());
        verifier.assume(expr("f(a) = b"));
        assert!(verifier.compare(&expr("P(f(a))"), &expr("P(b)"), true));
        assert!(verifier.compare(&expr("P(b)"), &expr("P(f(a))"), true));
        assert!(!verifier.compare(&expr("P(b)"), &expr("P(f(a))"), false));
    }
    #[test]
    fn compare_facts_1() {
        let mut verifier = Verifier::new(Config::default());
        verifier.assume(expr("A ⇔ B"));
        assert!(verifier.compare(&expr("A ∧ C"), &expr("B ∧ C"), true));
    }
    #[test]
    fn witness_0() {
        let verifier = Verifier::new(Config::default());
        assert!(verifier.compare_with_witness(&expr("P(x) ∧ Q(x)"), &expr("P(f(c)) ∧ Q(f(c))"), "x"));
        assert!(!verifier.compare_with_witness(&expr("P(x) ∧ Q(x)"), &expr("P(c) ∧ Q(d)"), "x"));
        assert!(!verifier.compare_with_witness(&expr("P(x, y)"), &expr("P(c, d)"), "x"));
    }
    #[test]
    fn witness_bound_0() {
        let verifier = Verifier::new(Config::default());
        // `y` is bound in the target, so it cannot stand for `x`
        assert!(!verifier.compare_with_witness(&expr("∀y(R(x, y))"), &expr("∀y(R(y, y))"), "x"));
        assert!(!verifier.compare_with_witness(&expr("∃y(R(x, y))"), &expr("∃z(R(z, z))"), "x"));
        assert!(!verifier.compare_with_witness(&expr("∀y(R(x, y))"), &expr("∀y(R(f(y), y))"), "x"));
        assert!(verifier.compare_with_witness(&expr("∀y(R(x, y))"), &expr("∀z(R(f(c), z))"), "x"));
    }
    #[test]
    fn witness_shadowed_0() {
        // the inner ∀x binds its own x, which is not the placeholder
        let verifier = Verifier::new(Config::default());
        assert!(!verifier.compare_with_witness(&expr("P(x) ∧ ∀x(Q(x)) ∧ S(x)"), &expr("P(x) ∧ ∀x(Q(x)) ∧ S(c)"), "x"));
        assert!(verifier.compare_with_witness(&expr("P(x) ∧ ∀x(Q(x))"), &expr("P(c) ∧ ∀y(Q(y))"), "x"));
    }
}
