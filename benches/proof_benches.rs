use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use fol_verifier::ast::parse_expression;
use fol_verifier::{verify_source, Config, Verifier};

const SCRIPT: &'static str = "\
theorem Ind(P):
P(0)
∀n(P(n) ⇒ P(n + 1))
⇒ ∀n(P(n))
{
    sorry
}
theorem AllZero(f):
f(0) = 0
∀n(f(n) = 0 ⇒ f(n + 1) = 0)
⇒ ∀n(f(n) = 0)
{
    ∀n(f(n) = 0) | Ind(f(_0) = 0)
}
theorem Cases(P, Q):
P ⇒ Q
¬P ⇒ Q
⇒ Q
{
    if (P)
    {
        Q
    }
    else
    {
        Q
    }
    both
    {
        Q
    }
}
";

pub fn bench_scripts(c: &mut Criterion) {
    let config = Config::default();
    c.bench_function("verify script", |b| b.iter(|| verify_source(black_box(SCRIPT), &config)));
}

pub fn bench_equality(c: &mut Criterion) {
    let mut group = c.benchmark_group("Equality chains");
    for length in [2usize, 3, 4].iter() {
        let mut config = Config::default();
        config.equality_depth = *length;
        let mut verifier = Verifier::new(config);
        for i in 0..*length {
            let fact = format!("a{} = a{}", i, i + 1);
            verifier.assume(parse_expression(&fact).expect("should parse"));
        }
        let goal = parse_expression(&format!("a0 = a{}", length)).expect("should parse");
        group.bench_with_input(BenchmarkId::new("analyse", length), &goal,
            |b, goal| {
                b.iter(|| verifier.analyse_statement(goal))
            });
    }
    group.finish();
}

criterion_group!(benches, bench_scripts, bench_equality);
criterion_main!(benches);
