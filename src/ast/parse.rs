use pest::Parser;
use pest::iterators::{Pair, Pairs};
use pest::error::Error;

use pest_derive::*;
use std::iter::Peekable;

use crate::ast::*;

#[derive(Parser)]
#[grammar = "../grammar.pest"]
struct Grammar;

/// Parse a whole proof script
pub fn parse(source: &str) -> Result<Program, Error<Rule>> {
    let program = Grammar::parse(Rule::program, source)?
        .next()
        .expect("a successful parse always yields the program rule");
    let mut declarations = vec![];
    for pair in program.into_inner() {
        match pair.as_rule() {
            Rule::theorem => declarations.push(Declaration::Theorem(parse_theorem(pair))),
            Rule::definition => declarations.push(Declaration::Definition(parse_definition(pair))),
            Rule::EOI => break,
            other => unreachable!("`{:?}` is not a declaration", other),
        }
    }
    Ok(Program { declarations })
}

/// Parse a single expression, like `∀x(P(x) ⇒ Q(x))`
pub fn parse_expression(source: &str) -> Result<Expr, Error<Rule>> {
    let pair = Grammar::parse(Rule::expr_source, source)?
        .next()
        .and_then(|source| source.into_inner().next())
        .expect("a successful parse always yields an expression");
    Ok(parse_expr(pair))
}

fn line_of(pair: &Pair<Rule>) -> usize {
    pair.as_span().start_pos().line_col().0
}

fn ident(pair: Option<Pair<Rule>>) -> String {
    pair.expect("grammar requires an identifier here").as_str().to_string()
}

fn parse_theorem(pair: Pair<Rule>) -> Theorem {
    let line = line_of(&pair);
    let mut inner = pair.into_inner();
    let name = ident(inner.next());
    let parameters = inner.next()
        .expect("theorems always have a parameter list")
        .into_inner()
        .map(|p| p.as_str().to_string())
        .collect();
    let mut requirements = vec![];
    let mut hypothesis = None;
    let mut proof = Block::default();
    for pair in inner {
        match pair.as_rule() {
            Rule::requirement => requirements.push(parse_expr_line(pair)),
            Rule::hypothesis => hypothesis = Some(parse_expr_line(pair)),
            Rule::block => proof = parse_block(pair),
            other => unreachable!("`{:?}` does not belong in a theorem", other),
        }
    }
    Theorem {
        name,
        line,
        parameters,
        requirements,
        hypothesis: hypothesis.expect("grammar requires a hypothesis"),
        proof,
    }
}

fn parse_definition(pair: Pair<Rule>) -> Definition {
    let line = line_of(&pair);
    let mut inner = pair.into_inner();
    let name = ident(inner.next());
    let mut rules = vec![];
    let mut proof = Block::default();
    for pair in inner {
        match pair.as_rule() {
            Rule::definition_rule => rules.push(parse_expr_line(pair)),
            Rule::block => proof = parse_block(pair),
            other => unreachable!("`{:?}` does not belong in a definition", other),
        }
    }
    Definition { name, line, rules, proof }
}

/// Requirements, hypotheses and rules all wrap a single expression
fn parse_expr_line(pair: Pair<Rule>) -> ExprLine {
    let line = line_of(&pair);
    let expr = parse_expr(pair.into_inner().next().expect("wraps an expression"));
    ExprLine { expr, line }
}

fn parse_block(pair: Pair<Rule>) -> Block {
    let steps = pair.into_inner().map(parse_step).collect();
    Block { steps }
}

fn parse_step(pair: Pair<Rule>) -> Step {
    let line = line_of(&pair);
    let step_rule = pair.as_rule();
    let mut inner = pair.into_inner();
    let kind = match step_rule {
        Rule::sorry_step => StepKind::Sorry,
        Rule::check_step => StepKind::Check,
        Rule::conditional => {
            let condition = ExprLine {
                expr: parse_expr(inner.next().expect("conditions are required")),
                line,
            };
            let mut blocks = inner.by_ref().take(3).map(parse_block);
            let (if_block, else_block, both_block) = match (blocks.next(), blocks.next(), blocks.next()) {
                (Some(a), Some(b), Some(c)) => (a, b, c),
                _ => unreachable!("conditionals always have three blocks"),
            };
            StepKind::Conditional(Conditional { condition, if_block, else_block, both_block })
        }
        Rule::let_step => {
            let name = ident(inner.next());
            let expr = parse_expr(inner.next().expect("let statements have a condition"));
            StepKind::Let(name, expr)
        }
        Rule::claim => StepKind::Claim(parse_expr(inner.next().expect("claims have an expression"))),
        other => unreachable!("`{:?}` is not a proof step", other),
    };
    let justification = inner.next().map(parse_justification);
    Step { line, kind, justification }
}

fn parse_justification(pair: Pair<Rule>) -> Justification {
    match pair.as_rule() {
        Rule::admitted => Justification::Sorry,
        Rule::definition_ref => Justification::Definition(ident(pair.into_inner().next())),
        Rule::theorem_ref => {
            let mut inner = pair.into_inner();
            let name = ident(inner.next());
            let args = inner.next()
                .map(|args| args.into_inner().map(parse_expr).collect())
                .unwrap_or_default();
            Justification::Theorem(TheoremRef { name, args })
        }
        other => unreachable!("`{:?}` is not a justification", other),
    }
}

fn parse_expr(pair: Pair<Rule>) -> Expr {
    // pest hands us a flat `term (op term)*` list,
    // all we have to do is deal with operator precedence
    let mut pairs = pair.into_inner().peekable();
    climb(&mut pairs, 0)
}

/// Precedence climbing, every operator is left associative
fn climb(pairs: &mut Peekable<Pairs<Rule>>, min_precedence: u32) -> Expr {
    let mut lhs = parse_term(pairs.next().expect("expressions start with a term"));
    while let Some(op) = pairs.peek().map(binary_operator) {
        if op.precedence() < min_precedence {
            break;
        }
        pairs.next();
        let rhs = climb(pairs, op.precedence() + 1);
        lhs = Expr::binary(lhs, op, rhs);
    }
    lhs
}

fn binary_operator(pair: &Pair<Rule>) -> BinOp {
    match pair.as_rule() {
        Rule::iff => BinOp::Iff,
        Rule::implies => BinOp::Implies,
        Rule::or => BinOp::Or,
        Rule::and => BinOp::And,
        Rule::equals => BinOp::Equals,
        Rule::element_of => BinOp::ElementOf,
        Rule::subset => BinOp::Subset,
        Rule::plus => BinOp::Plus,
        Rule::minus => BinOp::Minus,
        Rule::times => BinOp::Times,
        Rule::divide => BinOp::Divide,
        Rule::named_op => BinOp::Named(pair.as_str().trim().to_string()),
        other => unreachable!("terms and operators alternate, found `{:?}` in operator position", other),
    }
}

fn parse_term(pair: Pair<Rule>) -> Expr {
    match pair.as_rule() {
        Rule::quantifier => {
            let mut inner = pair.into_inner();
            let quantifier = match inner.next().map(|q| q.as_rule()) {
                Some(Rule::forall) => Quantifier::ForAll,
                Some(Rule::exists) => Quantifier::Exists,
                other => unreachable!("`{:?}` is not a quantifier", other),
            };
            let bound = ident(inner.next());
            let body = parse_expr(inner.next().expect("quantifiers have a body"));
            Expr::quantified(quantifier, bound, body)
        }
        Rule::negation => {
            let inner = pair.into_inner().next().expect("negation of a term");
            parse_term(inner).negate()
        }
        Rule::call => {
            let mut inner = pair.into_inner();
            let name = ident(inner.next());
            Expr::call(name, inner.map(parse_expr).collect())
        }
        Rule::tuple => Expr::tuple(pair.into_inner().map(parse_expr).collect()),
        Rule::set_enum => Expr::set_enum(pair.into_inner().map(parse_expr).collect()),
        Rule::set_builder => {
            let mut inner = pair.into_inner();
            let bound = ident(inner.next());
            Expr::set_builder(bound, parse_expr(inner.next().expect("set builders have a predicate")))
        }
        Rule::number | Rule::variable => Expr::variable(pair.as_str().trim()),
        // a parenthesized expression
        Rule::expr => parse_expr(pair),
        other => unreachable!("`{:?}` is not a term", other),
    }
}
