mod expr;
pub use expr::*;

mod program;
pub use program::*;

mod parse;
pub use parse::{parse, parse_expression, Rule};

mod symbols;
pub use symbols::{resolve, SymbolTable};
