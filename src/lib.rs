#[macro_use]
mod error;
mod config;
mod scope;
pub mod ast;
pub mod verifier;

#[macro_use] extern crate log;

pub use config::Config;
pub use error::{BoxedErrorTrait, InternalError, VerifyError};
pub use scope::{Cursor, ScopeStack};
pub use verifier::{Report, Status, Truth, Verifier};

/// Parse, resolve and verify a whole proof script
pub fn verify_source(source: &str, config: &Config) -> Result<Report, BoxedErrorTrait> {
    info!("parsing");
    let program = ast::parse(source)?;
    info!("resolving names in {} declarations", program.declarations.len());
    ast::resolve(&program, config)?;
    info!("verifying");
    let report = Verifier::new(config.clone()).verify(&program)?;
    Ok(report)
}
