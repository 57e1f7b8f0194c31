//! # BASIC
//!
//! Line-numbered BASIC as it was in 1978, compiled to bytecode and run
//! on a cooperative virtual machine.
//!
//! Source goes through four stages before it can run:
//! ```text
//! lex -> parse -> link -> compile
//! ```
//! The compiled `mach::Program` is handed to a `mach::Runtime`, which
//! executes it in time slices and talks to the outside world only
//! through a `mach::Host`.
//!
//! ```
//! let program = basic::compile("10 PRINT 1+2\n20 END\n", &Default::default()).unwrap();
//! assert!(program.len() > 0);
//! ```

pub mod lang;
pub mod mach;

/// Runs the whole front end and the compiler over `source`.
pub fn compile(source: &str, options: &mach::Options) -> Result<mach::Program, lang::Error> {
    let tokens = lang::lex(source);
    let program = lang::parse(&tokens)?;
    let program = lang::link(program)?;
    mach::compile(&program, options)
}
