//! Parser for the ECMAScript subset understood by the optimizer.
//!
//! ```
//! use ast::ProgramData;
//!
//! let mut program_data = ProgramData::default();
//! let program = parser::parse_program("var x = 1;", &mut program_data).unwrap();
//! assert_eq!(program.body.len(), 1);
//! ```

pub use self::{
    error::{Error, Pos, SyntaxError},
    parser::{PResult, Parser},
};
use ast::{Program, ProgramData};

mod context;
pub mod error;
pub mod lexer;
mod parser;
pub mod token;

/// Parses a whole script. Every node of the result gets a fresh id from
/// `program_data`.
pub fn parse_program(src: &str, program_data: &mut ProgramData) -> PResult<Program> {
    Parser::new(src, program_data)?.parse_program()
}
