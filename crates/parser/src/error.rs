use atoms::JsWord;
use std::fmt::{self, Display, Formatter};

/// A line/column position in the source text. Both are one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

impl Display for Pos {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub pos: Pos,
    pub kind: SyntaxError,
}

impl Error {
    pub(crate) fn new(pos: Pos, kind: SyntaxError) -> Self {
        Error { pos, kind }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.pos)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxError {
    Eof,
    UnexpectedChar(char),
    UnterminatedStrLit,
    UnterminatedRegExp,
    UnterminatedBlockComment,
    InvalidNumber,
    InvalidEscape,
    IdentAfterNum,
    Unexpected {
        got: String,
        expected: &'static str,
    },
    /// Syntax that is valid in the language but not handled by this parser.
    Unsupported(&'static str),
    InvalidAssignTarget,
    InvalidForInLeft,
    LineBreakInThrow,
    ReturnNotAllowed,
    IllegalBreak,
    IllegalContinue,
    UndefinedLabel(JsWord),
    DuplicateLabel(JsWord),
    TryWithoutHandler,
    GetterParam,
    SetterParam,
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::Eof => f.write_str("unexpected end of input"),
            SyntaxError::UnexpectedChar(c) => write!(f, "unexpected character {:?}", c),
            SyntaxError::UnterminatedStrLit => f.write_str("unterminated string literal"),
            SyntaxError::UnterminatedRegExp => f.write_str("unterminated regular expression"),
            SyntaxError::UnterminatedBlockComment => f.write_str("unterminated block comment"),
            SyntaxError::InvalidNumber => f.write_str("invalid number literal"),
            SyntaxError::InvalidEscape => f.write_str("invalid escape sequence"),
            SyntaxError::IdentAfterNum => {
                f.write_str("identifier directly after number literal")
            }
            SyntaxError::Unexpected { got, expected } => {
                write!(f, "expected {}, got {}", expected, got)
            }
            SyntaxError::Unsupported(what) => write!(f, "{} is not supported", what),
            SyntaxError::InvalidAssignTarget => f.write_str("invalid assignment target"),
            SyntaxError::InvalidForInLeft => f.write_str("invalid left-hand side in for-in"),
            SyntaxError::LineBreakInThrow => f.write_str("illegal newline after throw"),
            SyntaxError::ReturnNotAllowed => f.write_str("return outside of a function"),
            SyntaxError::IllegalBreak => f.write_str("illegal break statement"),
            SyntaxError::IllegalContinue => f.write_str("illegal continue statement"),
            SyntaxError::UndefinedLabel(label) => write!(f, "undefined label {:?}", &**label),
            SyntaxError::DuplicateLabel(label) => {
                write!(f, "label {:?} has already been declared", &**label)
            }
            SyntaxError::TryWithoutHandler => {
                f.write_str("missing catch or finally after try")
            }
            SyntaxError::GetterParam => f.write_str("getter must not have any parameters"),
            SyntaxError::SetterParam => f.write_str("setter must have exactly one parameter"),
        }
    }
}
