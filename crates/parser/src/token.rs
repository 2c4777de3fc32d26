pub(crate) use self::{Keyword::*, Token::*};
use crate::error::Pos;
use ast::{AssignOp, BinaryOp};
use atoms::JsWord;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Word(Word),

    Dot,
    Bang,
    Tilde,

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    Semi,
    Comma,
    Colon,
    QuestionMark,

    PlusPlus,
    MinusMinus,

    /// Binary operators spelled with punctuation. `in` and `instanceof` are
    /// keywords.
    BinOp(BinaryOp),
    AssignOp(AssignOp),

    Str(JsWord),

    Regex(JsWord, JsWord),

    Num(f64),

    Eof,
}

impl Token {
    /// Whether a `/` following this token starts a regular expression rather
    /// than a division.
    pub(crate) fn before_expr(&self) -> bool {
        match self {
            Token::Word(w) => w.before_expr(),
            BinOp(_) | AssignOp(_) | Bang | Tilde | LParen | LBracket | LBrace | RBrace | Semi
            | Comma | Colon | QuestionMark | PlusPlus | MinusMinus => true,
            _ => false,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => write!(f, "`{}`", w.as_str()),
            Dot => f.write_str("`.`"),
            Bang => f.write_str("`!`"),
            Tilde => f.write_str("`~`"),
            LParen => f.write_str("`(`"),
            RParen => f.write_str("`)`"),
            LBracket => f.write_str("`[`"),
            RBracket => f.write_str("`]`"),
            LBrace => f.write_str("`{`"),
            RBrace => f.write_str("`}`"),
            Semi => f.write_str("`;`"),
            Comma => f.write_str("`,`"),
            Colon => f.write_str("`:`"),
            QuestionMark => f.write_str("`?`"),
            PlusPlus => f.write_str("`++`"),
            MinusMinus => f.write_str("`--`"),
            BinOp(op) => write!(f, "`{}`", op),
            AssignOp(op) => write!(f, "`{}`", op),
            Str(_) => f.write_str("string literal"),
            Regex(..) => f.write_str("regular expression"),
            Num(_) => f.write_str("number literal"),
            Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenAndPos {
    pub token: Token,
    /// Whether a line terminator appeared between this token and the
    /// previous one. Drives automatic semicolon insertion.
    pub had_line_break: bool,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Word {
    Keyword(Keyword),

    Null,
    True,
    False,

    Ident(JsWord),
}

impl Word {
    fn before_expr(&self) -> bool {
        match self {
            Word::Keyword(k) => k.before_expr(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Word::Keyword(k) => k.as_str(),
            Word::Null => "null",
            Word::True => "true",
            Word::False => "false",
            Word::Ident(i) => &**i,
        }
    }
}

impl From<&str> for Word {
    fn from(s: &str) -> Self {
        match s {
            "null" => Word::Null,
            "true" => Word::True,
            "false" => Word::False,
            _ => match Keyword::from_word(s) {
                Some(k) => Word::Keyword(k),
                None => Word::Ident(s.into()),
            },
        }
    }
}

macro_rules! keywords {
    ($($variant:ident => $s:literal,)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $($variant,)*
        }

        impl Keyword {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $s,)*
                }
            }

            fn from_word(s: &str) -> Option<Self> {
                match s {
                    $($s => Some(Keyword::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

keywords!(
    Break => "break",
    Case => "case",
    Catch => "catch",
    Class => "class",
    Const => "const",
    Continue => "continue",
    Debugger => "debugger",
    Default_ => "default",
    Delete => "delete",
    Do => "do",
    Else => "else",
    Export => "export",
    Extends => "extends",
    Finally => "finally",
    For => "for",
    Function => "function",
    If => "if",
    Import => "import",
    In => "in",
    InstanceOf => "instanceof",
    Let => "let",
    New => "new",
    Return => "return",
    Super => "super",
    Switch => "switch",
    This => "this",
    Throw => "throw",
    Try => "try",
    TypeOf => "typeof",
    Var => "var",
    Void => "void",
    While => "while",
    With => "with",
    Yield => "yield",
);

impl Keyword {
    fn before_expr(self) -> bool {
        matches!(
            self,
            Case | Default_
                | Delete
                | Do
                | Else
                | In
                | InstanceOf
                | New
                | Return
                | Throw
                | TypeOf
                | Void
        )
    }
}

impl From<Keyword> for Word {
    fn from(kwd: Keyword) -> Self {
        Word::Keyword(kwd)
    }
}
