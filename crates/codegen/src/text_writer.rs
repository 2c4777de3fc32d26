use super::Result;
use std::fmt::Write;

/// Writes tokens to a string, tracking indentation.
///
/// Adapted from `createTextWriter` of the typescript compiler.
pub struct JsWriter<'a> {
    indent: usize,
    line_start: bool,
    new_line: &'a str,
    wr: &'a mut String,
    /// Last char written on the current line.
    last_char: Option<char>,
}

impl<'a> JsWriter<'a> {
    pub fn new(new_line: &'a str, wr: &'a mut String) -> Self {
        JsWriter {
            indent: 0,
            line_start: true,
            new_line,
            wr,
            last_char: None,
        }
    }

    fn write(&mut self, data: &str) -> Result {
        let first = match data.chars().next() {
            Some(c) => c,
            None => return Ok(()),
        };
        if self.line_start {
            for _ in 0..self.indent {
                self.wr.write_str("    ")?;
            }
            self.line_start = false;
        } else if let Some(last) = self.last_char {
            // Keep adjacent tokens from merging into one, e.g. `a - -b`,
            // `a / /re/` or `typeof x`.
            if tokens_merge(last, first) {
                self.wr.write_char(' ')?;
            }
        }
        self.wr.write_str(data)?;
        self.last_char = data.chars().last();
        Ok(())
    }

    pub(super) fn increase_indent(&mut self) {
        self.indent += 1;
    }

    pub(super) fn decrease_indent(&mut self) {
        self.indent -= 1;
    }

    pub(super) fn write_space(&mut self) -> Result {
        self.write(" ")
    }

    pub(super) fn write_keyword(&mut self, s: &'static str) -> Result {
        self.write(s)
    }

    pub(super) fn write_operator(&mut self, s: &str) -> Result {
        self.write(s)
    }

    pub(super) fn write_punct(&mut self, s: &'static str) -> Result {
        self.write(s)
    }

    /// Identifiers, numbers, strings and regular expressions.
    pub(super) fn write_lit(&mut self, s: &str) -> Result {
        self.write(s)
    }

    pub(super) fn write_line(&mut self) -> Result {
        if !self.line_start {
            self.wr.write_str(self.new_line)?;
            self.line_start = true;
            self.last_char = None;
        }
        Ok(())
    }
}

fn tokens_merge(last: char, first: char) -> bool {
    match (last, first) {
        ('+', '+') | ('-', '-') | ('/', '/') | ('/', '*') => true,
        (l, f) => is_word_char(l) && is_word_char(f),
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
