//! JavaScript reformatter.
//!
//! Rewrites script text into one statement per line with two-space block
//! indentation. String, template, comment and regex literals are copied
//! verbatim. Source line breaks are kept so automatic semicolon insertion
//! still sees the same boundaries.

use crate::error::{AppError, Result};
use crate::models::ContentKind;

const INDENT: &str = "  ";

/// Words after which a `/` starts a regex literal rather than a division.
const REGEX_PREFIX_WORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

/// Words that stay on the closing-brace line.
const BRACE_CONTINUATIONS: &[&str] = &["else", "catch", "finally", "while"];

/// Reformat JavaScript source.
pub fn beautify(input: &str) -> Result<String> {
    Formatter::new(input).run()
}

struct Formatter {
    chars: Vec<char>,
    pos: usize,
    lines: Vec<String>,
    current: String,
    line_indent: usize,
    stack: Vec<char>,
    space: bool,
    last_sig: Option<char>,
    last_word: String,
}

impl Formatter {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            lines: Vec::new(),
            current: String::new(),
            line_indent: 0,
            stack: Vec::new(),
            space: false,
            last_sig: None,
            last_word: String::new(),
        }
    }

    fn run(mut self) -> Result<String> {
        while let Some(c) = self.peek(0) {
            match c {
                '\n' => {
                    self.pos += 1;
                    if self.in_parens() {
                        self.space = true;
                    } else {
                        self.end_line();
                    }
                }
                c if c.is_whitespace() => {
                    self.pos += 1;
                    self.space = true;
                }
                '"' | '\'' => {
                    let literal = self.read_string(c)?;
                    self.push(&literal);
                    self.mark(c);
                }
                '`' => {
                    let literal = self.read_template()?;
                    self.push(&literal);
                    self.mark('`');
                }
                '/' if self.peek(1) == Some('/') => {
                    let comment = self.read_until_newline();
                    self.push(&comment);
                    self.end_line();
                }
                '/' if self.peek(1) == Some('*') => {
                    let comment = self.read_block_comment()?;
                    self.push(&comment);
                }
                '/' if self.regex_allowed() => {
                    let literal = self.read_regex()?;
                    self.push(&literal);
                    self.mark('/');
                }
                '{' => {
                    self.pos += 1;
                    self.open_brace();
                }
                '}' => {
                    self.pos += 1;
                    self.close_brace()?;
                }
                '(' | '[' => {
                    self.pos += 1;
                    self.stack.push(c);
                    self.push_char(c);
                }
                ')' | ']' => {
                    self.pos += 1;
                    let open = if c == ')' { '(' } else { '[' };
                    if self.stack.pop() != Some(open) {
                        return Err(self.error(format!("unbalanced '{c}'")));
                    }
                    self.push_char(c);
                }
                ';' => {
                    self.pos += 1;
                    self.push_char(';');
                    if !self.in_parens() {
                        self.end_line();
                    }
                }
                ',' => {
                    self.pos += 1;
                    self.push_char(',');
                    if self.stack.last() == Some(&'{') {
                        self.end_line();
                    }
                }
                c if is_word_char(c) => {
                    let word = self.read_word();
                    self.push(&word);
                    self.last_sig = word.chars().last();
                    self.last_word = word;
                }
                _ => {
                    self.pos += 1;
                    self.push_char(c);
                }
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(self.error(format!("unclosed '{open}'")));
        }
        self.end_line();

        if self.lines.is_empty() {
            return Ok(String::new());
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        Ok(out)
    }

    fn error(&self, message: String) -> AppError {
        AppError::normalize(ContentKind::Js, format!("{message} at offset {}", self.pos))
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn in_parens(&self) -> bool {
        matches!(self.stack.last(), Some('(') | Some('['))
    }

    fn depth(&self) -> usize {
        self.stack.iter().filter(|&&c| c == '{').count()
    }

    fn push(&mut self, text: &str) {
        if self.current.is_empty() {
            self.line_indent = self.depth();
        } else if self.space {
            self.current.push(' ');
        }
        self.space = false;
        self.current.push_str(text);
    }

    fn push_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.push(c.encode_utf8(&mut buf));
        self.mark(c);
    }

    fn mark(&mut self, c: char) {
        self.last_sig = Some(c);
        self.last_word.clear();
    }

    fn end_line(&mut self) {
        let line = self.current.trim_end();
        if !line.is_empty() {
            self.lines
                .push(format!("{}{}", INDENT.repeat(self.line_indent), line));
        }
        self.current.clear();
        self.space = false;
    }

    fn open_brace(&mut self) {
        if self
            .current
            .ends_with(|c: char| c == ')' || c == '>' || is_word_char(c))
        {
            self.space = true;
        }
        self.push("{");
        self.stack.push('{');
        self.mark('{');

        match self.next_significant() {
            Some((idx, '}')) => {
                // Keep `{}` together.
                self.pos = idx + 1;
                self.stack.pop();
                self.current.push('}');
                self.mark('}');
                self.after_close();
            }
            _ => self.end_line(),
        }
    }

    fn close_brace(&mut self) -> Result<()> {
        if self.stack.pop() != Some('{') {
            return Err(self.error("unbalanced '}'".to_string()));
        }
        self.end_line();
        self.push("}");
        self.mark('}');
        self.after_close();
        Ok(())
    }

    /// Decide whether the token after a closing brace stays on its line.
    fn after_close(&mut self) {
        match self.next_significant() {
            Some((idx, ';' | ',' | ')' | ']' | '.')) => self.pos = idx,
            Some((idx, c)) if is_word_char(c) => {
                let word: String = self.chars[idx..]
                    .iter()
                    .take_while(|&&c| is_word_char(c))
                    .collect();
                if BRACE_CONTINUATIONS.contains(&word.as_str()) {
                    self.pos = idx;
                    self.space = true;
                } else {
                    self.end_line();
                }
            }
            _ => self.end_line(),
        }
    }

    fn next_significant(&self) -> Option<(usize, char)> {
        self.chars[self.pos..]
            .iter()
            .enumerate()
            .find(|(_, c)| !c.is_whitespace())
            .map(|(i, &c)| (self.pos + i, c))
    }

    fn regex_allowed(&self) -> bool {
        match self.last_sig {
            None => true,
            Some(c) if is_word_char(c) => REGEX_PREFIX_WORDS.contains(&self.last_word.as_str()),
            Some(c) => "(,=:[!&|?{};+-*%<>~^}".contains(c),
        }
    }

    fn read_word(&mut self) -> String {
        let start = self.pos;
        while self.peek(0).is_some_and(is_word_char) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn read_string(&mut self, quote: char) -> Result<String> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek(0) {
                None | Some('\n') => return Err(self.error("unterminated string".to_string())),
                Some('\\') => self.pos += 2,
                Some(c) => {
                    self.pos += 1;
                    if c == quote {
                        break;
                    }
                }
            }
        }
        Ok(self.slice(start))
    }

    fn read_template(&mut self) -> Result<String> {
        let start = self.pos;
        self.pos += 1;
        let mut expr_depth = 0usize;
        loop {
            match self.peek(0) {
                None => return Err(self.error("unterminated template literal".to_string())),
                Some('\\') => self.pos += 2,
                Some('`') if expr_depth == 0 => {
                    self.pos += 1;
                    break;
                }
                Some('$') if self.peek(1) == Some('{') => {
                    expr_depth += 1;
                    self.pos += 2;
                }
                Some('{') if expr_depth > 0 => {
                    expr_depth += 1;
                    self.pos += 1;
                }
                Some('}') if expr_depth > 0 => {
                    expr_depth -= 1;
                    self.pos += 1;
                }
                Some(_) => self.pos += 1,
            }
        }
        Ok(self.slice(start))
    }

    fn read_until_newline(&mut self) -> String {
        let start = self.pos;
        while self.peek(0).is_some_and(|c| c != '\n') {
            self.pos += 1;
        }
        self.slice(start)
    }

    fn read_block_comment(&mut self) -> Result<String> {
        let start = self.pos;
        self.pos += 2;
        loop {
            match (self.peek(0), self.peek(1)) {
                (None, _) => return Err(self.error("unterminated comment".to_string())),
                (Some('*'), Some('/')) => {
                    self.pos += 2;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        Ok(self.slice(start))
    }

    fn read_regex(&mut self) -> Result<String> {
        let start = self.pos;
        self.pos += 1;
        let mut in_class = false;
        loop {
            match self.peek(0) {
                None | Some('\n') => return Err(self.error("unterminated regex".to_string())),
                Some('\\') => self.pos += 2,
                Some('[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(']') => {
                    in_class = false;
                    self.pos += 1;
                }
                Some('/') if !in_class => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        while self.peek(0).is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        Ok(self.slice(start))
    }

    fn slice(&self, start: usize) -> String {
        let end = self.pos.min(self.chars.len());
        self.chars[start..end].iter().collect()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_statements_and_blocks() {
        let out = beautify("function f(a){if(a){return 1;}else{return 2;}}").unwrap();
        assert_eq!(
            out,
            "function f(a) {\n  if(a) {\n    return 1;\n  } else {\n    return 2;\n  }\n}\n"
        );
    }

    #[test]
    fn test_for_header_stays_on_one_line() {
        let out = beautify("for(var i=0;i<3;i++){x();}").unwrap();
        assert_eq!(out, "for(var i=0;i<3;i++) {\n  x();\n}\n");
    }

    #[test]
    fn test_literals_are_verbatim() {
        let out = beautify("var s=\"a;{b}\";var t=`x${y}{;}`;var r=/[;{]+/g;").unwrap();
        assert_eq!(
            out,
            "var s=\"a;{b}\";\nvar t=`x${y}{;}`;\nvar r=/[;{]+/g;\n"
        );
    }

    #[test]
    fn test_division_is_not_regex() {
        let out = beautify("var a=b/c/d;").unwrap();
        assert_eq!(out, "var a=b/c/d;\n");
    }

    #[test]
    fn test_empty_block_and_object_literal() {
        let out = beautify("var o={};var p={a:1,b:2};").unwrap();
        assert_eq!(out, "var o={};\nvar p={\n  a:1,\n  b:2\n};\n");
    }

    #[test]
    fn test_reindents_existing_lines() {
        let out = beautify("if (x) {\n        y()\n\n\n}\n").unwrap();
        assert_eq!(out, "if (x) {\n  y()\n}\n");
    }

    #[test]
    fn test_is_idempotent_on_formatted_output() {
        let once = beautify("function f(a){if(a){return 1;}return [1,2];}").unwrap();
        assert_eq!(beautify(&once).unwrap(), once);
    }

    #[test]
    fn test_rejects_broken_input() {
        assert!(beautify("function f() {").is_err());
        assert!(beautify("}").is_err());
        assert!(beautify("var s = 'oops").is_err());
        assert!(beautify("/* never closed").is_err());
    }

    #[test]
    fn test_short_input_without_terminator() {
        assert_eq!(beautify("var x=1").unwrap(), "var x=1\n");
        assert_eq!(beautify("   ").unwrap(), "");
    }
}
