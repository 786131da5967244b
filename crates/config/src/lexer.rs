// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tokenizer for the job configuration grammar.
//!
//! Keywords must start a line (possibly after leading whitespace) except
//! for `{`, `on`, `to`, and `every`, which may appear mid-line — this
//! mirrors the original tokenizer's rule that a bare word is only treated
//! as a keyword if nothing but whitespace precedes it since the last
//! newline, so a job named e.g. `order-processor` doesn't get misread.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Job,
    Name,
    User,
    Cmd,
    Env,
    Dir,
    Out,
    Err,
    In,
    Order,
    Disable,
    Wait,
    Once,
    LCurly,
    RCurly,
    Listen,
    On,
    Report,
    To,
    Bounce,
    Every,
    Depends,
    Ulimit,
    Nice,
    Cpu,
}

impl Keyword {
    const TABLE: &'static [(&'static str, Keyword)] = &[
        ("job", Keyword::Job),
        ("name", Keyword::Name),
        ("user", Keyword::User),
        ("cmd", Keyword::Cmd),
        ("env", Keyword::Env),
        ("dir", Keyword::Dir),
        ("out", Keyword::Out),
        ("err", Keyword::Err),
        ("in", Keyword::In),
        ("order", Keyword::Order),
        ("disable", Keyword::Disable),
        ("wait", Keyword::Wait),
        ("once", Keyword::Once),
        ("{", Keyword::LCurly),
        ("}", Keyword::RCurly),
        ("listen", Keyword::Listen),
        ("on", Keyword::On),
        ("report", Keyword::Report),
        ("to", Keyword::To),
        ("bounce", Keyword::Bounce),
        ("every", Keyword::Every),
        ("depends", Keyword::Depends),
        ("ulimit", Keyword::Ulimit),
        ("nice", Keyword::Nice),
        ("cpu", Keyword::Cpu),
    ];

    /// Keywords allowed to appear after non-whitespace on the current line.
    fn may_appear_midline(self) -> bool {
        matches!(self, Keyword::LCurly | Keyword::RCurly | Keyword::On | Keyword::To | Keyword::Every)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = Self::TABLE
            .iter()
            .find(|(_, k)| k == self)
            .map(|(s, _)| *s)
            .unwrap_or("?");
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Kw(Keyword),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated quoted string at line {0}")]
    UnterminatedQuote(u32),
}

pub fn lex(input: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut line: u32 = 1;
    let mut at_line_start = true;
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            line += 1;
            at_line_start = true;
            i += 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '#' {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        if c == '"' {
            let start_line = line;
            let mut j = i + 1;
            let mut s = String::new();
            loop {
                if j >= chars.len() || chars[j] == '\n' {
                    return Err(LexError::UnterminatedQuote(start_line));
                }
                if chars[j] == '"' {
                    j += 1;
                    break;
                }
                s.push(chars[j]);
                j += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Str(s),
                line: start_line,
            });
            i = j;
            at_line_start = false;
            continue;
        }

        // `{`/`}` are always standalone single-char tokens.
        if c == '{' || c == '}' {
            let kw = if c == '{' { Keyword::LCurly } else { Keyword::RCurly };
            tokens.push(Token {
                kind: TokenKind::Kw(kw),
                line,
            });
            i += 1;
            continue;
        }

        // bare word: keyword or string, ends at whitespace/quote/brace/eob
        let start = i;
        while i < chars.len()
            && !chars[i].is_whitespace()
            && chars[i] != '"'
            && chars[i] != '{'
            && chars[i] != '}'
        {
            i += 1;
        }
        let word: String = chars[start..i].iter().collect();
        let was_line_start = at_line_start;
        at_line_start = false;

        if let Some((_, kw)) = Keyword::TABLE.iter().find(|(s, _)| *s == word) {
            if was_line_start || kw.may_appear_midline() {
                tokens.push(Token {
                    kind: TokenKind::Kw(*kw),
                    line,
                });
                continue;
            }
        }

        tokens.push(Token {
            kind: TokenKind::Str(word),
            line,
        });
    }

    Ok(tokens)
}

#[cfg(test)]
#[path = "lexer_tests.rs"]
mod tests;
