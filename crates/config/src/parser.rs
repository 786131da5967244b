// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive-descent parser over the token stream produced by [`crate::lexer`].
//!
//! One function per directive, dispatched from `parse_job_body`, mirrors the
//! original `set_*` setter functions — each owns exactly one field and its
//! own validation.

use crate::diagnostic::ConfigError;
use crate::lexer::{Keyword, Token, TokenKind};
use pmtr_core::{CpuSet, JobDef, RlimitSpec};

/// Whether parsing is happening to actually load the config, or only to
/// check its syntax (`-t`). In syntax-check mode the caller skips side
/// effects like DNS resolution and username validation after parsing;
/// this module's output is identical either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    Normal,
    SyntaxCheck,
}

/// Everything parsed out of one config file: job definitions plus the
/// `listen on` / `report to` endpoint specs (unresolved — DNS lookup and
/// socket setup happen in `pmtr-engine`, not here).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedConfig {
    pub jobs: Vec<JobDef>,
    pub listen: Vec<String>,
    pub report: Vec<String>,
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn line(&self) -> u32 {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(0)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expect_kw(&mut self, kw: Keyword) -> Result<u32, ConfigError> {
        match self.bump() {
            Some(Token { kind: TokenKind::Kw(k), line }) if *k == kw => Ok(*line),
            Some(t) => Err(ConfigError::UnexpectedToken {
                line: t.line,
                found: describe(&t.kind),
            }),
            None => Err(ConfigError::UnexpectedEof),
        }
    }

    fn expect_str(&mut self) -> Result<(String, u32), ConfigError> {
        match self.bump() {
            Some(Token { kind: TokenKind::Str(s), line }) => Ok((s.clone(), *line)),
            Some(t) => Err(ConfigError::UnexpectedToken {
                line: t.line,
                found: describe(&t.kind),
            }),
            None => Err(ConfigError::UnexpectedEof),
        }
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Kw(k) => format!("'{k}'"),
        TokenKind::Str(s) => format!("{s:?}"),
    }
}

pub fn parse(tokens: &[Token], _mode: LoadMode) -> Result<ParsedConfig, ConfigError> {
    let mut p = Parser::new(tokens);
    let mut cfg = ParsedConfig::default();

    while let Some(tok) = p.peek() {
        match tok.kind {
            TokenKind::Kw(Keyword::Listen) => {
                p.bump();
                p.expect_kw(Keyword::On)?;
                let (url, line) = p.expect_str()?;
                let _ = pmtr_core::Endpoint::parse(&url).map_err(|source| ConfigError::Endpoint { line, source })?;
                cfg.listen.push(url);
            }
            TokenKind::Kw(Keyword::Report) => {
                p.bump();
                p.expect_kw(Keyword::To)?;
                let (url, line) = p.expect_str()?;
                let _ = pmtr_core::Endpoint::parse(&url).map_err(|source| ConfigError::Endpoint { line, source })?;
                cfg.report.push(url);
            }
            TokenKind::Kw(Keyword::Job) => {
                p.bump();
                let open_line = p.expect_kw(Keyword::LCurly)?;
                let def = parse_job_body(&mut p, open_line)?;
                if cfg.jobs.iter().any(|j| j.name == def.name) {
                    return Err(ConfigError::DuplicateJobName {
                        line: open_line,
                        name: def.name.to_string(),
                    });
                }
                cfg.jobs.push(def);
            }
            _ => {
                let line = p.line();
                return Err(ConfigError::UnexpectedToken {
                    line,
                    found: describe(&tok.kind),
                });
            }
        }
    }

    Ok(cfg)
}

struct JobFields {
    name: Option<String>,
    dir: Option<String>,
    stdin: Option<String>,
    stdout: Option<String>,
    stderr: Option<String>,
    user: Option<String>,
    order: Option<i32>,
    nice: Option<i32>,
    bounce: Option<u64>,
    cpu: Option<CpuSet>,
    cmd: Vec<String>,
    env: Vec<String>,
    rlimits: Vec<RlimitSpec>,
    deps: Vec<String>,
    disabled: bool,
    wait: bool,
    once: bool,
}

impl JobFields {
    fn new() -> Self {
        Self {
            name: None,
            dir: None,
            stdin: None,
            stdout: None,
            stderr: None,
            user: None,
            order: None,
            nice: None,
            bounce: None,
            cpu: None,
            cmd: Vec::new(),
            env: Vec::new(),
            rlimits: Vec::new(),
            deps: Vec::new(),
            disabled: false,
            wait: false,
            once: false,
        }
    }
}

fn parse_job_body(p: &mut Parser<'_>, open_line: u32) -> Result<JobDef, ConfigError> {
    let mut f = JobFields::new();

    loop {
        let tok = p.peek().ok_or(ConfigError::UnexpectedEof)?;
        let kind = tok.kind.clone();
        let line = tok.line;

        match kind {
            TokenKind::Kw(Keyword::RCurly) => {
                p.bump();
                break;
            }
            TokenKind::Kw(Keyword::Name) => {
                p.bump();
                let (s, line) = p.expect_str()?;
                if f.name.is_some() {
                    return Err(ConfigError::DuplicateKey { line, key: "name" });
                }
                f.name = Some(s);
            }
            TokenKind::Kw(Keyword::Cmd) => {
                p.bump();
                if !f.cmd.is_empty() {
                    return Err(ConfigError::DuplicateKey { line, key: "cmd" });
                }
                f.cmd = collect_strings_until_keyword(p)?;
                if f.cmd.is_empty() {
                    return Err(ConfigError::UnexpectedEof);
                }
            }
            TokenKind::Kw(Keyword::Dir) => {
                p.bump();
                let (s, line) = p.expect_str()?;
                if f.dir.is_some() {
                    return Err(ConfigError::DuplicateKey { line, key: "dir" });
                }
                f.dir = Some(s);
            }
            TokenKind::Kw(Keyword::In) => {
                p.bump();
                let (s, line) = p.expect_str()?;
                if f.stdin.is_some() {
                    return Err(ConfigError::DuplicateKey { line, key: "in" });
                }
                f.stdin = Some(s);
            }
            TokenKind::Kw(Keyword::Out) => {
                p.bump();
                let (s, line) = p.expect_str()?;
                if f.stdout.is_some() {
                    return Err(ConfigError::DuplicateKey { line, key: "out" });
                }
                f.stdout = Some(s);
            }
            TokenKind::Kw(Keyword::Err) => {
                p.bump();
                let (s, line) = p.expect_str()?;
                if f.stderr.is_some() {
                    return Err(ConfigError::DuplicateKey { line, key: "err" });
                }
                f.stderr = Some(s);
            }
            TokenKind::Kw(Keyword::Env) => {
                p.bump();
                let (s, line) = p.expect_str()?;
                if !s.contains('=') {
                    return Err(ConfigError::InvalidEnv { line });
                }
                f.env.push(s);
            }
            TokenKind::Kw(Keyword::User) => {
                p.bump();
                let (s, line) = p.expect_str()?;
                if f.user.is_some() {
                    return Err(ConfigError::DuplicateKey { line, key: "user" });
                }
                if s.len() >= pmtr_core::MAX_USER {
                    return Err(ConfigError::UserNameTooLong { line });
                }
                f.user = Some(s);
            }
            TokenKind::Kw(Keyword::Order) => {
                p.bump();
                let (s, line) = p.expect_str()?;
                if f.order.is_some() {
                    return Err(ConfigError::DuplicateKey { line, key: "order" });
                }
                f.order = Some(s.parse().map_err(|_| ConfigError::NonNumericOrder { line })?);
            }
            TokenKind::Kw(Keyword::Nice) => {
                p.bump();
                let (s, line) = p.expect_str()?;
                if f.nice.is_some() {
                    return Err(ConfigError::DuplicateKey { line, key: "nice" });
                }
                let n: i32 = s.parse().map_err(|_| ConfigError::NonNumericNice { line })?;
                if !(pmtr_core::MIN_NICE..=pmtr_core::MAX_NICE).contains(&n) {
                    return Err(ConfigError::NiceOutOfRange {
                        line,
                        min: pmtr_core::MIN_NICE,
                        max: pmtr_core::MAX_NICE,
                    });
                }
                f.nice = Some(n);
            }
            TokenKind::Kw(Keyword::Disable) => {
                p.bump();
                if f.disabled {
                    return Err(ConfigError::DuplicateKey { line, key: "disable" });
                }
                f.disabled = true;
            }
            TokenKind::Kw(Keyword::Wait) => {
                p.bump();
                if f.wait {
                    return Err(ConfigError::DuplicateKey { line, key: "wait" });
                }
                f.wait = true;
            }
            TokenKind::Kw(Keyword::Once) => {
                p.bump();
                if f.once {
                    return Err(ConfigError::DuplicateKey { line, key: "once" });
                }
                f.once = true;
            }
            TokenKind::Kw(Keyword::Bounce) => {
                p.bump();
                p.expect_kw(Keyword::Every)?;
                let (s, line) = p.expect_str()?;
                if f.bounce.is_some() {
                    return Err(ConfigError::DuplicateKey { line, key: "bounce" });
                }
                f.bounce = Some(parse_interval(&s, line)?);
            }
            TokenKind::Kw(Keyword::Cpu) => {
                p.bump();
                let (s, line) = p.expect_str()?;
                if f.cpu.is_some() {
                    return Err(ConfigError::DuplicateKey { line, key: "cpu" });
                }
                f.cpu = Some(CpuSet::parse(&s).map_err(|source| ConfigError::Cpu { line, source })?);
            }
            TokenKind::Kw(Keyword::Ulimit) => {
                p.bump();
                let (flag, line) = p.expect_str()?;
                let (value, _) = p.expect_str()?;
                let spec = RlimitSpec::parse(&flag, &value).map_err(|source| ConfigError::Rlimit { line, source })?;
                f.rlimits.push(spec);
            }
            TokenKind::Kw(Keyword::Depends) => {
                p.bump();
                p.expect_kw(Keyword::LCurly)?;
                loop {
                    match p.peek() {
                        Some(Token { kind: TokenKind::Kw(Keyword::RCurly), .. }) => {
                            p.bump();
                            break;
                        }
                        Some(Token { kind: TokenKind::Str(_), .. }) => {
                            let (s, _) = p.expect_str()?;
                            f.deps.push(s);
                        }
                        Some(t) => {
                            return Err(ConfigError::UnexpectedToken {
                                line: t.line,
                                found: describe(&t.kind),
                            })
                        }
                        None => return Err(ConfigError::UnexpectedEof),
                    }
                }
            }
            other => {
                return Err(ConfigError::UnexpectedToken {
                    line,
                    found: describe(&other),
                })
            }
        }
    }

    let name = f.name.ok_or(ConfigError::JobMissingName { line: open_line })?;
    if f.cmd.is_empty() {
        return Err(ConfigError::JobMissingCmd { line: open_line, name });
    }

    let mut def = JobDef::new(name);
    def.cmd = f.cmd;
    def.env = f.env;
    def.dir = f.dir.map(Into::into);
    def.stdin = f.stdin;
    def.stdout = f.stdout;
    def.stderr = f.stderr;
    def.user = f.user;
    def.order = f.order.unwrap_or(0);
    def.nice = f.nice.unwrap_or(0);
    def.disabled = f.disabled;
    def.wait = f.wait;
    def.once = f.once;
    def.bounce_interval = f.bounce.unwrap_or(0);
    def.cpuset = f.cpu.unwrap_or_default();
    def.rlimits = f.rlimits;
    def.deps = f.deps;
    Ok(def)
}

/// Consume `Str` tokens until the next keyword (or end of job body),
/// forming e.g. `cmd`'s argv.
fn collect_strings_until_keyword(p: &mut Parser<'_>) -> Result<Vec<String>, ConfigError> {
    let mut out = Vec::new();
    while let Some(Token { kind: TokenKind::Str(_), .. }) = p.peek() {
        let (s, _) = p.expect_str()?;
        out.push(s);
    }
    Ok(out)
}

/// Parse `bounce every <N><unit>` where unit is one of `s m h d`.
fn parse_interval(spec: &str, line: u32) -> Result<u64, ConfigError> {
    let (digits, unit) = spec.split_at(
        spec.find(|c: char| !c.is_ascii_digit())
            .unwrap_or(spec.len()),
    );
    if digits.is_empty() {
        return Err(ConfigError::InvalidTimeInterval { line });
    }
    let n: u64 = digits.parse().map_err(|_| ConfigError::InvalidTimeInterval { line })?;
    let mult = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86400,
        _ => return Err(ConfigError::InvalidTimeUnit { line }),
    };
    Ok(n * mult)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
