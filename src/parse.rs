//! Text notation for facts and rules.
//!
//! Knowledge base files are line oriented:
//!
//! ```text
//! # pets
//! fact: (isa Fido Dog)
//! rule: ((isa ?x Dog)) -> (isa ?x Animal)
//! ```
//!
//! Statements are s-expressions; `?`-prefixed tokens are variables. Blank
//! lines and `#` comments are skipped. Parsing is an outer concern: the
//! store and inference core only ever see [`Term`]s.

use crate::error::ParseError;
use crate::knowledge::{Fact, Knowledge, Rule};
use crate::term::Term;

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    Symbol(String),
}

fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut symbol = String::new();
    for ch in input.chars() {
        match ch {
            '(' | ')' => {
                if !symbol.is_empty() {
                    tokens.push(Token::Symbol(std::mem::take(&mut symbol)));
                }
                tokens.push(if ch == '(' { Token::Open } else { Token::Close });
            }
            c if c.is_whitespace() => {
                if !symbol.is_empty() {
                    tokens.push(Token::Symbol(std::mem::take(&mut symbol)));
                }
            }
            c => symbol.push(c),
        }
    }
    if !symbol.is_empty() {
        tokens.push(Token::Symbol(symbol));
    }
    tokens
}

// ---------------------------------------------------------------------------
// Term parser
// ---------------------------------------------------------------------------

struct TermParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    input: &'a str,
}

impl<'a> TermParser<'a> {
    fn new(tokens: &'a [Token], input: &'a str) -> Self {
        Self {
            tokens,
            pos: 0,
            input,
        }
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn symbol_term(&self, symbol: &str) -> Result<Term, ParseError> {
        match symbol.strip_prefix('?') {
            Some("") => Err(ParseError::UnnamedVariable {
                input: self.input.to_string(),
            }),
            Some(name) => Ok(Term::variable(name)),
            None => Ok(Term::atom(symbol)),
        }
    }

    fn parse_expr(&mut self) -> Result<Term, ParseError> {
        match self.next() {
            Some(Token::Symbol(symbol)) => self.symbol_term(symbol),
            Some(Token::Open) => {
                let mut items = Vec::new();
                loop {
                    match self.peek() {
                        Some(Token::Close) => {
                            self.pos += 1;
                            if items.is_empty() {
                                return Err(ParseError::EmptyStatement {
                                    input: self.input.to_string(),
                                });
                            }
                            return Ok(Term::Compound(items));
                        }
                        Some(_) => items.push(self.parse_expr()?),
                        None => {
                            return Err(ParseError::Unbalanced {
                                input: self.input.to_string(),
                            });
                        }
                    }
                }
            }
            Some(Token::Close) => Err(ParseError::UnexpectedToken {
                token: ")".to_string(),
                input: self.input.to_string(),
            }),
            None => Err(ParseError::Unbalanced {
                input: self.input.to_string(),
            }),
        }
    }

    fn rest(&self) -> &'a [Token] {
        &self.tokens[self.pos..]
    }
}

/// Parse a single term from its text form, e.g. `(isa ?x Dog)`.
pub fn parse_term(input: &str) -> Result<Term, ParseError> {
    let tokens = tokenize(input);
    let mut parser = TermParser::new(&tokens, input.trim());
    let term = parser.parse_expr()?;
    if !parser.rest().is_empty() {
        return Err(ParseError::TrailingInput {
            rest: render_tokens(parser.rest()),
        });
    }
    Ok(term)
}

fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Open => out.push('('),
            Token::Close => out.push(')'),
            Token::Symbol(symbol) => {
                if !out.is_empty() && !out.ends_with('(') {
                    out.push(' ');
                }
                out.push_str(symbol);
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Fact and rule lines
// ---------------------------------------------------------------------------

fn parse_statement(input: &str) -> Result<Term, ParseError> {
    let term = parse_term(input)?;
    if !term.is_statement() {
        return Err(ParseError::NotAStatement {
            input: input.trim().to_string(),
        });
    }
    Ok(term)
}

/// Parse the body of a `fact:` line.
pub fn parse_fact(input: &str) -> Result<Fact, ParseError> {
    Ok(Fact::asserted(parse_statement(input)?))
}

/// Parse the body of a `rule:` line: `((antecedent) ...) -> (consequent)`.
pub fn parse_rule(input: &str) -> Result<Rule, ParseError> {
    let (lhs_text, rhs_text) = input.split_once("->").ok_or_else(|| ParseError::MissingArrow {
        input: input.trim().to_string(),
    })?;

    let lhs_term = parse_term(lhs_text)?;
    let Term::Compound(antecedents) = lhs_term else {
        return Err(ParseError::NotAStatement {
            input: lhs_text.trim().to_string(),
        });
    };
    for antecedent in &antecedents {
        if !antecedent.is_statement() {
            return Err(ParseError::NotAStatement {
                input: antecedent.to_string(),
            });
        }
    }

    let rhs = parse_statement(rhs_text)?;
    Ok(Rule::asserted(antecedents, rhs))
}

/// Parse one line of a knowledge base file.
///
/// Returns `Ok(None)` for blank lines and `#` comments.
pub fn parse_line(line: &str) -> Result<Option<Knowledge>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    if let Some(body) = line.strip_prefix("fact:") {
        return Ok(Some(Knowledge::Fact(parse_fact(body)?)));
    }
    if let Some(body) = line.strip_prefix("rule:") {
        return Ok(Some(Knowledge::Rule(parse_rule(body)?)));
    }
    Err(ParseError::UnknownDirective {
        line: line.to_string(),
    })
}

/// Parse a whole knowledge base file. Errors carry the 1-based line number.
pub fn parse_kb(input: &str) -> Result<Vec<Knowledge>, ParseError> {
    let mut entries = Vec::new();
    for (index, line) in input.lines().enumerate() {
        match parse_line(line) {
            Ok(Some(knowledge)) => entries.push(knowledge),
            Ok(None) => {}
            Err(source) => {
                return Err(ParseError::AtLine {
                    line: index + 1,
                    source: Box::new(source),
                });
            }
        }
    }
    Ok(entries)
}
