//! Recursive-descent parser for command text.
//!
//! Grammar, informally:
//!
//! ```text
//! command    := '\' IDENT nodes '---'
//! nodes      := node*
//! node       := entity-ref | space-ref | condition | query-group | TEXT
//! entity-ref := '@' IDENT | '@' '(' IDENT (',' IDENT)* ')'
//! space-ref  := '#' IDENT | '#' '(' IDENT (',' IDENT)* ')'       (a bare
//!               '#' not followed by an identifier char or '(' is just text)
//! condition  := '?' '(' bool-expr ')'
//! query-grp  := '$' '(' command+ ')'
//! bool-expr  := or-expr
//! or-expr    := and-expr ('or' and-expr)*
//! and-expr   := not-expr ('and' not-expr)*
//! not-expr   := 'not' not-expr | compare-expr
//! compare    := atom (('<' | '>' | '=') atom)?
//! atom       := '(' bool-expr ')'
//!             | '?' '(' bool-expr ')'                 (nested condition)
//!             | '$' '(' command ')'                   (query)
//!             | '@' IDENT                              (entity literal)
//!             | '#' IDENT                               (space literal)
//!             | IDENT '(' nodes ')'                    (function-call sugar)
//!             | TEXT
//! ```
//!
//! The total source text is capped at 10,000 characters, and `?(...)`/`$(...)`
//! nesting is capped at 10 levels (shared counter across both forms).

use o_base::{ParseError, Span, SpannedError};
use o_data::{BoolExpr, Command, CompareOp, Node};

const MAX_LENGTH: usize = 10_000;
const MAX_DEPTH: u32 = 10;

/// Parses a single command. Returns a `ParseError` carrying a byte position
/// and a source snippet, suitable for surfacing to whatever produced the
/// malformed text (a provider, a REPL, a test).
pub fn parse(text: &str) -> Result<Command, ParseError> {
    if text.chars().count() > MAX_LENGTH {
        let err = SpannedError::new(
            format!("command exceeds maximum length of {MAX_LENGTH} characters"),
            Span::new(0, 0),
        );
        return Err(err.into_parse_error(text));
    }
    let mut p = Parser::new(text);
    p.skip_whitespace();
    let command = p.parse_command_inner().map_err(|e| e.into_parse_error(text))?;
    p.skip_whitespace();
    if !p.at_end() {
        return Err(p
            .err("unexpected trailing content after command terminator")
            .into_parse_error(text));
    }
    Ok(command)
}

enum Term {
    Dashes,
    CloseParen,
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
    depth: u32,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            depth: 0,
        }
    }

    fn err(&self, message: &str) -> SpannedError {
        SpannedError::new(message.to_string(), Span::new(self.pos, self.pos))
    }

    fn enter_nesting(&mut self) -> Result<(), SpannedError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.err("condition/query nesting exceeds the maximum depth of 10"));
        }
        Ok(())
    }

    fn exit_nesting(&mut self) {
        self.depth -= 1;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.source[self.pos..].starts_with(s)
    }

    fn advance_char(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            self.advance_char();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    /// `[A-Za-z0-9][A-Za-z0-9_-]*`
    fn parse_identifier(&mut self) -> Result<String, SpannedError> {
        let start = self.pos;
        match self.peek_char() {
            Some(c) if c.is_ascii_alphanumeric() => self.advance_char(),
            _ => return Err(self.err("expected an identifier")),
        }
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                self.advance_char();
            } else {
                break;
            }
        }
        Ok(self.source[start..self.pos].to_string())
    }

    fn match_keyword(&mut self, word: &str) -> bool {
        let remaining = &self.source[self.pos..];
        if !remaining.is_char_boundary(word.len()) {
            return false;
        }
        let Some(candidate) = remaining.get(..word.len()) else {
            return false;
        };
        if !candidate.eq_ignore_ascii_case(word) {
            return false;
        }
        let boundary_ok = remaining[word.len()..]
            .chars()
            .next()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_' || c == '-'));
        if !boundary_ok {
            return false;
        }
        self.pos += word.len();
        true
    }

    fn match_compare_op(&mut self) -> Option<CompareOp> {
        let op = match self.peek_char()? {
            '<' => CompareOp::Lt,
            '>' => CompareOp::Gt,
            '=' => CompareOp::Eq,
            _ => return None,
        };
        self.advance_char();
        Some(op)
    }

    fn is_space_sigil_ahead(&self) -> bool {
        matches!(self.peek_at(1), Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '(')
    }

    fn flush_text(buf: &mut String, nodes: &mut Vec<Node>) {
        if !buf.is_empty() {
            nodes.push(Node::Text {
                text: std::mem::take(buf),
            });
        }
    }

    fn parse_command_inner(&mut self) -> Result<Command, SpannedError> {
        if self.peek_char() != Some('\\') {
            return Err(self.err("expected command to start with '\\'"));
        }
        self.advance_char();
        let name = self.parse_identifier()?;
        let content = self.parse_nodes(Term::Dashes)?;
        Ok(Command::new(name, content))
    }

    fn parse_nodes(&mut self, term: Term) -> Result<Vec<Node>, SpannedError> {
        let mut nodes = Vec::new();
        let mut text_buf = String::new();
        loop {
            if self.at_end() {
                return Err(self.err(match term {
                    Term::Dashes => "unterminated command: missing '---' terminator",
                    Term::CloseParen => "unterminated group: missing ')'",
                }));
            }
            match term {
                Term::Dashes if self.starts_with("---") => {
                    self.advance_n(3);
                    Self::flush_text(&mut text_buf, &mut nodes);
                    return Ok(nodes);
                }
                Term::CloseParen if self.peek_char() == Some(')') => {
                    self.advance_char();
                    Self::flush_text(&mut text_buf, &mut nodes);
                    return Ok(nodes);
                }
                _ => {}
            }
            let c = self.peek_char().unwrap();
            match c {
                '@' => {
                    Self::flush_text(&mut text_buf, &mut nodes);
                    let refs = self.parse_ref_group()?;
                    nodes.extend(refs.into_iter().map(|name| Node::Entity { name }));
                }
                '#' if self.is_space_sigil_ahead() => {
                    Self::flush_text(&mut text_buf, &mut nodes);
                    let refs = self.parse_ref_group()?;
                    nodes.extend(refs.into_iter().map(|name| Node::Space { name }));
                }
                '?' if self.peek_at(1) == Some('(') => {
                    Self::flush_text(&mut text_buf, &mut nodes);
                    nodes.push(self.parse_condition_node()?);
                }
                '$' if self.peek_at(1) == Some('(') => {
                    Self::flush_text(&mut text_buf, &mut nodes);
                    nodes.extend(self.parse_query_group()?);
                }
                '\\' => {
                    return Err(self.err("backslash not allowed in command arguments outside $(...)"))
                }
                _ => {
                    text_buf.push(c);
                    self.advance_char();
                }
            }
        }
    }

    /// Parses the remainder of `@...`/`#...` (sigil already seen, not yet
    /// consumed): either a single identifier or a parenthesized list.
    fn parse_ref_group(&mut self) -> Result<Vec<String>, SpannedError> {
        let sigil = self.peek_char().unwrap();
        self.advance_char();
        if self.peek_char() != Some('(') {
            let ident = self.parse_identifier()?;
            return Ok(vec![ident]);
        }
        self.advance_char();
        self.skip_whitespace();
        if self.peek_char() == Some(')') {
            self.advance_char();
            return Err(self.err(&format!("empty group '{sigil}()'")));
        }
        let mut idents = Vec::new();
        loop {
            self.skip_whitespace();
            idents.push(self.parse_identifier()?);
            self.skip_whitespace();
            match self.peek_char() {
                Some(',') => self.advance_char(),
                Some(')') => {
                    self.advance_char();
                    break;
                }
                _ => return Err(self.err("expected ',' or ')' in group")),
            }
        }
        Ok(idents)
    }

    fn parse_condition_node(&mut self) -> Result<Node, SpannedError> {
        self.advance_n(2); // '?('
        self.enter_nesting()?;
        let expr = self.parse_or()?;
        self.skip_whitespace();
        if self.peek_char() != Some(')') {
            return Err(self.err("unclosed condition: expected ')'"));
        }
        self.advance_char();
        self.exit_nesting();
        Ok(Node::Condition { expr })
    }

    /// Parses `$(...)`, which may hold one or more `\CMD---` embedded
    /// commands, each becoming its own `QueryNode`.
    fn parse_query_group(&mut self) -> Result<Vec<Node>, SpannedError> {
        self.advance_n(2); // '$('
        self.enter_nesting()?;
        let mut queries = Vec::new();
        self.skip_whitespace();
        loop {
            if self.peek_char() == Some(')') {
                self.advance_char();
                break;
            }
            if self.peek_char() != Some('\\') {
                return Err(self.err("expected '\\' to start an embedded command in $(...)"));
            }
            let command = self.parse_command_inner()?;
            queries.push(Node::Query {
                command: Box::new(command),
            });
            self.skip_whitespace();
        }
        self.exit_nesting();
        if queries.is_empty() {
            return Err(self.err("empty query group '$()'"));
        }
        Ok(queries)
    }

    fn parse_or(&mut self) -> Result<BoolExpr, SpannedError> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if self.match_keyword("or") {
                let right = self.parse_and()?;
                left = BoolExpr::Or {
                    l: Box::new(left),
                    r: Box::new(right),
                };
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<BoolExpr, SpannedError> {
        let mut left = self.parse_not()?;
        loop {
            self.skip_whitespace();
            if self.match_keyword("and") {
                let right = self.parse_not()?;
                left = BoolExpr::And {
                    l: Box::new(left),
                    r: Box::new(right),
                };
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<BoolExpr, SpannedError> {
        self.skip_whitespace();
        if self.match_keyword("not") {
            let x = self.parse_not()?;
            Ok(BoolExpr::Not { x: Box::new(x) })
        } else {
            self.parse_compare()
        }
    }

    fn parse_compare(&mut self) -> Result<BoolExpr, SpannedError> {
        let left = self.parse_atom()?;
        self.skip_whitespace();
        if let Some(op) = self.match_compare_op() {
            let right = self.parse_atom()?;
            Ok(BoolExpr::Compare {
                l: Box::new(left),
                op,
                r: Box::new(right),
            })
        } else {
            Ok(left)
        }
    }

    fn parse_atom(&mut self) -> Result<BoolExpr, SpannedError> {
        self.skip_whitespace();
        if self.at_end() {
            return Err(self.err("expected an atom, found end of input"));
        }
        match self.peek_char().unwrap() {
            '(' => {
                self.advance_char();
                let inner = self.parse_or()?;
                self.skip_whitespace();
                if self.peek_char() != Some(')') {
                    return Err(self.err("unclosed parenthesized group: expected ')'"));
                }
                self.advance_char();
                Ok(inner)
            }
            '?' if self.peek_at(1) == Some('(') => {
                self.advance_n(2);
                self.enter_nesting()?;
                let inner = self.parse_or()?;
                self.skip_whitespace();
                if self.peek_char() != Some(')') {
                    return Err(self.err("unclosed nested condition: expected ')'"));
                }
                self.advance_char();
                self.exit_nesting();
                Ok(inner)
            }
            '$' if self.peek_at(1) == Some('(') => {
                self.advance_n(2);
                self.enter_nesting()?;
                self.skip_whitespace();
                if self.peek_char() != Some('\\') {
                    return Err(self.err("expected '\\' to start an embedded command in $(...)"));
                }
                let command = self.parse_command_inner()?;
                self.skip_whitespace();
                if self.peek_char() != Some(')') {
                    return Err(self.err("unclosed query: expected ')'"));
                }
                self.advance_char();
                self.exit_nesting();
                Ok(BoolExpr::Query {
                    command: Box::new(command),
                })
            }
            '@' => {
                self.advance_char();
                let name = self.parse_identifier()?;
                Ok(BoolExpr::Entity { name })
            }
            '#' if self.peek_at(1).map_or(false, |c| c.is_ascii_alphanumeric() || c == '_') => {
                self.advance_char();
                let name = self.parse_identifier()?;
                Ok(BoolExpr::Space { name })
            }
            c if c.is_ascii_alphanumeric() => {
                let ident = self.parse_identifier()?;
                if self.peek_char() == Some('(') {
                    self.advance_char();
                    let args = self.parse_nodes(Term::CloseParen)?;
                    Ok(BoolExpr::Query {
                        command: Box::new(Command::new(ident, args)),
                    })
                } else {
                    let mut text = ident;
                    while matches!(self.peek_char(), Some('.') | Some('+')) {
                        text.push(self.peek_char().unwrap());
                        self.advance_char();
                        text.push_str(&self.parse_identifier().unwrap_or_default());
                    }
                    Ok(BoolExpr::Text { text })
                }
            }
            _ => {
                let token = self.read_word_token();
                if token.is_empty() {
                    return Err(self.err("expected an atom"));
                }
                Ok(BoolExpr::Text { text: token })
            }
        }
    }

    /// Reads a literal token up to the next whitespace or structural
    /// character; used for atoms that are neither identifiers nor sigiled
    /// refs (bare numbers, symbols).
    fn read_word_token(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() || "()<>=@#$?,".contains(c) {
                break;
            }
            s.push(c);
            self.advance_char();
        }
        s
    }
}
