// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Lexer for query templates with `:name` parameters.
//!
//! A token is a colon followed by an ASCII letter or underscore and then any
//! run of ASCII alphanumerics or underscores. The lexer leaves alone:
//!
//! - `::type` casts
//! - text inside `'single'` or `"double"` quotes
//! - `-- line` and `/* block */` comments
//!
//! Non-breaking spaces (U+00A0), which sneak in when templates are pasted
//! from documents, are normalised to plain spaces.

/// Piece of a lexed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Literal SQL.
    Sql(String),
    /// Parameter token without the colon.
    Param(String)
}

/// A lexed template.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    pieces: Vec<Piece>
}

impl Template {
    /// Lex a template.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let normalized = source.replace('\u{00A0}', " ");
        let chars: Vec<char> = normalized.chars().collect();
        let mut pieces = Vec::new();
        let mut text = String::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            match c {
                '\'' | '"' => {
                    let end = skip_quoted(&chars, i, c);
                    text.extend(&chars[i..end]);
                    i = end;
                }
                '-' if chars.get(i + 1) == Some(&'-') => {
                    let end = chars[i..]
                        .iter()
                        .position(|&ch| ch == '\n')
                        .map_or(chars.len(), |p| i + p);
                    text.extend(&chars[i..end]);
                    i = end;
                }
                '/' if chars.get(i + 1) == Some(&'*') => {
                    let end = find_block_end(&chars, i + 2);
                    text.extend(&chars[i..end]);
                    i = end;
                }
                ':' if chars.get(i + 1) == Some(&':') => {
                    text.push_str("::");
                    i += 2;
                }
                ':' if chars.get(i + 1).is_some_and(|&ch| is_ident_start(ch)) => {
                    let start = i + 1;
                    let end = chars[start..]
                        .iter()
                        .position(|&ch| !is_ident_part(ch))
                        .map_or(chars.len(), |p| start + p);
                    if !text.is_empty() {
                        pieces.push(Piece::Sql(std::mem::take(&mut text)));
                    }
                    pieces.push(Piece::Param(chars[start..end].iter().collect()));
                    i = end;
                }
                _ => {
                    text.push(c);
                    i += 1;
                }
            }
        }

        if !text.is_empty() {
            pieces.push(Piece::Sql(text));
        }
        Self {
            pieces
        }
    }

    /// Lexed pieces in order.
    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Parameter tokens in order of appearance, repeats included.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Param(name) => Some(name.as_str()),
            Piece::Sql(_) => None
        })
    }
}

/// Whether the statement carries its own `ORDER BY` at the outermost level.
///
/// Orderings nested in parentheses (window functions, subqueries, CTE
/// bodies), quoted text and comments do not count.
#[must_use]
pub fn has_top_level_order_by(source: &str) -> bool {
    let chars: Vec<char> = source.replace('\u{00A0}', " ").chars().collect();
    let mut depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            quote @ ('\'' | '"') => {
                i = skip_quoted(&chars, i, quote);
                continue;
            }
            '-' if chars.get(i + 1) == Some(&'-') => {
                i = chars[i..]
                    .iter()
                    .position(|&ch| ch == '\n')
                    .map_or(chars.len(), |p| i + p);
                continue;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i = find_block_end(&chars, i + 2);
                continue;
            }
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 && keyword_at(&chars, i, "ORDER") => {
                let gap = i + "ORDER".len();
                let by = chars[gap..]
                    .iter()
                    .position(|ch| !ch.is_whitespace())
                    .map_or(chars.len(), |p| gap + p);
                if by > gap && keyword_at(&chars, by, "BY") {
                    return true;
                }
            }
            _ => {}
        }
        i += 1;
    }
    false
}

/// Case-insensitive whole-word match of `word` at `at`.
fn keyword_at(chars: &[char], at: usize, word: &str) -> bool {
    let end = at + word.len();
    let Some(candidate) = chars.get(at..end) else {
        return false;
    };
    let starts_word = at == 0 || !is_ident_part(chars[at - 1]);
    let ends_word = chars.get(end).is_none_or(|&ch| !is_ident_part(ch));
    starts_word
        && ends_word
        && candidate
            .iter()
            .zip(word.chars())
            .all(|(a, b)| a.eq_ignore_ascii_case(&b))
}

const fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

const fn is_ident_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Index just past the closing quote; doubled quotes are escapes.
fn skip_quoted(chars: &[char], start: usize, quote: char) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        if chars[i] == quote {
            if chars.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    chars.len()
}

fn find_block_end(chars: &[char], from: usize) -> usize {
    let mut i = from;
    while i + 1 < chars.len() {
        if chars[i] == '*' && chars[i + 1] == '/' {
            return i + 2;
        }
        i += 1;
    }
    chars.len()
}
