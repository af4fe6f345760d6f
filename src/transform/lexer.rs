//! Minimal ECMAScript tokenizer.
//!
//! Only precise enough for the rewrite passes: it must never report an
//! identifier that sits inside a string, comment, regular expression or the
//! literal part of a template, and it must keep bracket tokens balanced.
//! Every byte of the input belongs to exactly one token, so concatenating
//! token texts reproduces the source.

/// Token classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Punct,
    Number,
    Str,
    /// Literal part of a template: from a backtick or `}` up to `${` or the
    /// closing backtick.
    Template,
    Regex,
    Comment,
    Whitespace,
}

/// A slice of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub start: usize,
}

impl<'a> Token<'a> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    /// Whitespace and comments.
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == punct
    }

    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == name
    }

    /// Member access operator (`.` or `?.`).
    pub fn is_member_dot(&self) -> bool {
        self.is_punct(".") || self.is_punct("?.")
    }
}

/// Keywords after which a `/` starts a regular expression.
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Brace {
    Block,
    Substitution,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token<'a>>,
    braces: Vec<Brace>,
}

/// Splits `src` into tokens.
pub fn tokenize(src: &str) -> Vec<Token<'_>> {
    let mut lexer = Lexer {
        src,
        pos: 0,
        tokens: Vec::new(),
        braces: Vec::new(),
    };
    lexer.run();
    lexer.tokens
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(offset)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        if self.pos > start {
            self.tokens.push(Token {
                kind,
                text: &self.src[start..self.pos],
                start,
            });
        }
    }

    fn last_significant(&self) -> Option<&Token<'a>> {
        self.tokens.iter().rev().find(|t| !t.is_trivia())
    }

    fn regex_allowed(&self) -> bool {
        match self.last_significant() {
            None => true,
            Some(t) => match t.kind {
                TokenKind::Punct => !matches!(t.text, ")" | "]" | "}"),
                TokenKind::Ident => REGEX_PRECEDING_KEYWORDS.contains(&t.text),
                TokenKind::Template => t.text.ends_with("${"),
                _ => false,
            },
        }
    }

    fn run(&mut self) {
        while let Some(c) = self.peek() {
            let start = self.pos;
            match c {
                c if c.is_whitespace() => {
                    self.eat_while(char::is_whitespace);
                    self.push(TokenKind::Whitespace, start);
                }
                '/' if self.peek_at(1) == Some('/') => {
                    self.eat_while(|c| c != '\n');
                    self.push(TokenKind::Comment, start);
                }
                '/' if self.peek_at(1) == Some('*') => {
                    self.bump();
                    self.bump();
                    while let Some(c) = self.bump() {
                        if c == '*' && self.peek() == Some('/') {
                            self.bump();
                            break;
                        }
                    }
                    self.push(TokenKind::Comment, start);
                }
                '/' if self.regex_allowed() => {
                    self.regex();
                    self.push(TokenKind::Regex, start);
                }
                '\'' | '"' => {
                    self.string(c);
                    self.push(TokenKind::Str, start);
                }
                '`' => {
                    self.bump();
                    self.template_chunk(start);
                }
                c if c.is_ascii_digit()
                    || (c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit())) =>
                {
                    self.number(start);
                    self.push(TokenKind::Number, start);
                }
                c if is_ident_start(c) => {
                    self.eat_while(is_ident_continue);
                    self.push(TokenKind::Ident, start);
                }
                '{' => {
                    self.bump();
                    self.braces.push(Brace::Block);
                    self.push(TokenKind::Punct, start);
                }
                '}' => {
                    if self.braces.pop() == Some(Brace::Substitution) {
                        self.bump();
                        self.template_chunk(start);
                    } else {
                        self.bump();
                        self.push(TokenKind::Punct, start);
                    }
                }
                '?' if self.peek_at(1) == Some('.')
                    && !self.peek_at(2).is_some_and(|n| n.is_ascii_digit()) =>
                {
                    self.bump();
                    self.bump();
                    self.push(TokenKind::Punct, start);
                }
                '.' if self.src[self.pos..].starts_with("...") => {
                    self.pos += 3;
                    self.push(TokenKind::Punct, start);
                }
                _ => {
                    self.bump();
                    self.push(TokenKind::Punct, start);
                }
            }
        }
    }

    fn string(&mut self, quote: char) {
        self.bump();
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '\n' => break,
                c if c == quote => break,
                _ => {}
            }
        }
    }

    /// Scans template text after a backtick or a substitution's closing
    /// brace, stopping after `${` or the closing backtick.
    fn template_chunk(&mut self, start: usize) {
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '`' => break,
                '$' if self.peek() == Some('{') => {
                    self.bump();
                    self.braces.push(Brace::Substitution);
                    break;
                }
                _ => {}
            }
        }
        self.push(TokenKind::Template, start);
    }

    fn regex(&mut self) {
        self.bump();
        let mut in_class = false;
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break,
                '\n' => break,
                _ => {}
            }
        }
        self.eat_while(is_ident_continue);
    }

    fn number(&mut self, start: usize) {
        let hex = matches!(&self.src[start..], s if s.starts_with("0x") || s.starts_with("0X"));
        while let Some(c) = self.peek() {
            if matches!(c, 'e' | 'E')
                && !hex
                && matches!(self.peek_at(1), Some('+' | '-'))
            {
                self.bump();
                self.bump();
            } else if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                self.bump();
            } else {
                break;
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Indices of the non-trivia tokens.
pub fn significant(tokens: &[Token<'_>]) -> Vec<usize> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.is_trivia())
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<(TokenKind, &str)> {
        tokenize(src)
            .into_iter()
            .filter(|t| !t.is_trivia())
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn tokens_cover_the_source() {
        let src = "const a = `x${ {b: 1}.b }y` / 2; // Number.isFinite\n/* c */ 'q'";
        let joined: String = tokenize(src).iter().map(|t| t.text).collect();
        assert_eq!(joined, src);
    }

    #[test]
    fn strings_and_comments_hide_identifiers() {
        let idents: Vec<&str> = tokenize("'Number.isFinite' /* Number */ // Number\nx")
            .into_iter()
            .filter(|t| t.kind == TokenKind::Ident)
            .map(|t| t.text)
            .collect();
        assert_eq!(idents, vec!["x"]);
    }

    #[test]
    fn template_substitutions_are_tokenized() {
        assert_eq!(
            kinds("`a${Number.isFinite}b`"),
            vec![
                (TokenKind::Template, "`a${"),
                (TokenKind::Ident, "Number"),
                (TokenKind::Punct, "."),
                (TokenKind::Ident, "isFinite"),
                (TokenKind::Template, "}b`"),
            ]
        );
    }

    #[test]
    fn division_and_regex_are_distinguished() {
        assert_eq!(
            kinds("a / b"),
            vec![
                (TokenKind::Ident, "a"),
                (TokenKind::Punct, "/"),
                (TokenKind::Ident, "b"),
            ]
        );
        assert_eq!(
            kinds("x = /console.assert[/]/g"),
            vec![
                (TokenKind::Ident, "x"),
                (TokenKind::Punct, "="),
                (TokenKind::Regex, "/console.assert[/]/g"),
            ]
        );
    }

    #[test]
    fn optional_chaining_is_one_token() {
        assert_eq!(
            kinds("a?.b ? .5 : 1"),
            vec![
                (TokenKind::Ident, "a"),
                (TokenKind::Punct, "?."),
                (TokenKind::Ident, "b"),
                (TokenKind::Punct, "?"),
                (TokenKind::Number, ".5"),
                (TokenKind::Punct, ":"),
                (TokenKind::Number, "1"),
            ]
        );
    }
}
