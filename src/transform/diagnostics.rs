//! Removes diagnostic console calls from production builds.

use super::lexer::{Token, TokenKind, significant, tokenize};
use serde::Serialize;

/// Strips `console.<method>(...)` calls whose method is not allow-listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticStrip {
    /// Receiver of the diagnostic calls.
    pub object: String,

    /// Methods that survive stripping.
    #[serde(rename = "exclude")]
    pub allowed: Vec<String>,
}

impl Default for DiagnosticStrip {
    fn default() -> Self {
        Self {
            object: "console".to_string(),
            allowed: ["log", "warn", "error"].map(String::from).to_vec(),
        }
    }
}

/// Keywords whose parenthesised header is followed by a statement body.
const CONTROL_HEADERS: &[&str] = &["if", "for", "while", "with"];

struct Removal {
    start: usize,
    end: usize,
    whole_statement: bool,
}

impl DiagnosticStrip {
    pub fn allows(&self, method: &str) -> bool {
        self.allowed.iter().any(|m| m == method)
    }

    /// Applies the rule to `source`.
    ///
    /// A call that forms a whole expression statement is removed along with
    /// its semicolon (and its line, when it stood alone). A call anywhere else
    /// becomes `void 0`.
    pub fn strip(&self, source: &str) -> String {
        let tokens = tokenize(source);
        let sig = significant(&tokens);
        let closers = matching_closers(&tokens, &sig);

        let mut removals = Vec::new();
        let mut i = 0;
        while i < sig.len() {
            match self.call_at(&tokens, &sig, &closers, i) {
                Some(close) => {
                    let ends_statement = match sig.get(close + 1).map(|&t| &tokens[t]) {
                        None => true,
                        Some(next) => {
                            next.is_punct(";")
                                || next.is_punct("}")
                                || newline_between(source, &tokens[sig[close]], next)
                        }
                    };
                    let whole_statement =
                        ends_statement && self.starts_statement(source, &tokens, &sig, &closers, i);

                    let mut end = tokens[sig[close]].end();
                    if whole_statement {
                        if let Some(semi) = sig.get(close + 1).map(|&t| &tokens[t]) {
                            if semi.is_punct(";") {
                                end = semi.end();
                            }
                        }
                    }
                    removals.push(Removal {
                        start: tokens[sig[i]].start,
                        end,
                        whole_statement,
                    });
                    i = close + 1;
                }
                None => i += 1,
            }
        }

        if removals.is_empty() {
            return source.to_string();
        }
        log::debug!("Stripped {} diagnostic call(s)", removals.len());

        let mut out = String::with_capacity(source.len());
        let mut pos = 0;
        for removal in removals {
            let (start, end) = if removal.whole_statement {
                expand_to_line(source, removal.start, removal.end)
            } else {
                (removal.start, removal.end)
            };
            out.push_str(&source[pos..start.max(pos)]);
            if !removal.whole_statement {
                out.push_str("void 0");
            }
            pos = end.max(pos);
        }
        out.push_str(&source[pos..]);
        out
    }

    /// Significant index of the closing paren when a strippable call starts
    /// at significant index `i`.
    fn call_at(
        &self,
        tokens: &[Token<'_>],
        sig: &[usize],
        closers: &[Option<usize>],
        i: usize,
    ) -> Option<usize> {
        let at = |n: usize| sig.get(n).map(|&t| &tokens[t]);
        if !at(i)?.is_ident(&self.object) {
            return None;
        }
        if i > 0 && at(i - 1)?.is_member_dot() {
            return None;
        }
        if !at(i + 1)?.is_punct(".") {
            return None;
        }
        let method = at(i + 2).filter(|t| t.kind == TokenKind::Ident)?;
        if self.allows(method.text) || !at(i + 3)?.is_punct("(") {
            return None;
        }
        closers[i + 3]
    }

    fn starts_statement(
        &self,
        source: &str,
        tokens: &[Token<'_>],
        sig: &[usize],
        closers: &[Option<usize>],
        i: usize,
    ) -> bool {
        if i == 0 {
            return true;
        }
        let prev = &tokens[sig[i - 1]];
        if prev.is_punct(";") || prev.is_punct("{") || prev.is_punct("}") {
            return true;
        }
        if prev.is_ident("else") || prev.is_ident("do") {
            return false;
        }
        if prev.is_punct(")") {
            let header = closers
                .iter()
                .position(|c| *c == Some(i - 1))
                .and_then(|open| open.checked_sub(1))
                .map(|kw| &tokens[sig[kw]]);
            if header.is_some_and(|kw| CONTROL_HEADERS.iter().any(|k| kw.is_ident(k))) {
                return false;
            }
        }
        let continues_expression = (prev.kind == TokenKind::Punct
            && !matches!(prev.text, ")" | "]"))
            || (prev.kind == TokenKind::Template && prev.text.ends_with("${"));
        !continues_expression && newline_between(source, prev, &tokens[sig[i]])
    }
}

/// For every significant index holding an opening bracket, the significant
/// index of its closer.
fn matching_closers(tokens: &[Token<'_>], sig: &[usize]) -> Vec<Option<usize>> {
    let mut closers = vec![None; sig.len()];
    let mut stack: Vec<(usize, &str)> = Vec::new();
    for (n, &t) in sig.iter().enumerate() {
        let token = &tokens[t];
        if token.kind != TokenKind::Punct {
            continue;
        }
        match token.text {
            "(" => stack.push((n, ")")),
            "[" => stack.push((n, "]")),
            "{" => stack.push((n, "}")),
            ")" | "]" | "}" => {
                if let Some(&(open, expected)) = stack.last() {
                    if expected == token.text {
                        stack.pop();
                        closers[open] = Some(n);
                    }
                }
            }
            _ => {}
        }
    }
    closers
}

fn newline_between(source: &str, before: &Token<'_>, after: &Token<'_>) -> bool {
    source[before.end()..after.start].contains('\n')
}

/// Widens a removed statement to its whole line when nothing else shares it.
fn expand_to_line(source: &str, start: usize, end: usize) -> (usize, usize) {
    let line_start = source[..start].rfind('\n').map_or(0, |n| n + 1);
    let line_end = source[end..].find('\n').map_or(source.len(), |n| end + n + 1);
    let before_blank = source[line_start..start].trim().is_empty();
    let after_blank = source[end..line_end].trim().is_empty();
    if before_blank && after_blank {
        (line_start, line_end)
    } else {
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(src: &str) -> String {
        DiagnosticStrip::default().strip(src)
    }

    #[test]
    fn removes_assertions_and_keeps_allowed_levels() {
        let src = "function f(x) {\n  console.assert(x > 0, 'positive');\n  console.log('a');\n  console.warn('b');\n  console.error('c');\n  console.debug('d');\n}\n";
        assert_eq!(
            strip(src),
            "function f(x) {\n  console.log('a');\n  console.warn('b');\n  console.error('c');\n}\n"
        );
    }

    #[test]
    fn expression_positions_become_void() {
        assert_eq!(strip("const t = console.time('x');"), "const t = void 0;");
        assert_eq!(strip("if (x) console.assert(y);\n"), "if (x) void 0;\n");
        assert_eq!(strip("a && console.info(b)\n"), "a && void 0\n");
    }

    #[test]
    fn nested_arguments_are_removed_with_the_call() {
        assert_eq!(strip("console.assert(f(a, [b], {c}));\nnext();\n"), "next();\n");
    }

    #[test]
    fn statements_without_semicolons_are_removed() {
        assert_eq!(strip("foo()\nconsole.assert(x)\nbar()\n"), "foo()\nbar()\n");
    }

    #[test]
    fn strings_and_member_chains_are_untouched() {
        let src = "log('console.assert(x)'); this.console.assert(x); console.log(1);\n";
        assert_eq!(strip(src), src);
    }

    #[test]
    fn shared_line_keeps_neighbours() {
        assert_eq!(strip("a(); console.assert(b); c();\n"), "a();  c();\n");
    }
}
