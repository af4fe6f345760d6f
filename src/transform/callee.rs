//! Rewrites references to global built-ins into polyfill imports.

use super::lexer::{Token, TokenKind, significant, tokenize};
use path_absolutize::Absolutize;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// Dotted member path such as `Number.isFinite`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    segments: Vec<String>,
}

impl QualifiedName {
    /// Builds a name from known-good segments.
    pub fn from_segments(segments: &[&str]) -> Self {
        Self {
            segments: segments.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl FromStr for QualifiedName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<String> = s.split('.').map(str::to_string).collect();
        let valid = segments.len() >= 2
            && segments.iter().all(|seg| {
                let mut chars = seg.chars();
                chars
                    .next()
                    .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                    && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
            });
        if valid {
            Ok(Self { segments })
        } else {
            Err(format!("'{s}' is not a qualified member name"))
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl Serialize for QualifiedName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Named export of a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NamedImport {
    pub name: String,
    #[serde(rename = "from")]
    pub module: String,
}

/// Replaces every reference to `pattern` with the imported binding `import`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalleeRewrite {
    pub pattern: QualifiedName,
    pub import: NamedImport,
}

impl CalleeRewrite {
    pub fn new(pattern: QualifiedName, name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            pattern,
            import: NamedImport {
                name: name.into(),
                module: module.into(),
            },
        }
    }
}

impl NamedImport {
    /// Whether the module at `path` is this import's source module.
    pub fn is_imported_from(&self, path: &Path) -> bool {
        normalized(&module_path(Path::new(&self.module)))
            == normalized(&module_path(path))
    }
}

struct Edit {
    start: usize,
    end: usize,
    replacement: String,
}

/// An `import { imported as local } from "specifier"` binding.
struct ImportBinding<'a> {
    imported: &'a str,
    local: &'a str,
    specifier: &'a str,
}

/// Applies `rules` to `source`.
///
/// Each match is replaced by the import's local name and the needed
/// `import { ... } from "..."` declarations are added at the top of the
/// module. Source without matches is returned unchanged.
pub fn rewrite(source: &str, rules: &[CalleeRewrite]) -> String {
    rewrite_module(source, None, rules)
}

/// Applies `rules` to the module stored at `path`.
///
/// Rules importing from `path` itself are skipped, and relative import
/// specifiers are resolved against the module's directory when looking for
/// bindings that can be reused.
pub fn rewrite_file(path: &Path, source: &str, rules: &[CalleeRewrite]) -> String {
    let active: Vec<CalleeRewrite> = rules
        .iter()
        .filter(|rule| !rule.import.is_imported_from(path))
        .cloned()
        .collect();
    if active.len() < rules.len() {
        log::debug!("{} is a polyfill source; skipping its own rewrites", path.display());
    }
    rewrite_module(source, Some(path), &active)
}

fn rewrite_module(source: &str, importer: Option<&Path>, rules: &[CalleeRewrite]) -> String {
    if rules.is_empty() {
        return source.to_string();
    }
    let tokens = tokenize(source);
    let sig = significant(&tokens);

    // (rule index, byte range)
    let mut hits: Vec<(usize, usize, usize)> = Vec::new();
    let mut i = 0;
    while i < sig.len() {
        let matched = rules.iter().enumerate().find_map(|(n, rule)| {
            match_at(&tokens, &sig, i, &rule.pattern).map(|last| (n, last))
        });
        match matched {
            Some((n, last)) => {
                if !is_assignment_target(&tokens, &sig, last) {
                    hits.push((n, tokens[sig[i]].start, tokens[sig[last]].end()));
                }
                i = last + 1;
            }
            None => i += 1,
        }
    }

    if hits.is_empty() {
        return source.to_string();
    }
    log::debug!("Rewrote {} built-in reference(s)", hits.len());

    let bindings = existing_imports(&tokens, &sig);
    // Property names after `.` never clash with a local binding.
    let identifiers: BTreeSet<&str> = sig
        .iter()
        .enumerate()
        .filter(|&(n, _)| n == 0 || !tokens[sig[n - 1]].is_member_dot())
        .map(|(_, &t)| &tokens[t])
        .filter(|t| t.kind == TokenKind::Ident)
        .map(|t| t.text)
        .collect();

    let mut locals: BTreeMap<usize, String> = BTreeMap::new();
    let mut claimed: BTreeSet<String> = BTreeSet::new();
    let mut needed: BTreeMap<&str, BTreeSet<(&str, String)>> = BTreeMap::new();
    for &(n, _, _) in &hits {
        if locals.contains_key(&n) {
            continue;
        }
        let import = &rules[n].import;
        let reused = bindings.iter().find(|b| {
            b.imported == import.name && same_module(b.specifier, &import.module, importer)
        });
        let local = match reused {
            Some(binding) => binding.local.to_string(),
            None => {
                let local = unique_local(&import.name, &identifiers, &claimed);
                claimed.insert(local.clone());
                needed
                    .entry(import.module.as_str())
                    .or_default()
                    .insert((import.name.as_str(), local.clone()));
                local
            }
        };
        locals.insert(n, local);
    }

    let mut edits: Vec<Edit> = hits
        .iter()
        .map(|&(n, start, end)| Edit {
            start,
            end,
            replacement: locals[&n].clone(),
        })
        .collect();

    let mut declarations = String::new();
    for (module, names) in &needed {
        let specifiers: Vec<String> = names
            .iter()
            .map(|(imported, local)| {
                if *imported == local.as_str() {
                    imported.to_string()
                } else {
                    format!("{imported} as {local}")
                }
            })
            .collect();
        let specifier = serde_json::to_string(module).unwrap_or_else(|_| format!("\"{module}\""));
        declarations.push_str(&format!(
            "import {{ {} }} from {};\n",
            specifiers.join(", "),
            specifier
        ));
    }
    if !declarations.is_empty() {
        let at = import_insertion_point(source, &tokens, &sig);
        edits.push(Edit {
            start: at,
            end: at,
            replacement: declarations,
        });
    }

    apply_edits(source, edits)
}

/// Returns the significant index of the last segment when `pattern` starts
/// at significant index `i` as a free-standing member expression.
fn match_at(tokens: &[Token<'_>], sig: &[usize], i: usize, pattern: &QualifiedName) -> Option<usize> {
    if i > 0 && tokens[sig[i - 1]].is_member_dot() {
        return None;
    }
    let segments = pattern.segments();
    let mut cursor = i;
    for (n, segment) in segments.iter().enumerate() {
        if n > 0 {
            if !tokens.get(*sig.get(cursor)?)?.is_punct(".") {
                return None;
            }
            cursor += 1;
        }
        if !tokens.get(*sig.get(cursor)?)?.is_ident(segment) {
            return None;
        }
        if n + 1 < segments.len() {
            cursor += 1;
        }
    }
    Some(cursor)
}

/// `Number.isFinite = ...` assigns the built-in and must keep its name.
fn is_assignment_target(tokens: &[Token<'_>], sig: &[usize], last: usize) -> bool {
    let at = |i: usize| sig.get(i).map(|&t| &tokens[t]);
    at(last + 1).is_some_and(|t| t.is_punct("="))
        && !at(last + 2).is_some_and(|t| t.is_punct("=") || t.is_punct(">"))
}

/// Named import bindings already declared by the source.
fn existing_imports<'a>(tokens: &[Token<'a>], sig: &[usize]) -> Vec<ImportBinding<'a>> {
    let mut found = Vec::new();
    let at = |i: usize| sig.get(i).map(|&t| &tokens[t]);

    let mut i = 0;
    while i < sig.len() {
        let starts_import = at(i).is_some_and(|t| t.is_ident("import"))
            && at(i + 1).is_some_and(|t| t.is_punct("{"));
        if !starts_import {
            i += 1;
            continue;
        }
        let mut pairs: Vec<(&'a str, &'a str)> = Vec::new();
        let mut j = i + 2;
        while let Some(token) = at(j) {
            if token.is_punct("}") {
                break;
            }
            if token.kind == TokenKind::Ident {
                let renamed = at(j + 1)
                    .is_some_and(|t| t.is_ident("as"))
                    .then(|| at(j + 2).filter(|t| t.kind == TokenKind::Ident))
                    .flatten();
                match renamed {
                    Some(local) => {
                        pairs.push((token.text, local.text));
                        j += 2;
                    }
                    None => pairs.push((token.text, token.text)),
                }
            }
            j += 1;
        }
        if at(j + 1).is_some_and(|t| t.is_ident("from")) {
            if let Some(module) = at(j + 2).filter(|t| t.kind == TokenKind::Str) {
                let specifier = module.text.trim_matches(|c| c == '\'' || c == '"');
                found.extend(pairs.into_iter().map(|(imported, local)| ImportBinding {
                    imported,
                    local,
                    specifier,
                }));
            }
        }
        i = j + 1;
    }
    found
}

/// Whether `specifier`, written in `importer`, names `module`.
///
/// Without a known importer a relative specifier matches when its path
/// segments end `module`'s path.
fn same_module(specifier: &str, module: &str, importer: Option<&Path>) -> bool {
    if specifier == module {
        return true;
    }
    let target = normalized(&module_path(Path::new(module)));
    let specified = module_path(Path::new(specifier));
    if specified.is_absolute() {
        return normalized(&specified) == target;
    }
    if !specifier.starts_with('.') {
        return false;
    }
    match importer.and_then(Path::parent) {
        Some(dir) => normalized(&dir.join(&specified)) == target,
        None => {
            let tail: PathBuf = specified
                .components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .collect();
            !tail.as_os_str().is_empty() && target.ends_with(&tail)
        }
    }
}

/// `name` when nothing in the source uses it, else `_name`, `_name2`, ...
fn unique_local(name: &str, identifiers: &BTreeSet<&str>, claimed: &BTreeSet<String>) -> String {
    let free = |candidate: &str| !identifiers.contains(candidate) && !claimed.contains(candidate);
    if free(name) {
        return name.to_string();
    }
    let mut candidate = format!("_{name}");
    let mut n = 2;
    while !free(&candidate) {
        candidate = format!("_{name}{n}");
        n += 1;
    }
    candidate
}

/// Drops a script extension so `number.ts` and `number` compare equal.
fn module_path(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ts" | "tsx" | "js" | "jsx" | "mjs" | "cjs") => path.with_extension(""),
        _ => path.to_path_buf(),
    }
}

fn normalized(path: &Path) -> PathBuf {
    path.absolutize()
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Byte offset after a shebang line and any directive prologue.
fn import_insertion_point(source: &str, tokens: &[Token<'_>], sig: &[usize]) -> usize {
    let mut offset = 0;
    if source.starts_with("#!") {
        offset = source.find('\n').map_or(source.len(), |n| n + 1);
    }

    let mut i = 0;
    while let Some(&t) = sig.get(i) {
        let token = &tokens[t];
        if token.start < offset {
            i += 1;
            continue;
        }
        if token.kind != TokenKind::Str {
            break;
        }
        // A directive is a lone string statement.
        match sig.get(i + 1).map(|&n| &tokens[n]) {
            Some(next) if next.is_punct(";") => {
                offset = next.end();
                i += 2;
            }
            _ => break,
        }
    }

    if offset > 0 && !source[..offset].ends_with('\n') {
        // Keep the declarations on their own line after the directive.
        offset = source[offset..]
            .find('\n')
            .map_or(source.len(), |n| offset + n + 1);
    }
    offset
}

fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    // Insertions (empty ranges) go before a replacement at the same offset.
    edits.sort_by_key(|e| (e.start, e.end));
    let mut out = String::with_capacity(source.len() + 64);
    let mut pos = 0;
    for edit in edits {
        out.push_str(&source[pos..edit.start]);
        out.push_str(&edit.replacement);
        pos = edit.end;
    }
    out.push_str(&source[pos..]);
    out
}
