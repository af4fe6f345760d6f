//! Source rewrite rules shared by every variant.
//!
//! Two kinds of rule exist:
//!
//! - [`CalleeRewrite`] replaces a global built-in member expression (such as
//!   `Number.isFinite`) with a named import from a polyfill module, so the
//!   bundle does not depend on the host's native implementation. These apply
//!   to every variant.
//! - [`DiagnosticStrip`] removes `console.*` calls that are not allow-listed.
//!   It applies only to production variants, or to every variant during a
//!   release deployment.
//!
//! Callee rewrites always run first, so a built-in referenced from inside a
//! stripped diagnostic still gets its import.

mod callee;
mod diagnostics;
pub mod lexer;

pub use callee::{CalleeRewrite, NamedImport, QualifiedName, rewrite, rewrite_file};
pub use diagnostics::DiagnosticStrip;

use crate::variants::Mode;
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::path::Path;

/// Loader plugin name for the callee rewrite table.
pub const CALLEE_REWRITE_PLUGIN: &str = "callee-rewrite";

/// Loader plugin name for diagnostic stripping.
pub const DIAGNOSTIC_STRIP_PLUGIN: &str = "transform-remove-console";

/// One step of a variant's rewrite pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformRule {
    CalleeRewrite(CalleeRewrite),
    DiagnosticStrip(DiagnosticStrip),
}

impl TransformRule {
    /// Applies this rule to the source of the module at `path`.
    pub fn apply(&self, path: &Path, source: &str) -> String {
        match self {
            TransformRule::CalleeRewrite(rule) => {
                rewrite_file(path, source, std::slice::from_ref(rule))
            }
            TransformRule::DiagnosticStrip(rule) => rule.strip(source),
        }
    }
}

/// Fixed, ordered rule set used by every variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRuleSet {
    callee_rewrites: Vec<CalleeRewrite>,
    diagnostic_strip: DiagnosticStrip,
}

impl TransformRuleSet {
    pub fn new(callee_rewrites: Vec<CalleeRewrite>, diagnostic_strip: DiagnosticStrip) -> Self {
        Self {
            callee_rewrites,
            diagnostic_strip,
        }
    }

    /// Standard rules importing number polyfills from `polyfill_module`.
    pub fn standard(polyfill_module: impl Into<String>) -> Self {
        let module = polyfill_module.into();
        let rewrite = |pattern: &[&str], name: &str| {
            CalleeRewrite::new(
                QualifiedName::from_segments(pattern),
                name,
                module.clone(),
            )
        };
        Self {
            callee_rewrites: vec![
                rewrite(&["Number", "isFinite"], "isFiniteNumber"),
                rewrite(&["Number", "MAX_SAFE_INTEGER"], "MAX_SAFE_INTEGER"),
            ],
            diagnostic_strip: DiagnosticStrip::default(),
        }
    }

    pub fn callee_rewrites(&self) -> &[CalleeRewrite] {
        &self.callee_rewrites
    }

    pub fn diagnostic_strip(&self) -> &DiagnosticStrip {
        &self.diagnostic_strip
    }

    /// Whether diagnostics are stripped for a variant in `mode`.
    pub fn strips_diagnostics(mode: Mode, release: bool) -> bool {
        mode == Mode::Production || release
    }

    /// Ordered pipeline for a variant: callee rewrites, then the strip rule
    /// when it is active.
    pub fn pipeline(&self, mode: Mode, release: bool) -> Vec<TransformRule> {
        let mut rules: Vec<TransformRule> = self
            .callee_rewrites
            .iter()
            .cloned()
            .map(TransformRule::CalleeRewrite)
            .collect();
        if Self::strips_diagnostics(mode, release) {
            rules.push(TransformRule::DiagnosticStrip(self.diagnostic_strip.clone()));
        }
        rules
    }

    /// Modules the callee rewrites import from. These are never rewritten
    /// themselves.
    pub fn import_targets(&self) -> BTreeSet<&str> {
        self.callee_rewrites
            .iter()
            .map(|rule| rule.import.module.as_str())
            .collect()
    }

    /// Runs the pipeline over the source of the module at `path`.
    pub fn apply(&self, path: &Path, source: &str, mode: Mode, release: bool) -> String {
        let rewritten = rewrite_file(path, source, &self.callee_rewrites);
        if Self::strips_diagnostics(mode, release) {
            self.diagnostic_strip.strip(&rewritten)
        } else {
            rewritten
        }
    }

    /// Loader plugin entry for the callee rewrite table.
    pub fn rewrite_plugin(&self) -> Value {
        json!([
            CALLEE_REWRITE_PLUGIN,
            {
                "rules": self.callee_rewrites,
                "skip": self.import_targets(),
            }
        ])
    }

    /// Loader plugin entry for diagnostic stripping, when active for `mode`.
    pub fn strip_plugin(&self, mode: Mode, release: bool) -> Option<Value> {
        Self::strips_diagnostics(mode, release).then(|| {
            json!([
                DIAGNOSTIC_STRIP_PLUGIN,
                { "exclude": self.diagnostic_strip.allowed }
            ])
        })
    }
}
