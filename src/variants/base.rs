//! Shared defaults merged underneath every variant.

use serde_json::{Value, json};
use std::path::Path;

/// Loader whose options carry the rewrite plugins.
pub const SOURCE_LOADER: &str = "babel-loader";

/// Browser targets the transpiler lowers syntax for.
pub const BROWSER_TARGETS: &[&str] = &[
    "chrome >= 47",
    "firefox >= 51",
    "safari >= 8",
    "ios >= 8",
    "android >= 4",
];

/// Base configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseDescriptor {
    value: Value,
}

impl BaseDescriptor {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Standard defaults for a library rooted at `root`.
    pub fn standard(root: &Path) -> Self {
        let node_modules = root.join("node_modules");
        Self {
            value: json!({
                "mode": "development",
                "entry": "./src/hls",
                "optimization": {
                    "splitChunks": false,
                    // Worker inlining breaks when unused exports are pruned.
                    "usedExports": false,
                },
                "resolve": {
                    "extensions": [".ts", ".js"],
                },
                "module": {
                    "strictExportPresence": true,
                    "rules": [{
                        "test": "\\.(ts|js)$",
                        "exclude": [node_modules.to_string_lossy()],
                        "loader": SOURCE_LOADER,
                        "options": {
                            "babelrc": false,
                            "presets": [
                                ["@babel/preset-typescript", { "optimizeConstEnums": true }],
                                ["@babel/preset-env", {
                                    "loose": true,
                                    "modules": false,
                                    "targets": { "browsers": BROWSER_TARGETS },
                                }],
                            ],
                            "plugins": [
                                ["@babel/plugin-proposal-class-properties", { "loose": true }],
                                "@babel/plugin-proposal-object-rest-spread",
                                ["@babel/plugin-transform-object-assign"],
                                ["@babel/plugin-proposal-optional-chaining"],
                            ],
                        },
                    }],
                },
            }),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns a copy of the base with extra plugins on the source loader.
    ///
    /// `rewrites` run right after object-rest-spread and before the
    /// object-assign transform. `trailing` plugins run last. Without a
    /// source loader rule the copy is returned unchanged.
    pub fn with_loader_plugins(&self, rewrites: Vec<Value>, trailing: Vec<Value>) -> Self {
        let mut value = self.value.clone();
        let loader_plugins = value
            .pointer_mut("/module/rules")
            .and_then(Value::as_array_mut)
            .and_then(|rules| {
                rules
                    .iter_mut()
                    .find(|rule| rule.get("loader").and_then(Value::as_str) == Some(SOURCE_LOADER))
            })
            .and_then(|rule| rule.pointer_mut("/options/plugins"))
            .and_then(Value::as_array_mut);

        match loader_plugins {
            Some(existing) => {
                let at = existing
                    .iter()
                    .position(|plugin| plugin_name(plugin) == Some(REWRITE_ANCHOR))
                    .map_or(existing.len(), |n| n + 1);
                let after = existing.split_off(at);
                existing.extend(rewrites);
                existing.extend(after);
                existing.extend(trailing);
            }
            None => log::warn!("Base descriptor has no {SOURCE_LOADER} rule; rewrite plugins not attached"),
        }
        Self { value }
    }
}

/// Plugin the rewrite plugins are placed after.
const REWRITE_ANCHOR: &str = "@babel/plugin-proposal-object-rest-spread";

/// Name of a loader plugin given as `"name"` or `["name", options]`.
fn plugin_name(plugin: &Value) -> Option<&str> {
    match plugin {
        Value::String(name) => Some(name.as_str()),
        Value::Array(entry) => entry.first().and_then(Value::as_str),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_plugins_are_placed_without_touching_the_original() {
        let base = BaseDescriptor::standard(Path::new("/repo"));
        let extended = base.with_loader_plugins(vec![json!(["rewrite", {}])], vec![json!(["strip", {}])]);

        let names = |b: &BaseDescriptor| -> Vec<String> {
            b.value()
                .pointer("/module/rules/0/options/plugins")
                .and_then(Value::as_array)
                .map(|plugins| {
                    plugins
                        .iter()
                        .filter_map(plugin_name)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };
        assert_eq!(names(&base).len(), 4);
        assert_eq!(
            names(&extended),
            vec![
                "@babel/plugin-proposal-class-properties",
                "@babel/plugin-proposal-object-rest-spread",
                "rewrite",
                "@babel/plugin-transform-object-assign",
                "@babel/plugin-proposal-optional-chaining",
                "strip",
            ]
        );
    }

    #[test]
    fn exclude_is_rooted() {
        let base = BaseDescriptor::standard(Path::new("/repo"));
        assert_eq!(
            base.value().pointer("/module/rules/0/exclude/0"),
            Some(&json!("/repo/node_modules"))
        );
    }
}
