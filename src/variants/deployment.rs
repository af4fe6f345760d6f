//! Release/deployment metadata read from the CI environment.

use super::features::EnvSnapshot;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Environment variable that marks a release deployment build.
pub const RELEASE_FLAG: &str = "NETLIFY";

static LEADING_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("leading integer pattern is valid"));

/// Deployment context of the current invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deployment {
    /// Set when the build runs as a release deployment.
    ///
    /// Forces diagnostic stripping on every variant.
    pub release: bool,

    /// Metadata injected into variants that declare it; `None` outside a
    /// release deployment.
    pub metadata: Option<DeploymentMetadata>,
}

/// Branch, commit and review identifier of a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_ref: Option<String>,

    /// Review number for pull-request deploys, `null` otherwise.
    #[serde(rename = "reviewID")]
    pub review_id: Option<i64>,
}

impl Deployment {
    /// Reads the deployment context from an environment snapshot.
    pub fn resolve(env: &EnvSnapshot) -> Self {
        if !env.is_literal_true(RELEASE_FLAG) {
            return Self::default();
        }

        let review_id = if env.is_literal_true("PULL_REQUEST") {
            env.get("REVIEW_ID").and_then(parse_leading_int)
        } else {
            None
        };

        Self {
            release: true,
            metadata: Some(DeploymentMetadata {
                branch: env.get("BRANCH").map(str::to_string),
                commit_ref: env.get("COMMIT_REF").map(str::to_string),
                review_id,
            }),
        }
    }

    /// Metadata as a JSON literal; `{}` when not deploying.
    pub fn metadata_value(&self) -> serde_json::Value {
        match &self.metadata {
            Some(meta) => serde_json::to_value(meta)
                .unwrap_or_else(|_| serde_json::Value::Object(Default::default())),
            None => serde_json::Value::Object(Default::default()),
        }
    }
}

/// Parses the leading decimal integer of a string, ignoring trailing junk.
fn parse_leading_int(raw: &str) -> Option<i64> {
    LEADING_INT
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outside_release_metadata_is_empty_object() {
        let deployment = Deployment::resolve(&EnvSnapshot::default());
        assert!(!deployment.release);
        assert_eq!(deployment.metadata_value(), json!({}));
    }

    #[test]
    fn release_flag_must_be_literal_true() {
        let env: EnvSnapshot = [("NETLIFY", "1")].into_iter().collect();
        assert!(!Deployment::resolve(&env).release);
    }

    #[test]
    fn pull_request_review_id_is_parsed() {
        let env: EnvSnapshot = [
            ("NETLIFY", "true"),
            ("BRANCH", "feature/x"),
            ("COMMIT_REF", "abc123"),
            ("PULL_REQUEST", "true"),
            ("REVIEW_ID", "4521abc"),
        ]
        .into_iter()
        .collect();
        let deployment = Deployment::resolve(&env);
        assert!(deployment.release);
        assert_eq!(
            deployment.metadata_value(),
            json!({"branch": "feature/x", "commitRef": "abc123", "reviewID": 4521})
        );
    }

    #[test]
    fn non_pull_request_review_id_is_null() {
        let env: EnvSnapshot = [("NETLIFY", "true"), ("REVIEW_ID", "7")].into_iter().collect();
        assert_eq!(
            Deployment::resolve(&env).metadata_value(),
            json!({"reviewID": null})
        );
    }

    #[test]
    fn unparsable_review_id_is_null() {
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(" -12x"), Some(-12));
    }
}
