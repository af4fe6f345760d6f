//! Selection of assembled configurations by requested name.

use super::ConcreteConfig;
use crate::error::ConfigNotFoundError;
use regex::Regex;
use std::sync::LazyLock;

/// Requested keys the bundler adds for its own bookkeeping.
static RESERVED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^WEBPACK_").expect("reserved key pattern is valid"));

/// Whether a requested key is bundler invocation metadata rather than a
/// variant name.
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEY.is_match(key)
}

/// Picks the configurations to build.
///
/// An empty request (after reserved keys are dropped) selects everything.
/// Otherwise every configuration whose name was requested is kept in
/// catalog order, so duplicate-named entries are all returned.
///
/// # Errors
///
/// Returns [`ConfigNotFoundError`] when no configuration matches.
pub fn select<S: AsRef<str>>(
    requested: &[S],
    configs: Vec<ConcreteConfig>,
) -> Result<Vec<ConcreteConfig>, ConfigNotFoundError> {
    let requested = variant_names(requested);

    let selected = if requested.is_empty() {
        configs
    } else {
        let known: Vec<String> = configs.iter().map(|c| c.name().to_string()).collect();
        let enabled: Vec<ConcreteConfig> = configs
            .into_iter()
            .filter(|c| requested.contains(&c.name()))
            .collect();
        if enabled.is_empty() {
            return Err(ConfigNotFoundError {
                requested: requested.iter().map(|s| s.to_string()).collect(),
                known,
            });
        }
        enabled
    };

    log::info!("{}", summary(&selected));
    Ok(selected)
}

/// Checks a request against catalog names before anything is assembled.
///
/// # Errors
///
/// Returns the same [`ConfigNotFoundError`] that [`select`] would.
pub fn check_requested<S: AsRef<str>>(
    requested: &[S],
    known: &[String],
) -> Result<(), ConfigNotFoundError> {
    let requested = variant_names(requested);
    if requested.is_empty() || requested.iter().any(|name| known.iter().any(|k| k == name)) {
        return Ok(());
    }
    Err(ConfigNotFoundError {
        requested: requested.iter().map(|s| s.to_string()).collect(),
        known: known.to_vec(),
    })
}

fn variant_names<S: AsRef<str>>(requested: &[S]) -> Vec<&str> {
    requested
        .iter()
        .map(AsRef::as_ref)
        .filter(|key| !is_reserved(key))
        .collect()
}

/// One-line description of a selection.
pub fn summary(configs: &[ConcreteConfig]) -> String {
    let names: Vec<&str> = configs.iter().map(ConcreteConfig::name).collect();
    format!("Building configs: {}.", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::TransformRuleSet;
    use crate::variants::{BaseDescriptor, ConfigAssembler, Deployment, FeatureSet, VariantRegistry};
    use std::path::Path;

    fn configs() -> Vec<ConcreteConfig> {
        let root = Path::new("/repo");
        let base = BaseDescriptor::standard(root);
        let rules = TransformRuleSet::standard("/repo/src/polyfills/number");
        ConfigAssembler::new(&base, &rules, false).assemble_all(
            &VariantRegistry::standard(root).unwrap(),
            &FeatureSet::none(),
            &Deployment::default(),
            "1.0.0",
        )
    }

    fn names(configs: &[ConcreteConfig]) -> Vec<&str> {
        configs.iter().map(ConcreteConfig::name).collect()
    }

    #[test]
    fn empty_request_selects_everything_in_order() {
        let all = configs();
        let selected = select::<&str>(&[], all.clone()).unwrap();
        assert_eq!(selected, all);
    }

    #[test]
    fn reserved_keys_alone_select_everything() {
        let selected = select(&["WEBPACK_BUNDLE", "WEBPACK_BUILD"], configs()).unwrap();
        assert_eq!(selected.len(), 7);
    }

    #[test]
    fn duplicate_names_are_all_returned() {
        let selected = select(&["debug"], configs()).unwrap();
        assert_eq!(names(&selected), vec!["debug", "debug"]);
        assert_ne!(selected[0].value()["output"]["path"], selected[1].value()["output"]["path"]);
    }

    #[test]
    fn selection_keeps_catalog_order() {
        let selected = select(&["demo", "dist", "WEBPACK_SERVE"], configs()).unwrap();
        assert_eq!(names(&selected), vec!["dist", "demo", "demo"]);
    }

    #[test]
    fn unknown_names_report_every_known_name() {
        let err = select(&["not-a-real-name"], configs()).unwrap_err();
        assert_eq!(err.requested, vec!["not-a-real-name"]);
        assert_eq!(
            err.known,
            vec!["debug", "dist", "light", "light-dist", "demo", "debug", "demo"]
        );
    }

    #[test]
    fn partially_valid_request_keeps_the_matches() {
        let selected = select(&["light", "nope"], configs()).unwrap();
        assert_eq!(names(&selected), vec!["light"]);
    }

    #[test]
    fn summary_names_selected_configs() {
        let selected = select(&["light", "dist"], configs()).unwrap();
        assert_eq!(summary(&selected), "Building configs: dist, light.");
    }

    #[test]
    fn request_check_matches_select() {
        let known: Vec<String> = names(&configs()).into_iter().map(str::to_string).collect();
        assert!(check_requested::<&str>(&[], &known).is_ok());
        assert!(check_requested(&["WEBPACK_BUNDLE", "light"], &known).is_ok());

        let err = check_requested(&["not-a-real-name", "WEBPACK_BUNDLE"], &known).unwrap_err();
        assert_eq!(err, select(&["not-a-real-name"], configs()).unwrap_err());
    }
}
