use std::collections::HashSet;

use indexmap::IndexMap;
use k8s_openapi::api::core::v1::EnvVar;

/// Merges the environment variables of a container.
///
/// - Every name listed in `unset` is removed, even if `overrides` sets it as well.
/// - With `replace`, the result consists of the `overrides` only.
/// - Otherwise every base variable keeps its position. A variable named in `overrides` gets the
///   new value (dropping any `valueFrom`), all others are kept verbatim. Variables from
///   `overrides` that don't exist in the base yet are appended in declaration order.
pub fn merge_env(
    base: Option<&[EnvVar]>,
    overrides: &IndexMap<String, String>,
    unset: &[String],
    replace: bool,
) -> Vec<EnvVar> {
    let unset: HashSet<&str> = unset.iter().map(String::as_str).collect();
    let base = if replace {
        &[][..]
    } else {
        base.unwrap_or_default()
    };
    let base_names: HashSet<&str> = base.iter().map(|env_var| env_var.name.as_str()).collect();

    let kept = base
        .iter()
        .filter(|env_var| !unset.contains(env_var.name.as_str()))
        .map(|env_var| match overrides.get(&env_var.name) {
            Some(value) => value_env_var(&env_var.name, value),
            None => env_var.clone(),
        });
    let added = overrides
        .iter()
        .filter(|(name, _)| !unset.contains(name.as_str()) && !base_names.contains(name.as_str()))
        .map(|(name, value)| value_env_var(name, value));

    kept.chain(added).collect()
}

fn value_env_var(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.to_owned(),
        value: Some(value.to_owned()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use k8s_openapi::api::core::v1::{EnvVarSource, SecretKeySelector};

    use super::*;

    fn env(yaml: &str) -> Vec<EnvVar> {
        serde_yaml::from_str(yaml).expect("test YAML is valid")
    }

    fn overrides(entries: &[(&str, &str)]) -> IndexMap<String, String> {
        entries
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect()
    }

    fn secret_ref() -> EnvVarSource {
        EnvVarSource {
            secret_key_ref: Some(SecretKeySelector {
                name: "credentials".to_owned(),
                key: "password".to_owned(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn empty_parameters_keep_base() {
        let base = env(indoc! {"
            - name: A
              value: '1'
        "});

        let merged = merge_env(Some(&base), &IndexMap::new(), &[], false);

        assert_eq!(merged, base);
    }

    #[test]
    fn value_from_is_kept_when_not_overridden() {
        let base = vec![EnvVar {
            name: "A".to_owned(),
            value_from: Some(secret_ref()),
            ..Default::default()
        }];

        let merged = merge_env(Some(&base), &overrides(&[("B", "2")]), &[], false);

        assert_eq!(merged, vec![base[0].clone(), value_env_var("B", "2")]);
    }

    #[test]
    fn override_drops_value_from() {
        let base = vec![
            EnvVar {
                name: "A".to_owned(),
                value_from: Some(secret_ref()),
                ..Default::default()
            },
            value_env_var("B", "1"),
        ];

        let merged = merge_env(Some(&base), &overrides(&[("A", "plain")]), &[], false);

        assert_eq!(merged, vec![value_env_var("A", "plain"), value_env_var("B", "1")]);
    }

    #[test]
    fn unset_wins_over_override() {
        let base = vec![value_env_var("A", "1")];

        let merged = merge_env(
            Some(&base),
            &overrides(&[("A", "2")]),
            &["A".to_owned()],
            false,
        );

        assert!(merged.iter().all(|env_var| env_var.name != "A"));
    }

    #[test]
    fn unset_removes_new_variables() {
        let merged = merge_env(
            None,
            &overrides(&[("A", "1"), ("B", "2")]),
            &["B".to_owned()],
            false,
        );

        assert_eq!(merged, vec![value_env_var("A", "1")]);
    }

    #[test]
    fn base_order_is_kept_and_new_variables_are_appended_in_order() {
        let base = env(indoc! {"
            - name: C
              value: c
            - name: A
              value: a
            - name: B
              value: b
        "});

        let merged = merge_env(
            Some(&base),
            &overrides(&[("Z", "z"), ("A", "new"), ("Y", "y")]),
            &["B".to_owned()],
            false,
        );

        let pairs: Vec<_> = merged
            .iter()
            .map(|env_var| (env_var.name.as_str(), env_var.value.as_deref()))
            .collect();
        assert_eq!(
            pairs,
            [
                ("C", Some("c")),
                ("A", Some("new")),
                ("Z", Some("z")),
                ("Y", Some("y")),
            ]
        );
    }

    #[test]
    fn replace_discards_base() {
        let base = env(indoc! {"
            - name: A
              value: a
            - name: B
              value: b
        "});

        let merged = merge_env(
            Some(&base),
            &overrides(&[("B", "new"), ("C", "c"), ("D", "d")]),
            &["D".to_owned()],
            true,
        );

        assert_eq!(merged, vec![value_env_var("B", "new"), value_env_var("C", "c")]);
    }
}
