use indexmap::IndexMap;
use k8s_openapi::api::core::v1::Container;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    merge::env::merge_env,
    patch::{ContainerPatch, Result},
};

/// Parameters of the `env` trait.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvParams {
    /// Specify the name of the target container, if not set, use the component name.
    #[serde(default)]
    pub container_name: String,

    /// Specify if replacing the whole environment settings for the container.
    #[serde(default)]
    pub replace: bool,

    /// Specify the environment variables to merge, if key already existing, override its value.
    #[serde(default)]
    pub env: IndexMap<String, String>,

    /// Specify which existing environment variables to unset.
    #[serde(default)]
    pub unset: Vec<String>,
}

impl ContainerPatch for EnvParams {
    fn container_name(&self) -> &str {
        &self.container_name
    }

    fn patch_container(&self, base: &Container) -> Result<Container> {
        let env = merge_env(base.env.as_deref(), &self.env, &self.unset, self.replace);

        let mut container = base.clone();
        container.env = match (env.is_empty(), &base.env) {
            (true, None) => None,
            _ => Some(env),
        };
        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use k8s_openapi::api::core::v1::EnvVar;

    use super::*;
    use crate::patch::{Dispatch, patch_containers};

    fn containers() -> Vec<Container> {
        serde_yaml::from_str(indoc! {"
            - name: app
              env:
              - name: A
                value: '1'
              - name: PASSWORD
                valueFrom:
                  secretKeyRef:
                    name: credentials
                    key: password
            - name: sidecar
        "})
        .expect("test YAML is valid")
    }

    fn patch(yaml: &str) -> Vec<Container> {
        let dispatch: Dispatch<EnvParams> = serde_yaml::from_str(yaml).expect("test YAML is valid");
        patch_containers(&containers(), &dispatch, "app")
            .into_result()
            .expect("containers exist")
    }

    #[test]
    fn empty_parameters_are_idempotent() {
        let patched = patch("env: {}\nunset: []\n");

        assert_eq!(patched, vec![containers()[0].clone()]);
    }

    #[test]
    fn merge_keeps_value_from() {
        let patched = patch(indoc! {"
            env:
              B: '2'
              A: overridden
        "});

        let expected: Vec<EnvVar> = serde_yaml::from_str(indoc! {"
            - name: A
              value: overridden
            - name: PASSWORD
              valueFrom:
                secretKeyRef:
                  name: credentials
                  key: password
            - name: B
              value: '2'
        "})
        .expect("test YAML is valid");

        assert_eq!(patched[0].env, Some(expected));
    }

    #[test]
    fn unset_wins() {
        let patched = patch(indoc! {"
            env:
              A: '2'
            unset: [A, PASSWORD]
        "});

        assert_eq!(patched[0].env, Some(Vec::new()));
    }

    #[test]
    fn replace_for_multiple_containers() {
        let patched = patch(indoc! {"
            containers:
            - containerName: app
              replace: true
              env:
                C: '3'
            - containerName: sidecar
              env:
                D: '4'
        "});

        let names = |container: &Container| -> Vec<String> {
            container
                .env
                .iter()
                .flatten()
                .map(|env_var| env_var.name.clone())
                .collect()
        };
        assert_eq!(names(&patched[0]), ["C"]);
        assert_eq!(names(&patched[1]), ["D"]);
    }

    #[test]
    fn container_without_env_stays_without_env() {
        let patched = patch("containerName: sidecar\n");

        assert_eq!(patched[0].env, None);
    }
}
