use std::sync::LazyLock;

use k8s_openapi::api::core::v1::Container;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::{
    field::{FieldGroup, FieldRule, MergeStrategy},
    patch::{ApplyFieldRulesSnafu, ContainerPatch, Result},
};

static FIELD_RULES: LazyLock<FieldGroup> = LazyLock::new(|| {
    FieldGroup::root()
        .with_field(FieldRule::new("image").with_strategy(MergeStrategy::RetainUnlisted))
        .with_field(
            FieldRule::new("imagePullPolicy")
                .non_empty()
                .with_strategy(MergeStrategy::RetainUnlisted),
        )
});

/// The image pull policy of a container. [`ImagePullPolicy::Unchanged`] keeps the policy of the
/// base container.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
pub enum ImagePullPolicy {
    #[default]
    #[serde(rename = "")]
    Unchanged,
    IfNotPresent,
    Always,
    Never,
}

/// Parameters of the `container-image` trait.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerImageParams {
    /// Specify the name of the target container, if not set, use the component name.
    #[serde(default)]
    pub container_name: String,

    /// Specify the image of the container.
    pub image: String,

    /// Specify the image pull policy of the container.
    #[serde(default)]
    pub image_pull_policy: ImagePullPolicy,
}

impl ContainerPatch for ContainerImageParams {
    fn container_name(&self) -> &str {
        &self.container_name
    }

    fn patch_container(&self, base: &Container) -> Result<Container> {
        FIELD_RULES
            .patch_container(self, base)
            .context(ApplyFieldRulesSnafu {
                container_name: &base.name,
            })
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;

    use super::*;
    use crate::patch::{Dispatch, patch_containers};

    fn containers() -> Vec<Container> {
        serde_yaml::from_str(indoc! {"
            - name: app
              image: app:1
              imagePullPolicy: IfNotPresent
              volumeMounts:
              - name: data
                mountPath: /data
            - name: sidecar
              image: sidecar:1
        "})
        .expect("test YAML is valid")
    }

    #[rstest]
    #[case::keep_policy("image: app:2\n", Some("IfNotPresent"))]
    #[case::explicit_empty_policy("image: app:2\nimagePullPolicy: ''\n", Some("IfNotPresent"))]
    #[case::set_policy("image: app:2\nimagePullPolicy: Always\n", Some("Always"))]
    fn image_and_pull_policy(#[case] params: &str, #[case] expected_policy: Option<&str>) {
        let dispatch: Dispatch<ContainerImageParams> =
            serde_yaml::from_str(params).expect("test YAML is valid");

        let patched = patch_containers(&containers(), &dispatch, "app")
            .into_result()
            .expect("app container exists");

        assert_eq!(patched[0].image.as_deref(), Some("app:2"));
        assert_eq!(patched[0].image_pull_policy.as_deref(), expected_policy);
        assert_eq!(patched[0].volume_mounts, containers()[0].volume_mounts);
    }

    #[test]
    fn multiple_containers() {
        let dispatch: Dispatch<ContainerImageParams> = serde_yaml::from_str(indoc! {"
            containers:
            - containerName: app
              image: app:3
            - containerName: sidecar
              image: sidecar:3
              imagePullPolicy: Never
        "})
        .expect("test YAML is valid");

        let patched = patch_containers(&containers(), &dispatch, "app")
            .into_result()
            .expect("containers exist");

        let images: Vec<_> = patched
            .iter()
            .map(|c| (c.image.as_deref(), c.image_pull_policy.as_deref()))
            .collect();
        assert_eq!(
            images,
            [
                (Some("app:3"), Some("IfNotPresent")),
                (Some("sidecar:3"), Some("Never")),
            ]
        );
    }

    #[test]
    fn unknown_pull_policy_is_rejected() {
        let result =
            serde_yaml::from_str::<Dispatch<ContainerImageParams>>("image: a\nimagePullPolicy: Sometimes\n");

        assert!(result.is_err());
    }
}
