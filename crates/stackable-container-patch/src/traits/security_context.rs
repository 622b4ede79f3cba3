use std::sync::LazyLock;

use k8s_openapi::api::core::v1::Container;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::{
    field::{FieldGroup, FieldRule},
    patch::{ApplyFieldRulesSnafu, ContainerPatch, Result},
};

// Keys of the securityContext that are not listed here (e.g. seccompProfile) are retained.
static FIELD_RULES: LazyLock<FieldGroup> = LazyLock::new(|| {
    FieldGroup::new("securityContext")
        .with_fields([
            FieldRule::new("allowPrivilegeEscalation").with_default(false),
            FieldRule::new("readOnlyRootFilesystem").with_default(false),
            FieldRule::new("privileged").with_default(false),
            FieldRule::new("runAsNonRoot").with_default(true),
            FieldRule::new("runAsUser").is_set(),
            FieldRule::new("runAsGroup").is_set(),
        ])
        .with_group(FieldGroup::new("capabilities").with_fields([
            FieldRule::new("addCapabilities").target("add").is_set(),
            FieldRule::new("dropCapabilities").target("drop").is_set(),
        ]))
});

/// Parameters of the `securitycontext` trait.
// The flags mirror the boolean fields of the Kubernetes SecurityContext
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityContextParams {
    /// Specify the name of the target container, if not set, use the component name.
    #[serde(default)]
    pub container_name: String,

    /// Controls whether a process can gain more privileges than its parent process.
    #[serde(default)]
    pub allow_privilege_escalation: bool,

    /// Mounts the container's root filesystem as read-only.
    #[serde(default)]
    pub read_only_root_filesystem: bool,

    /// Runs the container in privileged mode.
    #[serde(default)]
    pub privileged: bool,

    /// Requires the container to run as a non-root user.
    #[serde(default = "SecurityContextParams::default_run_as_non_root")]
    pub run_as_non_root: bool,

    /// The UID to run the entrypoint of the container process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_user: Option<i64>,

    /// The GID to run the entrypoint of the container process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_group: Option<i64>,

    /// Specify the capabilities to add.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_capabilities: Option<Vec<String>>,

    /// Specify the capabilities to drop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_capabilities: Option<Vec<String>>,
}

impl SecurityContextParams {
    const fn default_run_as_non_root() -> bool {
        true
    }
}

impl Default for SecurityContextParams {
    fn default() -> Self {
        Self {
            container_name: String::new(),
            allow_privilege_escalation: false,
            read_only_root_filesystem: false,
            privileged: false,
            run_as_non_root: Self::default_run_as_non_root(),
            run_as_user: None,
            run_as_group: None,
            add_capabilities: None,
            drop_capabilities: None,
        }
    }
}

impl ContainerPatch for SecurityContextParams {
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
