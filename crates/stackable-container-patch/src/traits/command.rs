use k8s_openapi::api::core::v1::Container;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::{
    merge::args::merge_args,
    patch::{ConflictingOptionsSnafu, ContainerPatch, Result},
};

/// Parameters of the `command` trait.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandParams {
    /// Specify the name of the target container, if not set, use the component name.
    #[serde(default)]
    pub container_name: String,

    /// Specify the command to use in the target container, if not set, it will not be changed.
    #[serde(default)]
    pub command: Option<Vec<String>>,

    /// Specify the args to use in the target container, if set, it will override existing args.
    #[serde(default)]
    pub args: Option<Vec<String>>,

    /// Specify the args to add in the target container, existing args will be kept, cannot be
    /// used with `args`.
    #[serde(default)]
    pub add_args: Option<Vec<String>>,

    /// Specify the existing args to delete in the target container, cannot be used with `args`.
    #[serde(default)]
    pub del_args: Option<Vec<String>>,
}

impl CommandParams {
    fn changes_args(&self) -> bool {
        self.args.is_some() || self.add_args.is_some() || self.del_args.is_some()
    }
}

impl ContainerPatch for CommandParams {
    fn container_name(&self) -> &str {
        &self.container_name
    }

    fn patch_container(&self, base: &Container) -> Result<Container> {
        ensure!(
            self.args.is_none() || (self.add_args.is_none() && self.del_args.is_none()),
            ConflictingOptionsSnafu {
                container_name: &base.name,
                options: "addArgs/delArgs and args",
            }
        );

        let mut container = base.clone();
        if let Some(command) = &self.command {
            container.command = Some(command.clone());
        }
        if self.changes_args() {
            container.args = Some(merge_args(
                base.args.as_deref(),
                self.args.as_deref(),
                self.add_args.as_deref(),
                self.del_args.as_deref(),
            ));
        }

        Ok(container)
    }
}
