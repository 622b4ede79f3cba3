use k8s_openapi::api::core::v1::Container;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::{
    merge::ports::{PortParams, merge_ports},
    patch::{ContainerPatch, MergePortsSnafu, Result},
};

/// Parameters of the `container-ports` trait.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPortsParams {
    /// Specify the name of the target container, if not set, use the component name.
    #[serde(default)]
    pub container_name: String,

    /// Specify ports you want customer traffic sent to.
    #[serde(default)]
    pub ports: Vec<PortParams>,
}

impl ContainerPatch for ContainerPortsParams {
    fn container_name(&self) -> &str {
        &self.container_name
    }

    fn patch_container(&self, base: &Container) -> Result<Container> {
        let ports = merge_ports(base.ports.as_deref(), &self.ports).context(MergePortsSnafu {
            container_name: &base.name,
        })?;

        let mut container = base.clone();
        container.ports = match (ports.is_empty(), &base.ports) {
            (true, None) => None,
            _ => Some(ports),
        };
        Ok(container)
    }
}
