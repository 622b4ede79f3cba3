use k8s_openapi::api::core::v1::Container;
use snafu::OptionExt;

use super::{ContainerNotFoundSnafu, Result};

/// Returns `requested`, or `default` if no container name was requested.
pub fn effective_container_name<'a>(requested: &'a str, default: &'a str) -> &'a str {
    if requested.is_empty() {
        default
    } else {
        requested
    }
}

/// Finds the container named exactly `name`.
///
/// Container names are unique within a pod, so the first match is the only one.
pub fn resolve_container<'a>(containers: &'a [Container], name: &str) -> Result<&'a Container> {
    containers
        .iter()
        .find(|container| container.name == name)
        .context(ContainerNotFoundSnafu { name })
}
