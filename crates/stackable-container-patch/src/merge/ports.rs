use std::{
    collections::{HashMap, HashSet, hash_map::Entry},
    fmt::Display,
};

use k8s_openapi::api::core::v1::ContainerPort;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use snafu::Snafu;
use strum::{AsRefStr, EnumString};

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum Error {
    #[snafu(display("port {key} is listed more than once"))]
    DuplicatePortKey { key: PortKey },
}

/// The protocol Kubernetes assumes for ports without an explicit protocol.
const DEFAULT_PROTOCOL: &str = "TCP";

/// The protocol of a container port.
#[derive(
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    EnumString,
    Eq,
    Hash,
    JsonSchema,
    PartialEq,
    Serialize,
    strum::Display,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Sctp,
}

/// A port requested by the container-ports trait.
#[derive(Clone, Debug, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortParams {
    /// Number of port to expose on the pod's IP address.
    pub container_port: i32,

    /// Protocol for port. Must be UDP, TCP, or SCTP.
    #[serde(default)]
    pub protocol: Protocol,

    /// Number of port to expose on the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_port: Option<i32>,

    /// What host IP to bind the external port to.
    #[serde(default, rename = "hostIP", skip_serializing_if = "Option::is_none")]
    pub host_ip: Option<String>,
}

impl PortParams {
    pub fn new(container_port: i32, protocol: Protocol) -> Self {
        Self {
            container_port,
            protocol,
            host_port: None,
            host_ip: None,
        }
    }

    fn to_container_port(&self) -> ContainerPort {
        ContainerPort {
            container_port: self.container_port,
            protocol: Some(self.protocol.to_string()),
            host_port: self.host_port,
            host_ip: self.host_ip.clone(),
            ..Default::default()
        }
    }
}

/// Identifies a port across the base and the requested ports: the lower-cased protocol together
/// with the container port.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PortKey {
    protocol: String,
    container_port: i32,
}

impl PortKey {
    pub fn new(protocol: &str, container_port: i32) -> Self {
        Self {
            protocol: protocol.to_lowercase(),
            container_port,
        }
    }
}

impl Display for PortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.container_port, self.protocol)
    }
}

impl From<&ContainerPort> for PortKey {
    fn from(port: &ContainerPort) -> Self {
        let protocol = port.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL);
        Self::new(protocol, port.container_port)
    }
}

impl From<&PortParams> for PortKey {
    fn from(port: &PortParams) -> Self {
        Self::new(port.protocol.as_ref(), port.container_port)
    }
}

/// Merges the requested `ports` into the ports of a container.
///
/// Base ports keep their position and all of their fields. If a requested port has the same
/// [`PortKey`], its `hostPort` and `hostIP` (when given) override the base values. Requested
/// ports without a base counterpart are appended in request order, carrying only the fields
/// that were requested (no `name` is made up).
///
/// Requesting the same [`PortKey`] twice is ambiguous and rejected.
pub fn merge_ports(
    base: Option<&[ContainerPort]>,
    ports: &[PortParams],
) -> Result<Vec<ContainerPort>, Error> {
    let mut requested = HashMap::with_capacity(ports.len());
    for port in ports {
        match requested.entry(PortKey::from(port)) {
            Entry::Occupied(entry) => {
                return DuplicatePortKeySnafu {
                    key: entry.key().clone(),
                }
                .fail();
            }
            Entry::Vacant(entry) => {
                entry.insert(port);
            }
        }
    }

    let base = base.unwrap_or_default();
    let base_keys: HashSet<PortKey> = base.iter().map(PortKey::from).collect();

    let kept = base.iter().map(|base_port| {
        let mut port = base_port.clone();
        if let Some(update) = requested.get(&PortKey::from(base_port)) {
            if let Some(host_port) = update.host_port {
                port.host_port = Some(host_port);
            }
            if let Some(host_ip) = &update.host_ip {
                port.host_ip = Some(host_ip.clone());
            }
        }
        port
    });
    let added = ports
        .iter()
        .filter(|port| !base_keys.contains(&PortKey::from(*port)))
        .map(PortParams::to_container_port);

    Ok(kept.chain(added).collect())
}
