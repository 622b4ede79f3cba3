use std::sync::LazyLock;

use k8s_openapi::api::core::v1::{Container, ExecAction, GRPCAction, HTTPGetAction, TCPSocketAction};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::{
    field::{FieldGroup, FieldRule, MergeStrategy},
    patch::{ApplyFieldRulesSnafu, ContainerPatch, Result},
};

const DEFAULT_INITIAL_DELAY_SECONDS: i32 = 0;
const DEFAULT_PERIOD_SECONDS: i32 = 10;
const DEFAULT_TIMEOUT_SECONDS: i32 = 1;
const DEFAULT_SUCCESS_THRESHOLD: i32 = 1;
const DEFAULT_FAILURE_THRESHOLD: i32 = 3;

// The startupProbe is replaced as a whole, so handlers of a previous probe never leak into the
// new one.
static FIELD_RULES: LazyLock<FieldGroup> = LazyLock::new(|| {
    FieldGroup::new("startupProbe")
        .with_strategy(MergeStrategy::Replace)
        .with_fields([
            FieldRule::new("exec").is_set(),
            FieldRule::new("httpGet").is_set(),
            FieldRule::new("grpc").is_set(),
            FieldRule::new("tcpSocket").is_set(),
            FieldRule::new("initialDelaySeconds")
                .is_set()
                .with_default(DEFAULT_INITIAL_DELAY_SECONDS),
            FieldRule::new("periodSeconds")
                .is_set()
                .with_default(DEFAULT_PERIOD_SECONDS),
            FieldRule::new("timeoutSeconds")
                .is_set()
                .with_default(DEFAULT_TIMEOUT_SECONDS),
            FieldRule::new("successThreshold")
                .is_set()
                .with_default(DEFAULT_SUCCESS_THRESHOLD),
            FieldRule::new("failureThreshold")
                .is_set()
                .with_default(DEFAULT_FAILURE_THRESHOLD),
            FieldRule::new("terminationGracePeriodSeconds").is_set(),
        ])
});

/// Parameters of the `startup-probe` trait.
///
/// Exactly one of the handlers (`exec`, `httpGet`, `grpc`, `tcpSocket`) is expected to be set.
/// Multiple probes are passed as a list under `probes`.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupProbeParams {
    /// Specify the name of the target container, if not set, use the component name.
    #[serde(default)]
    pub container_name: String,

    /// Instructions for assessing container startup status by executing a command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<ExecAction>,

    /// Instructions for assessing container startup status by executing an HTTP GET request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_get: Option<HTTPGetAction>,

    /// Instructions for assessing container startup status by probing a gRPC service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc: Option<GRPCAction>,

    /// Instructions for assessing container startup status by probing a TCP socket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_socket: Option<TCPSocketAction>,

    /// Number of seconds after the container has started before probes are initiated.
    #[serde(default = "default_initial_delay_seconds")]
    pub initial_delay_seconds: i32,

    /// How often, in seconds, to execute the probe.
    #[serde(default = "default_period_seconds")]
    pub period_seconds: i32,

    /// Number of seconds after which the probe times out.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: i32,

    /// Minimum consecutive successes for the probe to be considered successful after having
    /// failed.
    #[serde(default = "default_success_threshold")]
    pub success_threshold: i32,

    /// Minimum consecutive failures for the probe to be considered failed after having
    /// succeeded.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: i32,

    /// Optional duration in seconds the pod needs to terminate gracefully upon probe failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_grace_period_seconds: Option<i64>,
}

const fn default_initial_delay_seconds() -> i32 {
    DEFAULT_INITIAL_DELAY_SECONDS
}

const fn default_period_seconds() -> i32 {
    DEFAULT_PERIOD_SECONDS
}

const fn default_timeout_seconds() -> i32 {
    DEFAULT_TIMEOUT_SECONDS
}

const fn default_success_threshold() -> i32 {
    DEFAULT_SUCCESS_THRESHOLD
}

const fn default_failure_threshold() -> i32 {
    DEFAULT_FAILURE_THRESHOLD
}

impl ContainerPatch for StartupProbeParams {
    const MULTIPLE_CONTAINERS_KEY: &'static str = "probes";

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
