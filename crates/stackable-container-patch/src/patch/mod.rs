//! Dispatching trait parameters over the containers of a pod template.
//!
//! Every trait implements [`ContainerPatch`] for its parameter bundle. [`patch_containers`] takes
//! care of the rest: resolving the target containers, running the patch for each of them and
//! aggregating the errors into one [`PatchResult`].
use std::fmt::Display;

use k8s_openapi::api::core::v1::Container;
use snafu::Snafu;
use tracing::{debug, instrument, warn};

use crate::{field, merge};

mod dispatch;
mod resolver;

pub use dispatch::Dispatch;
pub use resolver::{effective_container_name, resolve_container};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error that prevented one container from being patched.
///
/// A container with an error never contributes any field changes.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("container {name} not found"))]
    ContainerNotFound { name: String },

    #[snafu(display("cannot set {options} at the same time (container {container_name:?})"))]
    ConflictingOptions {
        container_name: String,
        options: &'static str,
    },

    #[snafu(display("failed to merge the ports of container {container_name:?}"))]
    MergePorts {
        source: merge::ports::Error,
        container_name: String,
    },

    #[snafu(display("failed to apply the field rules to container {container_name:?}"))]
    ApplyFieldRules {
        source: field::Error,
        container_name: String,
    },
}

/// All errors recorded while patching the containers.
///
/// A non-empty list fails the whole patch operation.
#[derive(Debug)]
pub struct Errors(Vec<Error>);

impl Errors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Errors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            let prefix = match i {
                0 => "",
                _ => ", ",
            };
            write!(f, "{prefix}{error}")?;
        }
        Ok(())
    }
}
impl std::error::Error for Errors {}

impl IntoIterator for Errors {
    type IntoIter = std::vec::IntoIter<Error>;
    type Item = Error;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A parameter bundle that knows how to patch exactly one container.
pub trait ContainerPatch {
    /// The key under which the trait accepts an explicit list of per-container parameter sets.
    const MULTIPLE_CONTAINERS_KEY: &'static str = "containers";

    /// The name of the container this bundle targets. An empty name selects the default
    /// container.
    fn container_name(&self) -> &str;

    /// Computes the revised copy of `base`. The base container is never modified.
    fn patch_container(&self, base: &Container) -> Result<Container>;
}

/// The outcome of patching a single container.
#[derive(Debug)]
pub struct MergeOutcome {
    /// The effective container name, after falling back to the default.
    pub container_name: String,
    pub result: Result<Container>,
}

/// The patch fragment produced by [`patch_containers`].
///
/// The outcomes are ordered like the parameter sets that produced them.
#[derive(Debug)]
pub struct PatchResult {
    pub outcomes: Vec<MergeOutcome>,
}

impl PatchResult {
    /// All errors recorded for any container, in outcome order.
    pub fn errors(&self) -> impl Iterator<Item = &Error> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().err())
    }

    /// Returns the patched containers, or all recorded errors if there are any.
    pub fn into_result(self) -> Result<Vec<Container>, Errors> {
        let mut containers = Vec::with_capacity(self.outcomes.len());
        let mut errors = Vec::new();

        for outcome in self.outcomes {
            match outcome.result {
                Ok(container) => containers.push(container),
                Err(error) => errors.push(error),
            }
        }

        if errors.is_empty() {
            Ok(containers)
        } else {
            Err(Errors(errors))
        }
    }

    /// Unifies the patch fragment into `containers`.
    ///
    /// Containers are matched by name, never by position, so the order of `containers` is kept.
    /// If any error was recorded, nothing is applied and all errors are returned.
    pub fn apply_to(self, containers: &mut [Container]) -> Result<(), Errors> {
        for patched in self.into_result()? {
            if let Some(container) = containers.iter_mut().find(|c| c.name == patched.name) {
                *container = patched;
            }
        }

        Ok(())
    }
}

/// Runs the patch described by `dispatch` against the `base` containers.
///
/// Every parameter set is processed independently: a failure for one container never skips its
/// siblings. Parameter sets that don't name a container target `default_container_name`, which
/// usually is the name of the enclosing workload.
#[instrument(skip(base, dispatch), fields(parameter_sets = dispatch.len()))]
pub fn patch_containers<P>(
    base: &[Container],
    dispatch: &Dispatch<P>,
    default_container_name: &str,
) -> PatchResult
where
    P: ContainerPatch,
{
    let outcomes = dispatch
        .iter()
        .map(|params| {
            let container_name =
                effective_container_name(params.container_name(), default_container_name);
            let result = resolve_container(base, container_name)
                .and_then(|container| params.patch_container(container));

            match &result {
                Ok(_) => debug!(container.name = container_name, "patched container"),
                Err(error) => warn!(
                    container.name = container_name,
                    error = %error,
                    "failed to patch container"
                ),
            }

            MergeOutcome {
                container_name: container_name.to_owned(),
                result,
            }
        })
        .collect();

    PatchResult { outcomes }
}
