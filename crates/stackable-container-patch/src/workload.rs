//! Running traits against the pod template of a rendered workload.
use k8s_openapi::api::{
    apps::v1::{DaemonSet, Deployment, StatefulSet},
    batch::v1::Job,
    core::v1::{Container, PodTemplateSpec},
};
use tracing::{debug, instrument};

use crate::patch::{ContainerPatch, Dispatch, Errors, patch_containers};

/// A workload that owns a pod template, and thereby the containers traits are applied to.
pub trait PodTemplateWorkload {
    /// The name of the workload, which is also the name of its default container.
    fn workload_name(&self) -> &str;

    fn pod_template(&self) -> Option<&PodTemplateSpec>;

    fn pod_template_mut(&mut self) -> Option<&mut PodTemplateSpec>;

    /// The containers of the pod template, empty if the workload has no pod spec yet.
    fn containers(&self) -> &[Container] {
        self.pod_template()
            .and_then(|template| template.spec.as_ref())
            .map(|spec| spec.containers.as_slice())
            .unwrap_or_default()
    }

    fn containers_mut(&mut self) -> Option<&mut Vec<Container>> {
        self.pod_template_mut()
            .and_then(|template| template.spec.as_mut())
            .map(|spec| &mut spec.containers)
    }
}

macro_rules! impl_pod_template_workload {
    ($($workload:ty),+ $(,)?) => {
        $(
            impl PodTemplateWorkload for $workload {
                fn workload_name(&self) -> &str {
                    self.metadata.name.as_deref().unwrap_or_default()
                }

                fn pod_template(&self) -> Option<&PodTemplateSpec> {
                    self.spec.as_ref().map(|spec| &spec.template)
                }

                fn pod_template_mut(&mut self) -> Option<&mut PodTemplateSpec> {
                    self.spec.as_mut().map(|spec| &mut spec.template)
                }
            }
        )+
    };
}

impl_pod_template_workload!(Deployment, StatefulSet, DaemonSet, Job);

/// Applies one trait to the containers of `workload`.
///
/// Parameter sets without a container name target the container named like the workload. If
/// any container fails, the workload is left untouched and all errors are returned.
#[instrument(skip_all, fields(workload.name = workload.workload_name()))]
pub fn apply_trait<W, P>(workload: &mut W, dispatch: &Dispatch<P>) -> Result<(), Errors>
where
    W: PodTemplateWorkload,
    P: ContainerPatch,
{
    let default_container_name = workload.workload_name().to_owned();
    let result = patch_containers(workload.containers(), dispatch, &default_container_name);

    match workload.containers_mut() {
        Some(containers) => result.apply_to(containers)?,
        // Without a pod spec there is nothing to resolve, so only an empty dispatch succeeds
        None => {
            result.into_result()?;
        }
    }

    debug!("applied trait to workload");
    Ok(())
}
