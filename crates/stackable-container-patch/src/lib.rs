//! Patch-merge engine for workload traits.
//!
//! A trait is a reusable modification of one or more named containers inside an already rendered
//! workload (`Deployment`, `StatefulSet`, `DaemonSet` or `Job`). This crate computes the revised
//! containers from the base containers of the pod template and the (already schema-validated)
//! trait parameters.
//!
//! The pipeline is always the same:
//!
//! 1. The [`Dispatch`](patch::Dispatch) decides whether a single implicit parameter set or an
//!    explicit list of per-container parameter sets drives the patch.
//! 2. For every parameter set, the target container is resolved by name (see
//!    [`resolve_container`](patch::resolve_container)), falling back to the default name when no
//!    name was requested.
//! 3. The trait computes the revised copy of that container, either through one of the
//!    specialized [`merge`] algorithms or through the declarative [`field`] rules.
//! 4. Errors are recorded per container and aggregated in the [`PatchResult`](patch::PatchResult)
//!    without skipping sibling containers.
//!
//! ```
//! # use stackable_container_patch::{
//! #     k8s_openapi::api::core::v1::Container,
//! #     patch::{Dispatch, patch_containers},
//! #     traits::command::CommandParams,
//! # };
//! let base = vec![Container {
//!     name: "nginx".to_owned(),
//!     args: Some(vec!["nginx".to_owned(), "-g".to_owned(), "daemon off;".to_owned()]),
//!     ..Default::default()
//! }];
//!
//! let params = Dispatch::Single(CommandParams {
//!     add_args: Some(vec!["--foo".to_owned()]),
//!     del_args: Some(vec!["-g".to_owned()]),
//!     ..Default::default()
//! });
//!
//! let containers = patch_containers(&base, &params, "nginx")
//!     .into_result()
//!     .expect("the nginx container exists");
//! assert_eq!(
//!     containers[0].args.as_deref(),
//!     Some(&["nginx".to_owned(), "daemon off;".to_owned(), "--foo".to_owned()][..])
//! );
//! ```

pub mod field;
pub mod merge;
pub mod patch;
pub mod traits;
pub mod workload;

// External re-exports
pub use k8s_openapi;
pub use schemars;
