//! Declarative field rules for traits that copy their parameters into container fields.
//!
//! Every [`FieldRule`] describes how one trait parameter ends up in the container:
//!
//! - which [`Guard`] decides whether the assignment happens at all,
//! - an optional static default that is used when the parameter itself is not set,
//! - the (possibly nested and possibly differently named) target field,
//! - the [`MergeStrategy`] used to combine the new value with the existing one.
//!
//! Rules are collected in [`FieldGroup`]s. A group addresses a nested object of the container
//! (e.g. `securityContext`), and its strategy decides whether the keys of that object that no
//! rule lists are retained, or whether the object is replaced wholesale.
//!
//! ```
//! # use serde_json::json;
//! # use stackable_container_patch::field::{FieldGroup, FieldRule};
//! let group = FieldGroup::new("securityContext")
//!     .with_field(FieldRule::new("runAsUser").is_set())
//!     .with_group(
//!         FieldGroup::new("capabilities")
//!             .with_field(FieldRule::new("addCapabilities").target("add").is_set()),
//!     );
//!
//! let params = json!({ "addCapabilities": ["NET_ADMIN"] });
//! let mut container = json!({ "name": "app", "securityContext": { "privileged": true } });
//!
//! group
//!     .apply(
//!         params.as_object().expect("params are an object"),
//!         container.as_object_mut().expect("container is an object"),
//!     )
//!     .expect("rules apply");
//!
//! assert_eq!(
//!     container,
//!     json!({
//!         "name": "app",
//!         "securityContext": {
//!             "privileged": true,
//!             "capabilities": { "add": ["NET_ADMIN"] }
//!         }
//!     })
//! );
//! ```
use k8s_openapi::api::core::v1::Container;
use serde::Serialize;
use serde_json::{Map, Value};
use snafu::{OptionExt, ResultExt, Snafu};

mod path;

pub use path::FieldPath;

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to serialize the {what}"))]
    Serialize {
        source: serde_json::Error,
        what: &'static str,
    },

    #[snafu(display("the {what} must serialize to an object"))]
    NotAnObject { what: &'static str },

    #[snafu(display("failed to deserialize the patched container"))]
    DeserializeContainer { source: serde_json::Error },

    #[snafu(display("parameter {param:?} is required but not set"))]
    MissingParameter { param: String },

    #[snafu(display("field rule for parameter {param:?} has an empty target path"))]
    EmptyTargetPath { param: String },

    #[snafu(display("cannot write {path}, because {segment:?} is not an object"))]
    PathNotAnObject { path: FieldPath, segment: String },
}

/// Decides whether a rule assigns its value.
///
/// A parameter is "not set" if it is missing or `null`. Zero values (`false`, `0`, `""`, `[]`)
/// are set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Guard {
    /// Always assign. The parameter (or the rule's default) must be set.
    #[default]
    Unconditional,

    /// Assign only if the parameter (or the rule's default) is set.
    IsSet,

    /// Assign only if the parameter is set and is not the empty string.
    NonEmpty,
}

/// How a new value is combined with the existing value of the target field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Discard the existing value.
    #[default]
    Replace,

    /// Merge lists of objects entry by entry, matching entries by the value of `key`. Existing
    /// entries that are not matched are kept, new entries are appended.
    MergeByKey { key: String },

    /// Merge objects key by key (recursively), keeping all existing keys that the new value
    /// doesn't list.
    RetainUnlisted,
}

impl MergeStrategy {
    pub fn merge_by_key(key: impl Into<String>) -> Self {
        Self::MergeByKey { key: key.into() }
    }

    /// Combines `value` into `slot`.
    ///
    /// Values that don't fit the strategy (e.g. a scalar for [`Self::MergeByKey`]) replace the
    /// existing value.
    pub fn merge(&self, slot: &mut Value, value: Value) {
        match self {
            Self::Replace => *slot = value,
            Self::MergeByKey { key } => merge_by_key(slot, value, key),
            Self::RetainUnlisted => retain_unlisted(slot, value),
        }
    }
}

fn retain_unlisted(slot: &mut Value, value: Value) {
    match (slot, value) {
        (Value::Object(existing), Value::Object(update)) => {
            for (key, value) in update {
                match existing.get_mut(&key) {
                    Some(existing_value) => retain_unlisted(existing_value, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn merge_by_key(slot: &mut Value, value: Value, key: &str) {
    match (slot, value) {
        (Value::Array(existing), Value::Array(update)) => {
            for entry in update {
                let position = entry
                    .get(key)
                    .and_then(|id| existing.iter().position(|e| e.get(key) == Some(id)));

                match position {
                    Some(index) => retain_unlisted(&mut existing[index], entry),
                    None => existing.push(entry),
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Copies one trait parameter into one target field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRule {
    param: String,
    target: FieldPath,
    guard: Guard,
    default: Option<Value>,
    strategy: MergeStrategy,
}

impl FieldRule {
    /// Creates an unconditional rule writing the parameter `param` to the field of the same name.
    pub fn new(param: impl Into<String>) -> Self {
        let param = param.into();
        Self {
            target: FieldPath::from(param.as_str()),
            param,
            guard: Guard::default(),
            default: None,
            strategy: MergeStrategy::default(),
        }
    }

    /// Writes to `target` instead of the field named like the parameter.
    pub fn target(mut self, target: &str) -> Self {
        self.target = FieldPath::from(target);
        self
    }

    pub fn is_set(mut self) -> Self {
        self.guard = Guard::IsSet;
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.guard = Guard::NonEmpty;
        self
    }

    /// The value used when the parameter is not set.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Returns the value to assign, or [`None`] if the guard skips the assignment.
    pub fn resolve<'a>(&'a self, params: &'a Map<String, Value>) -> Result<Option<&'a Value>> {
        let value = params
            .get(&self.param)
            .filter(|value| !value.is_null())
            .or(self.default.as_ref());

        match self.guard {
            Guard::Unconditional => value
                .context(MissingParameterSnafu { param: &self.param })
                .map(Some),
            Guard::IsSet => Ok(value),
            Guard::NonEmpty => {
                Ok(value.filter(|value| !matches!(value, Value::String(s) if s.is_empty())))
            }
        }
    }

    /// Writes the resolved value into `target`. Returns whether anything was written.
    pub fn apply(
        &self,
        params: &Map<String, Value>,
        target: &mut Map<String, Value>,
    ) -> Result<bool> {
        let Some(value) = self.resolve(params)? else {
            return Ok(false);
        };

        let slot = slot_mut(target, &self.target)?
            .context(EmptyTargetPathSnafu { param: &self.param })?;
        self.strategy.merge(slot, value.clone());
        Ok(true)
    }
}

/// A set of rules (and nested groups) addressing one object of the container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldGroup {
    target: FieldPath,
    strategy: MergeStrategy,
    fields: Vec<FieldRule>,
    groups: Vec<Self>,
}

impl FieldGroup {
    /// Creates a group addressing the object at `target`, retaining its unlisted keys.
    pub fn new(target: &str) -> Self {
        Self {
            target: FieldPath::from(target),
            strategy: MergeStrategy::RetainUnlisted,
            fields: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Creates a group addressing the container itself.
    pub fn root() -> Self {
        Self::new("")
    }

    /// Whether the group retains unlisted keys ([`MergeStrategy::RetainUnlisted`]) or replaces
    /// the whole object ([`MergeStrategy::Replace`]). The root group always retains.
    pub fn with_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_field(mut self, field: FieldRule) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldRule>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn with_group(mut self, group: Self) -> Self {
        self.groups.push(group);
        self
    }

    /// Applies all rules of this group (and its nested groups) to `target`.
    ///
    /// The addressed object is only written if at least one rule assigned a value, so a group
    /// whose guards all skip leaves `target` untouched. Returns whether anything was written.
    pub fn apply(
        &self,
        params: &Map<String, Value>,
        target: &mut Map<String, Value>,
    ) -> Result<bool> {
        if self.target.is_root() {
            return self.apply_within(params, target);
        }

        let mut content = match self.strategy {
            MergeStrategy::Replace => Map::new(),
            MergeStrategy::RetainUnlisted | MergeStrategy::MergeByKey { .. } => {
                lookup(target, &self.target)
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default()
            }
        };

        let changed = self.apply_within(params, &mut content)?;
        if changed {
            if let Some(slot) = slot_mut(target, &self.target)? {
                *slot = Value::Object(content);
            }
        }

        Ok(changed)
    }

    fn apply_within(
        &self,
        params: &Map<String, Value>,
        content: &mut Map<String, Value>,
    ) -> Result<bool> {
        let mut changed = false;
        for field in &self.fields {
            changed |= field.apply(params, content)?;
        }
        for group in &self.groups {
            changed |= group.apply(params, content)?;
        }
        Ok(changed)
    }

    /// Returns the revised copy of `base` after applying this group with the serialized `params`.
    pub fn patch_container<P>(&self, params: &P, base: &Container) -> Result<Container>
    where
        P: Serialize,
    {
        let Value::Object(params) =
            serde_json::to_value(params).context(SerializeSnafu { what: "parameters" })?
        else {
            return NotAnObjectSnafu { what: "parameters" }.fail();
        };
        let Value::Object(mut container) =
            serde_json::to_value(base).context(SerializeSnafu { what: "container" })?
        else {
            return NotAnObjectSnafu { what: "container" }.fail();
        };

        self.apply(&params, &mut container)?;
        serde_json::from_value(Value::Object(container)).context(DeserializeContainerSnafu)
    }
}

fn lookup<'a>(root: &'a Map<String, Value>, path: &FieldPath) -> Option<&'a Value> {
    let (first, rest) = path.segments().split_first()?;
    rest.iter()
        .try_fold(root.get(first)?, |value, segment| value.get(segment))
}

/// Returns the slot at `path`, creating missing (or `null`) parent objects on the way.
///
/// Returns [`None`] for the root path, which has no slot of its own.
fn slot_mut<'a>(
    root: &'a mut Map<String, Value>,
    path: &FieldPath,
) -> Result<Option<&'a mut Value>> {
    let Some((last, parents)) = path.segments().split_last() else {
        return Ok(None);
    };

    let mut current = root;
    for segment in parents {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if entry.is_null() {
            *entry = Value::Object(Map::new());
        }
        current = entry.as_object_mut().context(PathNotAnObjectSnafu {
            path: path.clone(),
            segment,
        })?;
    }

    Ok(Some(current.entry(last.clone()).or_insert(Value::Null)))
}
