use serde::{
    Deserialize, Deserializer,
    de::{DeserializeOwned, Error as _},
};
use serde_json::Value;

use super::ContainerPatch;

/// Selects which parameter sets drive a patch.
///
/// When deserialized from a trait parameter object, the presence of a (non-null) list under the
/// trait's [`ContainerPatch::MULTIPLE_CONTAINERS_KEY`] selects [`Dispatch::Multiple`], and the
/// singular top-level fields are ignored. Otherwise the whole object is the [`Dispatch::Single`]
/// parameter set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch<P> {
    /// One implicit parameter set, usually targeting the default container.
    Single(P),

    /// An explicit list of parameter sets, each carrying its own container name.
    Multiple(Vec<P>),
}

impl<P> Dispatch<P> {
    pub fn iter(&self) -> std::slice::Iter<'_, P> {
        match self {
            Self::Single(params) => std::slice::from_ref(params).iter(),
            Self::Multiple(params) => params.iter(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multiple(params) => params.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a, P> IntoIterator for &'a Dispatch<P> {
    type IntoIter = std::slice::Iter<'a, P>;
    type Item = &'a P;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'de, P> Deserialize<'de> for Dispatch<P>
where
    P: ContainerPatch + DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut value = Value::deserialize(deserializer)?;

        let multiple = value
            .as_object_mut()
            .and_then(|object| object.remove(P::MULTIPLE_CONTAINERS_KEY))
            .filter(|list| !list.is_null());

        match multiple {
            Some(list) => serde_json::from_value(list)
                .map(Self::Multiple)
                .map_err(D::Error::custom),
            None => serde_json::from_value(value)
                .map(Self::Single)
                .map_err(D::Error::custom),
        }
    }
}
