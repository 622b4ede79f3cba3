use std::fmt::Display;

/// A dotted path to a (possibly nested) field, e.g. `securityContext.capabilities.add`.
///
/// The empty path refers to the object the path is applied to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self(
            path.split('.')
                .filter(|segment| !segment.is_empty())
                .map(ToOwned::to_owned)
                .collect(),
        )
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        f.write_str(&self.0.join("."))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", &[], ".")]
    #[case("image", &["image"], "image")]
    #[case("securityContext.capabilities.add", &["securityContext", "capabilities", "add"], "securityContext.capabilities.add")]
    #[case(".startupProbe..exec.", &["startupProbe", "exec"], "startupProbe.exec")]
    fn parse(#[case] input: &str, #[case] segments: &[&str], #[case] display: &str) {
        let path = FieldPath::from(input);

        assert_eq!(path.segments(), segments);
        assert_eq!(path.to_string(), display);
        assert_eq!(path.is_root(), segments.is_empty());
    }
}
