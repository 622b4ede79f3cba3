//! The container traits.
//!
//! Each module defines the parameter bundle of one trait and implements
//! [`ContainerPatch`](crate::patch::ContainerPatch) for it. The bundles deserialize from the
//! trait parameters as written by users (camelCase keys), wrapped in a
//! [`Dispatch`](crate::patch::Dispatch) to support multiple containers.
//!
//! | Trait             | Parameters                                           | Mechanism                      |
//! |-------------------|------------------------------------------------------|--------------------------------|
//! | `command`         | [`CommandParams`](command::CommandParams)            | [`merge::args`](crate::merge::args)   |
//! | `env`             | [`EnvParams`](env::EnvParams)                        | [`merge::env`](crate::merge::env)     |
//! | `container-ports` | [`ContainerPortsParams`](container_ports::ContainerPortsParams) | [`merge::ports`](crate::merge::ports) |
//! | `container-image` | [`ContainerImageParams`](container_image::ContainerImageParams) | [`field`](crate::field) rules  |
//! | `securitycontext` | [`SecurityContextParams`](security_context::SecurityContextParams) | [`field`](crate::field) rules  |
//! | `startup-probe`   | [`StartupProbeParams`](startup_probe::StartupProbeParams) | [`field`](crate::field) rules  |
pub mod command;
pub mod container_image;
pub mod container_ports;
pub mod env;
pub mod security_context;
pub mod startup_probe;

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use schemars::{Schema, schema_for};
    use serde_json::Value;

    use super::{
        command::CommandParams, container_image::ContainerImageParams,
        container_ports::ContainerPortsParams, env::EnvParams,
        security_context::SecurityContextParams, startup_probe::StartupProbeParams,
    };

    /// Collects the values of all enums in the schema (including its definitions).
    fn enum_values(value: &Value, values: &mut Vec<String>) {
        match value {
            Value::Object(object) => {
                for (key, value) in object {
                    match (key.as_str(), value) {
                        ("enum", Value::Array(variants)) => values.extend(
                            variants
                                .iter()
                                .filter_map(Value::as_str)
                                .map(ToOwned::to_owned),
                        ),
                        ("const", Value::String(variant)) => values.push(variant.clone()),
                        _ => enum_values(value, values),
                    }
                }
            }
            Value::Array(items) => items.iter().for_each(|item| enum_values(item, values)),
            _ => {}
        }
    }

    fn required(schema: &Schema) -> Vec<&str> {
        schema
            .get("required")
            .and_then(Value::as_array)
            .map(|required| required.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    #[rstest]
    #[case::container_image(schema_for!(ContainerImageParams), &["", "IfNotPresent", "Always", "Never"])]
    #[case::container_ports(schema_for!(ContainerPortsParams), &["TCP", "UDP", "SCTP"])]
    fn parameter_enums(#[case] schema: Schema, #[case] expected: &[&str]) {
        let mut values = Vec::new();
        enum_values(schema.as_value(), &mut values);

        assert_eq!(values, expected);
    }

    #[rstest]
    #[case::command(schema_for!(CommandParams), &[])]
    #[case::env(schema_for!(EnvParams), &[])]
    #[case::container_ports(schema_for!(ContainerPortsParams), &[])]
    #[case::container_image(schema_for!(ContainerImageParams), &["image"])]
    #[case::security_context(schema_for!(SecurityContextParams), &[])]
    #[case::startup_probe(schema_for!(StartupProbeParams), &[])]
    fn documented_parameters(#[case] schema: Schema, #[case] expected: &[&str]) {
        assert_eq!(required(&schema), expected);

        let properties = schema
            .get("properties")
            .and_then(Value::as_object)
            .expect("parameters are an object");
        assert!(properties.contains_key("containerName"));
        for (name, property) in properties {
            assert!(
                property.get("description").is_some(),
                "parameter {name} is documented"
            );
        }
    }
}
