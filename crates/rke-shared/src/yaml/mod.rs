//! Utility functions for processing cluster documents in the YAML file format.
//!
//! Besides the primary YAML path this module offers a JSON "bridge" path. Types which only
//! serialize correctly as JSON are encoded through it and then turned into a generic
//! [`Value`] tree, which can be spliced into a document tree produced by the primary path.
use serde::{Serialize, de::DeserializeOwned};
use serde_yaml::{Mapping, Value};
use snafu::{ResultExt, Snafu};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Represents every error which can be encountered while encoding or decoding documents.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to serialize YAML"))]
    SerializeYaml { source: serde_yaml::Error },

    #[snafu(display("failed to deserialize YAML"))]
    DeserializeYaml { source: serde_yaml::Error },

    #[snafu(display("failed to serialize JSON"))]
    SerializeJson { source: serde_json::Error },

    #[snafu(display("failed to deserialize JSON"))]
    DeserializeJson { source: serde_json::Error },

    #[snafu(display("failed to write YAML document separator"))]
    WriteDocumentSeparator { source: std::io::Error },

    #[snafu(display("failed to parse bytes as valid UTF-8 string"))]
    ParseUtf8Bytes { source: std::string::FromUtf8Error },
}

/// Provides configurable options during YAML serialization.
///
/// The default produces a plain document, which is what the bootstrap engine reads: no leading
/// document separator and enum variants rendered the way `serde_yaml` renders them natively.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Adds leading triple dashes (`---`) to the output string.
    pub explicit_document: bool,

    /// Serialize enum variants as YAML maps using the variant name as the key.
    pub singleton_map: bool,
}

/// Serializes the given data structure and writes it to a [`Writer`](std::io::Write).
pub fn serialize<T, W>(value: &T, mut writer: W, options: SerializeOptions) -> Result<()>
where
    T: Serialize,
    W: std::io::Write,
{
    if options.explicit_document {
        writer
            .write_all(b"---\n")
            .context(WriteDocumentSeparatorSnafu)?;
    }

    let mut serializer = serde_yaml::Serializer::new(writer);

    if options.singleton_map {
        serde_yaml::with::singleton_map_recursive::serialize(value, &mut serializer)
            .context(SerializeYamlSnafu)?;
    } else {
        value
            .serialize(&mut serializer)
            .context(SerializeYamlSnafu)?;
    }

    Ok(())
}

/// Encodes `value` through the primary path into a YAML document string.
pub fn to_document_string<T>(value: &T) -> Result<String>
where
    T: Serialize,
{
    to_document_string_with(value, SerializeOptions::default())
}

/// Encodes `value` into a YAML document string using the provided [`SerializeOptions`].
pub fn to_document_string_with<T>(value: &T, options: SerializeOptions) -> Result<String>
where
    T: Serialize,
{
    let mut buffer = Vec::new();
    serialize(value, &mut buffer, options)?;
    String::from_utf8(buffer).context(ParseUtf8BytesSnafu)
}

/// Decodes a hand-written YAML document into `T`.
///
/// Enum variants are accepted as single-key mappings (`aescbc: {...}`), which is how they are
/// written by users and how the Kubernetes API represents one-of members.
pub fn from_document_str<T>(text: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_yaml::with::singleton_map_recursive::deserialize(serde_yaml::Deserializer::from_str(
        text,
    ))
    .context(DeserializeYamlSnafu)
}

/// Decodes a YAML document into an untyped document tree.
pub fn to_tree(text: &str) -> Result<Value> {
    serde_yaml::from_str(text).context(DeserializeYamlSnafu)
}

/// Encodes a document tree back into a YAML document string.
pub fn tree_to_string(tree: &Value) -> Result<String> {
    to_document_string(tree)
}

/// Encodes `value` through the JSON bridge path.
pub fn to_bridge_bytes<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize,
{
    serde_json::to_vec(value).context(SerializeJsonSnafu)
}

/// Decodes bytes produced by [`to_bridge_bytes`] into a document tree.
pub fn from_bridge_bytes(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes).context(DeserializeJsonSnafu)
}

/// Runs `value` through the JSON bridge and returns the resulting tree fragment.
pub fn bridge_tree<T>(value: &T) -> Result<Value>
where
    T: Serialize,
{
    from_bridge_bytes(&to_bridge_bytes(value)?)
}

/// Walks `path` from `tree` through nested mappings and returns the mapping at its end.
///
/// Returns [`None`] as soon as a key is missing or a node along the way is not a mapping.
pub fn mapping_at_mut<'a>(tree: &'a mut Value, path: &[&str]) -> Option<&'a mut Mapping> {
    let mut current = tree;
    for key in path {
        current = current.as_mapping_mut()?.get_mut(*key)?;
    }
    current.as_mapping_mut()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use indoc::indoc;
    use rstest::rstest;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Provider {
        Identity(BTreeMap<String, String>),
        Secretbox { name: String },
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Providers {
        providers: Vec<Provider>,
    }

    fn providers() -> Providers {
        Providers {
            providers: vec![
                Provider::Secretbox {
                    name: "key1".to_owned(),
                },
                Provider::Identity(BTreeMap::new()),
            ],
        }
    }

    #[test]
    fn document_has_no_separator_by_default() {
        let document = to_document_string(&BTreeMap::from([("a", 1)])).expect("serializable");
        assert_eq!(document, "a: 1\n");
    }

    #[rstest]
    #[case(SerializeOptions { explicit_document: true, singleton_map: false }, "---\n")]
    #[case(SerializeOptions { explicit_document: false, singleton_map: false }, "providers:")]
    fn serialize_honours_document_separator(
        #[case] options: SerializeOptions,
        #[case] expected_prefix: &str,
    ) {
        let mut buffer = Vec::new();
        serialize(&providers(), &mut buffer, options).expect("serializable");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.starts_with(expected_prefix), "{output}");
    }

    #[test]
    fn primary_path_renders_enum_variants_as_tags() {
        let document = to_document_string(&providers()).expect("serializable");
        assert!(document.contains("!secretbox"), "{document}");
    }

    #[test]
    fn bridge_path_renders_enum_variants_as_mappings() {
        let tree = bridge_tree(&providers()).expect("bridgeable");
        let expected = to_tree(indoc! {"
            providers:
            - secretbox:
                name: key1
            - identity: {}
        "})
        .expect("test YAML is valid");
        assert_eq!(tree, expected);
    }

    #[test]
    fn from_document_str_accepts_single_key_mappings() {
        let parsed: Providers = from_document_str(indoc! {"
            providers:
            - secretbox:
                name: key1
            - identity: {}
        "})
        .expect("test YAML is valid");
        assert_eq!(parsed, providers());
    }

    #[test]
    fn from_document_str_reports_malformed_documents() {
        let result = from_document_str::<Providers>("providers: [unclosed");
        assert!(matches!(result, Err(Error::DeserializeYaml { .. })));
    }

    #[test]
    fn from_bridge_bytes_rejects_invalid_json() {
        assert!(matches!(
            from_bridge_bytes(b"{not json"),
            Err(Error::DeserializeJson { .. })
        ));
    }

    #[test]
    fn tree_round_trip_keeps_key_order() {
        let text = indoc! {"
            zeta: 1
            alpha:
              nested: true
        "};
        let tree = to_tree(text).expect("test YAML is valid");
        assert_eq!(tree_to_string(&tree).expect("serializable"), text);
    }

    #[rstest]
    #[case(&["services", "kube-api"], true)]
    #[case(&["services", "kubelet"], false)]
    #[case(&["services", "kube-api", "image"], false)]
    #[case(&[], true)]
    fn mapping_at_mut_navigates_nested_mappings(#[case] path: &[&str], #[case] found: bool) {
        let mut tree = to_tree(indoc! {"
            services:
              kube-api:
                image: rancher/hyperkube
        "})
        .expect("test YAML is valid");
        assert_eq!(mapping_at_mut(&mut tree, path).is_some(), found);
    }
}
