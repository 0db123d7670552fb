//! Derives the engine's [`ExternalFlags`] from resource attributes.
use rke_config::ExternalFlags;
use snafu::{ResultExt, Snafu};

use crate::attributes::{AttributeError, AttributeValue, ResourceData};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to write flag attribute {name:?}"))]
    WriteFlag {
        source: AttributeError,
        name: &'static str,
    },
}

pub const UPDATE_ONLY: &str = "update_only";
pub const DISABLE_PORT_CHECK: &str = "disable_port_check";
pub const DIND: &str = "dind";
pub const CUSTOM_CERTS: &str = "custom_certs";
pub const CERT_DIR: &str = "cert_dir";

/// Flag values exactly as they were read from the attributes, before any of them influenced
/// another.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawFlags {
    pub update_only: bool,
    pub disable_port_check: bool,
    pub dind: bool,
    pub custom_certs: bool,
    pub cert_dir: String,
}

impl RawFlags {
    /// Reads the raw flags. Absent or mistyped attributes fall back to zero values.
    pub fn from_attributes(attrs: &impl ResourceData) -> Self {
        Self {
            update_only: attrs.get_bool(UPDATE_ONLY).unwrap_or_default(),
            disable_port_check: attrs.get_bool(DISABLE_PORT_CHECK).unwrap_or_default(),
            dind: attrs.get_bool(DIND).unwrap_or_default(),
            custom_certs: attrs.get_bool(CUSTOM_CERTS).unwrap_or_default(),
            cert_dir: attrs.get_str(CERT_DIR).unwrap_or_default().to_owned(),
        }
    }

    /// Applies the cross-flag rules.
    ///
    /// Docker-in-Docker clusters can neither be updated partially nor use custom certificates,
    /// so `dind` turns off `update_only` and drops both certificate settings.
    pub fn resolve(self, cluster_file_path: impl Into<String>) -> ExternalFlags {
        let Self {
            update_only,
            disable_port_check,
            dind,
            custom_certs,
            cert_dir,
        } = self;

        let (custom_certs, certificate_dir) = if dind {
            (false, String::new())
        } else {
            (custom_certs, cert_dir)
        };

        ExternalFlags {
            update_only: update_only && !dind,
            disable_port_check,
            dind,
            custom_certs,
            certificate_dir,
            cluster_file_path: cluster_file_path.into(),
        }
    }
}

/// Reads and resolves the flags of one expand run.
pub fn expand_flags(attrs: &impl ResourceData, cluster_file_path: &str) -> ExternalFlags {
    let flags = RawFlags::from_attributes(attrs).resolve(cluster_file_path);
    tracing::debug!(?flags, "resolved external flags");
    flags
}

/// Writes `flags` back into the attributes. The certificate directory is only written if set.
pub fn flatten_flags(flags: &ExternalFlags, attrs: &mut impl ResourceData) -> Result<(), Error> {
    let mut write = |name: &'static str, value: AttributeValue| {
        attrs.set(name, value).context(WriteFlagSnafu { name })
    };

    write(UPDATE_ONLY, flags.update_only.into())?;
    write(DISABLE_PORT_CHECK, flags.disable_port_check.into())?;
    write(DIND, flags.dind.into())?;
    write(CUSTOM_CERTS, flags.custom_certs.into())?;
    if !flags.certificate_dir.is_empty() {
        write(CERT_DIR, flags.certificate_dir.as_str().into())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::attributes::{Attributes, Schema};

    fn attributes(values: &[(&str, bool)]) -> Attributes {
        let mut attrs = Attributes::new();
        for (name, value) in values {
            attrs.insert(*name, *value);
        }
        attrs
    }

    #[rstest]
    #[case(false, false, false)]
    #[case(false, true, true)]
    #[case(true, false, false)]
    #[case(true, true, false)]
    fn dind_forces_update_only_off(
        #[case] dind: bool,
        #[case] update_only: bool,
        #[case] expected: bool,
    ) {
        let attrs = attributes(&[(DIND, dind), (UPDATE_ONLY, update_only)]);
        let flags = expand_flags(&attrs, "cluster.yml");

        assert_eq!(flags.dind, dind);
        assert_eq!(flags.update_only, expected);
    }

    #[test]
    fn dind_ignores_certificate_settings() {
        let mut attrs = attributes(&[(DIND, true), (CUSTOM_CERTS, true)]);
        attrs.insert(CERT_DIR, "/etc/certs");

        let flags = expand_flags(&attrs, "cluster.yml");
        assert!(!flags.custom_certs);
        assert_eq!(flags.certificate_dir, "");
    }

    #[test]
    fn certificate_settings_apply_without_dind() {
        let mut attrs = attributes(&[(CUSTOM_CERTS, true), (DISABLE_PORT_CHECK, true)]);
        attrs.insert(CERT_DIR, "/etc/certs");

        let flags = expand_flags(&attrs, "cluster.yml");
        assert_eq!(
            flags,
            ExternalFlags {
                update_only: false,
                disable_port_check: true,
                dind: false,
                custom_certs: true,
                certificate_dir: "/etc/certs".to_owned(),
                cluster_file_path: "cluster.yml".to_owned(),
            }
        );
    }

    #[test]
    fn absent_and_mistyped_attributes_default() {
        let mut attrs = Attributes::new();
        attrs.insert(UPDATE_ONLY, "true");
        attrs.insert(CERT_DIR, 42_i64);

        assert_eq!(RawFlags::from_attributes(&attrs), RawFlags::default());
    }

    #[test]
    fn flatten_flags_round_trips() {
        let flags = ExternalFlags {
            update_only: true,
            disable_port_check: false,
            dind: false,
            custom_certs: true,
            certificate_dir: "/etc/certs".to_owned(),
            cluster_file_path: String::new(),
        };

        let mut attrs = Attributes::with_schema(Schema::rke_cluster());
        flatten_flags(&flags, &mut attrs).expect("all flags are part of the schema");

        assert_eq!(expand_flags(&attrs, ""), flags);
    }

    #[test]
    fn flatten_flags_skips_empty_certificate_dir() {
        let mut attrs = Attributes::new();
        flatten_flags(&ExternalFlags::default(), &mut attrs).expect("no schema attached");
        assert!(attrs.get(CERT_DIR).is_none());
        assert_eq!(attrs.get_bool(DIND), Some(false));
    }
}
