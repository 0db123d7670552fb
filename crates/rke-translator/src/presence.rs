//! When flatten may write a section attribute.
//!
//! The bootstrap engine fills in defaults for sections the user never configured. Writing those
//! back would show up as changes the user did not make, so some sections are only written if
//! the attribute already holds a value.
use strum::{Display, EnumIter, IntoStaticStr};

use crate::attributes::ResourceData;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WritePolicy {
    /// Write whenever the object holds a value for the section.
    AlwaysIfPresent,

    /// Additionally require the attribute to already hold a non-empty value.
    OnlyIfTracked,
}

/// The top-level attributes written by flatten which carry a configuration section.
#[derive(Clone, Copy, Debug, Display, EnumIter, IntoStaticStr, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum Section {
    Addons,
    AddonsInclude,
    Authentication,
    Authorization,
    BastionHost,
    CloudProvider,
    Dns,
    Ingress,
    Monitoring,
    Network,
    Nodes,
    PrivateRegistries,
    Restore,
    RotateCertificates,
    Services,
    UpgradeStrategy,
}

impl Section {
    pub const fn write_policy(self) -> WritePolicy {
        match self {
            Self::Addons
            | Self::AddonsInclude
            | Self::CloudProvider
            | Self::Nodes
            | Self::PrivateRegistries
            | Self::RotateCertificates => WritePolicy::OnlyIfTracked,
            Self::Authentication
            | Self::Authorization
            | Self::BastionHost
            | Self::Dns
            | Self::Ingress
            | Self::Monitoring
            | Self::Network
            | Self::Restore
            | Self::Services
            | Self::UpgradeStrategy => WritePolicy::AlwaysIfPresent,
        }
    }

    /// Name of the attribute holding the section.
    pub fn attribute(self) -> &'static str {
        self.into()
    }

    /// Whether flatten may write the section, given that the object holds a value for it.
    pub fn may_write(self, attrs: &impl ResourceData) -> bool {
        match self.write_policy() {
            WritePolicy::AlwaysIfPresent => true,
            WritePolicy::OnlyIfTracked => attrs.is_tracked(self.attribute()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::attributes::{AttributeValue, Attributes, BlockBuilder, Schema};

    #[rstest]
    #[case(Section::CloudProvider, "cloud_provider")]
    #[case(Section::Dns, "dns")]
    #[case(Section::AddonsInclude, "addons_include")]
    #[case(Section::UpgradeStrategy, "upgrade_strategy")]
    fn attribute_names(#[case] section: Section, #[case] attribute: &str) {
        assert_eq!(section.attribute(), attribute);
    }

    #[test]
    fn every_section_is_part_of_the_schema() {
        let schema = Schema::rke_cluster();
        for section in Section::iter() {
            assert!(
                schema.kind_of(section.attribute()).is_some(),
                "{section} is missing from the schema"
            );
        }
    }

    #[rstest]
    #[case(Section::CloudProvider)]
    #[case(Section::PrivateRegistries)]
    #[case(Section::RotateCertificates)]
    #[case(Section::Nodes)]
    fn guarded_sections_require_a_tracked_value(#[case] section: Section) {
        let mut attrs = Attributes::new();
        assert!(!section.may_write(&attrs));

        attrs.insert(section.attribute(), AttributeValue::List(Vec::new()));
        assert!(!section.may_write(&attrs));

        attrs.insert(
            section.attribute(),
            BlockBuilder::new().string("name", "aws").build(),
        );
        assert!(section.may_write(&attrs));
    }

    #[rstest]
    #[case(Section::Network)]
    #[case(Section::Services)]
    #[case(Section::Authentication)]
    fn unguarded_sections_are_always_writable(#[case] section: Section) {
        assert!(section.may_write(&Attributes::new()));
    }
}
