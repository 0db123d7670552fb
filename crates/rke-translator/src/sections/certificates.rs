//! The computed certificate attributes.
use std::collections::BTreeMap;

use rke_config::{
    CertificatePki,
    cluster::{CA_CERT_NAME, KUBE_ADMIN_CERT_NAME},
};

use crate::attributes::{AttributeValue, BlockBuilder};

/// The certificate material flatten writes as computed attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatCertificates {
    pub ca_crt: String,
    pub client_cert: String,
    pub client_key: String,

    /// Every certificate of the bundle, one map each.
    pub certificates: AttributeValue,
}

pub fn flatten(certificates: &BTreeMap<String, CertificatePki>) -> FlatCertificates {
    let ca_crt = certificates
        .get(CA_CERT_NAME)
        .map(|ca| ca.certificate.clone())
        .unwrap_or_default();
    let (client_cert, client_key) = certificates
        .get(KUBE_ADMIN_CERT_NAME)
        .map(|admin| (admin.certificate.clone(), admin.key.clone()))
        .unwrap_or_default();

    let certificates = certificates
        .iter()
        .map(|(id, pki)| {
            BlockBuilder::new()
                .string("id", id)
                .string("certificate", &pki.certificate)
                .string("key", &pki.key)
                .string("config", &pki.config)
                .string("name", &pki.name)
                .string("common_name", &pki.common_name)
                .string("ou_name", &pki.ou_name)
                .string("env_name", &pki.env_name)
                .string("path", &pki.path)
                .string("key_env_name", &pki.key_env_name)
                .string("key_path", &pki.key_path)
                .string("config_env_name", &pki.config_env_name)
                .string("config_path", &pki.config_path)
                .into_map()
        })
        .collect();

    FlatCertificates {
        ca_crt,
        client_cert,
        client_key,
        certificates: AttributeValue::List(certificates),
    }
}
