use serde::{Deserialize, Serialize};

macro_rules! system_images {
    ($($name:ident),* $(,)?) => {
        /// Container images the engine deploys, keyed by component.
        #[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
        #[serde(default)]
        pub struct SystemImages {
            $(
                #[serde(skip_serializing_if = "String::is_empty")]
                pub $name: String,
            )*
        }

        impl SystemImages {
            /// All components with their images, in document order, including empty ones.
            pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
                [$((stringify!($name), self.$name.as_str())),*].into_iter()
            }

            /// Sets the image of the component called `name`.
            ///
            /// Returns `false` if there is no such component.
            pub fn set(&mut self, name: &str, image: String) -> bool {
                match name {
                    $(stringify!($name) => self.$name = image,)*
                    _ => return false,
                }
                true
            }
        }
    };
}

system_images! {
    etcd,
    alpine,
    nginx_proxy,
    cert_downloader,
    kubernetes_services_sidecar,
    kubedns,
    dnsmasq,
    kubedns_sidecar,
    kubedns_autoscaler,
    coredns,
    coredns_autoscaler,
    nodelocal,
    kubernetes,
    flannel,
    flannel_cni,
    calico_node,
    calico_cni,
    calico_controllers,
    calico_ctl,
    canal_node,
    canal_cni,
    canal_flannel,
    weave_node,
    weave_cni,
    pod_infra_container,
    ingress,
    ingress_backend,
    metrics_server,
}
