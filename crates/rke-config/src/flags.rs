/// Runtime knobs which change how the engine runs rather than what it builds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExternalFlags {
    /// Only reconcile the hosts that changed, leave everything else alone.
    pub update_only: bool,

    pub disable_port_check: bool,

    /// Run the nodes as Docker-in-Docker containers.
    pub dind: bool,

    /// Use the certificates found in [`Self::certificate_dir`] instead of generating them.
    pub custom_certs: bool,

    pub certificate_dir: String,

    /// Path of the cluster document the engine derives its state file location from.
    pub cluster_file_path: String,
}
