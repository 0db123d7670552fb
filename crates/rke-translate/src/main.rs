use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use rke_config::Cluster;
use rke_translator::{
    attributes::{AttributeValue, Attributes, Schema},
    flags,
};
use snafu::{ResultExt, Snafu};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV_VAR: &str = "RKE_TRANSLATE_LOG";

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to initialize logging"))]
    InitLogging {
        source: tracing_subscriber::util::TryInitError,
    },

    #[snafu(display("failed to read {path:?}"))]
    ReadFile { source: io::Error, path: PathBuf },

    #[snafu(display("failed to parse attributes from {path:?}"))]
    ParseAttributes {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to parse cluster configuration from {path:?}"))]
    ParseCluster {
        source: rke_config::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to expand attributes"))]
    Expand {
        source: rke_translator::cluster::Error,
    },

    #[snafu(display("failed to flatten cluster"))]
    Flatten {
        source: rke_translator::cluster::Error,
    },

    #[snafu(display("failed to flatten external flags"))]
    FlattenFlags { source: flags::Error },

    #[snafu(display("failed to serialize attributes"))]
    SerializeAttributes { source: serde_json::Error },

    #[snafu(display("failed to write output"))]
    WriteOutput { source: io::Error },
}

/// Translates between rke_cluster attributes and RKE cluster.yml documents.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Expand attributes into the cluster.yml document handed to RKE.
    Expand {
        /// JSON file holding the attributes, keyed by attribute name.
        #[arg(long, short, env = "RKE_TRANSLATE_ATTRIBUTES")]
        attributes: PathBuf,

        /// Path RKE is told the cluster file lives at.
        #[arg(long, env = "RKE_TRANSLATE_CLUSTER_FILE_PATH", default_value = "cluster.yml")]
        cluster_file_path: String,

        /// Write the document to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Flatten a cluster.yml document into attributes, printed as JSON.
    Flatten {
        /// The cluster.yml document.
        #[arg(long, short)]
        cluster: PathBuf,

        /// JSON file holding the current attributes, which are updated in place.
        #[arg(long, short, env = "RKE_TRANSLATE_ATTRIBUTES")]
        attributes: Option<PathBuf>,

        /// Flatten the cluster as running in Docker-in-Docker mode.
        #[arg(long)]
        dind: bool,
    },
}

#[snafu::report]
fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    init_logging()?;

    match cli.command {
        Command::Expand {
            attributes,
            cluster_file_path,
            output,
        } => expand(&attributes, &cluster_file_path, output.as_deref()),
        Command::Flatten {
            cluster,
            attributes,
            dind,
        } => flatten(&cluster, attributes.as_deref(), dind),
    }
}

/// Logs to stderr, filtered by [`LOG_ENV_VAR`] and `INFO` by default.
fn init_logging() -> Result<(), Error> {
    let env_filter = EnvFilter::builder()
        .with_env_var(LOG_ENV_VAR)
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(env_filter),
        )
        .try_init()
        .context(InitLoggingSnafu)
}

fn expand(
    attributes: &Path,
    cluster_file_path: &str,
    output: Option<&Path>,
) -> Result<(), Error> {
    let attrs = read_attributes(attributes)?;

    let flags = rke_translator::expand_flags(&attrs, cluster_file_path);
    tracing::info!(
        update_only = flags.update_only,
        dind = flags.dind,
        custom_certs = flags.custom_certs,
        "resolved external flags"
    );

    let (document, config) = rke_translator::expand(&attrs).context(ExpandSnafu)?;
    tracing::info!(
        cluster_name = %config.cluster_name,
        nodes = config.nodes.len(),
        "expanded attributes"
    );

    match output {
        Some(path) => fs::write(path, document).context(WriteOutputSnafu),
        None => io::stdout()
            .write_all(document.as_bytes())
            .context(WriteOutputSnafu),
    }
}

fn flatten(cluster: &Path, attributes: Option<&Path>, dind: bool) -> Result<(), Error> {
    let text = fs::read_to_string(cluster).context(ReadFileSnafu { path: cluster })?;
    let config = rke_config::parse_config(&text).context(ParseClusterSnafu { path: cluster })?;

    let mut attrs = match attributes {
        Some(path) => read_attributes(path)?,
        None => Attributes::with_schema(Schema::rke_cluster()),
    };

    if dind {
        attrs.insert(flags::DIND, true);
    }

    let flags = rke_translator::expand_flags(&attrs, &cluster.to_string_lossy());
    let state = Cluster::from_config(config, flags.dind);
    rke_translator::flatten(&state, &mut attrs).context(FlattenSnafu)?;
    rke_translator::flatten_flags(&flags, &mut attrs).context(FlattenFlagsSnafu)?;
    tracing::info!(attributes = attrs.values().len(), "flattened cluster");

    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, attrs.values()).context(SerializeAttributesSnafu)?;
    writeln!(stdout).context(WriteOutputSnafu)
}

/// Reads an attribute file. The returned store checks writes against the `rke_cluster` schema.
fn read_attributes(path: &Path) -> Result<Attributes, Error> {
    let text = fs::read_to_string(path).context(ReadFileSnafu { path })?;
    let values: BTreeMap<String, AttributeValue> =
        serde_json::from_str(&text).context(ParseAttributesSnafu { path })?;

    let mut attrs = Attributes::with_schema(Schema::rke_cluster());
    for (name, value) in values {
        attrs.insert(name, value);
    }
    Ok(attrs)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use rstest::rstest;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["rke-translate", "expand", "--attributes", "attrs.json"], "cluster.yml")]
    #[case(
        &["rke-translate", "expand", "-a", "attrs.json", "--cluster-file-path", "/tmp/c.yml"],
        "/tmp/c.yml"
    )]
    fn expand_defaults_the_cluster_file_path(#[case] args: &[&str], #[case] expected: &str) {
        let cli = Cli::try_parse_from(args).expect("arguments are valid");
        assert!(
            matches!(
                &cli.command,
                Command::Expand { cluster_file_path, .. } if cluster_file_path == expected
            ),
            "{cli:?}"
        );
    }

    #[test]
    fn flatten_requires_a_cluster_document() {
        assert!(Cli::try_parse_from(["rke-translate", "flatten"]).is_err());
    }
}
