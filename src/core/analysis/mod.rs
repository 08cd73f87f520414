mod clusterer;
mod namer;

pub use clusterer::{
    Cluster, ClusterConfig, ClusterResult, ColorClusterer, DominantColor,
    validate_cluster_count, DEFAULT_CLUSTER_COUNT, DEFAULT_MAX_ITERATIONS, DEFAULT_SEED,
    MAX_CLUSTER_COUNT,
};
pub use namer::{checked_rgb, ColorName, ColorNamer, NamingRule};
