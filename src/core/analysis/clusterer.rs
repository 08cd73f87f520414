use palette::Srgb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::image::PixelSample;
use crate::error::{AnalysisError, Result};

/// Default number of color groups
pub const DEFAULT_CLUSTER_COUNT: usize = 3;
/// Upper bound on assign/update rounds
pub const DEFAULT_MAX_ITERATIONS: usize = 300;
/// Fixed seed so identical input always clusters identically
pub const DEFAULT_SEED: u64 = 42;
/// Largest accepted cluster count
pub const MAX_CLUSTER_COUNT: usize = 256;

/// Parameters for k-means color clustering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub k: usize,
    pub max_iterations: usize,
    pub seed: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_CLUSTER_COUNT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: DEFAULT_SEED,
        }
    }
}

impl ClusterConfig {
    pub fn with_k(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }
}

/// One color group: its mean color and how many pixels it holds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
    /// Mean color, channels normalized to 0.0..=1.0
    pub centroid: Srgb<f32>,
    pub pixel_count: usize,
}

impl Cluster {
    /// Centroid rounded to the nearest integer per channel and clamped to 0..=255
    pub fn rounded(&self) -> Srgb<u8> {
        let to_u8 = |c: f32| (c * 255.0).round().clamp(0.0, 255.0) as u8;
        Srgb::new(
            to_u8(self.centroid.red),
            to_u8(self.centroid.green),
            to_u8(self.centroid.blue),
        )
    }
}

/// Outcome of clustering a pixel sample
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterResult {
    /// Exactly `k` clusters; surplus clusters on low-variety images hold zero pixels
    pub clusters: Vec<Cluster>,
    /// Cluster index for each pixel, in sample order
    pub assignments: Vec<usize>,
    pub iterations: usize,
    /// False when the iteration cap was hit before assignments settled
    pub converged: bool,
}

/// The cluster covering the most pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DominantColor {
    pub index: usize,
    pub rgb: Srgb<u8>,
    pub pixel_count: usize,
    /// Fraction of all sampled pixels in this cluster
    pub coverage: f32,
}

impl ClusterResult {
    /// Largest cluster; ties go to the lowest index
    pub fn dominant(&self) -> DominantColor {
        let mut best = 0;
        for (i, cluster) in self.clusters.iter().enumerate() {
            if cluster.pixel_count > self.clusters[best].pixel_count {
                best = i;
            }
        }

        let cluster = &self.clusters[best];
        let total = self.assignments.len().max(1);
        DominantColor {
            index: best,
            rgb: cluster.rounded(),
            pixel_count: cluster.pixel_count,
            coverage: cluster.pixel_count as f32 / total as f32,
        }
    }
}

/// Lloyd-style k-means over RGB triples with seeded k-means++ initialization
///
/// Stateless apart from its configuration; the result is a pure function of
/// the input pixels and the config.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorClusterer {
    config: ClusterConfig,
}

type Point = [f64; 3];

fn to_point(p: &Srgb<u8>) -> Point {
    [p.red as f64, p.green as f64, p.blue as f64]
}

fn distance_squared(a: &Point, b: &Point) -> f64 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

/// Index of the closest centroid, lowest index on ties
fn nearest(point: &Point, centroids: &[Point]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = distance_squared(point, c);
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

impl ColorClusterer {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Partitions the sample into `k` clusters
    ///
    /// `k` must lie in `1..=MAX_CLUSTER_COUNT`. Only as many centroids as the sample
    /// has distinct colors take part in the iteration; the rest are reported as empty
    /// clusters after them.
    pub fn cluster(&self, sample: &PixelSample) -> Result<ClusterResult> {
        let k = self.config.k;
        validate_cluster_count(k)?;
        if sample.is_empty() {
            return Err(AnalysisError::invalid_input("pixel sample is empty"));
        }

        let points: Vec<Point> = sample.pixels().iter().map(to_point).collect();
        let mut centroids = self.initial_centroids(&points);
        let active = centroids.len();

        let mut assignments = vec![usize::MAX; points.len()];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.config.max_iterations {
            iterations += 1;

            let mut changed = false;
            for (slot, point) in assignments.iter_mut().zip(&points) {
                let idx = nearest(point, &centroids);
                if *slot != idx {
                    *slot = idx;
                    changed = true;
                }
            }
            if !changed {
                converged = true;
                break;
            }

            let mut sums = vec![[0.0f64; 3]; active];
            let mut counts = vec![0usize; active];
            for (&idx, point) in assignments.iter().zip(&points) {
                sums[idx][0] += point[0];
                sums[idx][1] += point[1];
                sums[idx][2] += point[2];
                counts[idx] += 1;
            }
            for ((centroid, sum), &count) in centroids.iter_mut().zip(&sums).zip(&counts) {
                // Empty clusters keep their previous centroid
                if count > 0 {
                    let n = count as f64;
                    *centroid = [sum[0] / n, sum[1] / n, sum[2] / n];
                }
            }
        }

        // A zero cap never assigned anything
        if assignments.first() == Some(&usize::MAX) {
            for (slot, point) in assignments.iter_mut().zip(&points) {
                *slot = nearest(point, &centroids);
            }
        }

        if !converged {
            debug!(
                "k-means stopped at the iteration cap ({}) before converging",
                self.config.max_iterations
            );
        }

        let mut counts = vec![0usize; active];
        for &idx in &assignments {
            counts[idx] += 1;
        }

        let to_centroid = |c: &Point| {
            Srgb::new(
                (c[0] / 255.0) as f32,
                (c[1] / 255.0) as f32,
                (c[2] / 255.0) as f32,
            )
        };
        let mut clusters: Vec<Cluster> = centroids
            .iter()
            .zip(&counts)
            .map(|(c, &pixel_count)| Cluster {
                centroid: to_centroid(c),
                pixel_count,
            })
            .collect();

        // Surplus clusters sit on the first centroid and hold no pixels
        let surplus = Cluster {
            centroid: to_centroid(&centroids[0]),
            pixel_count: 0,
        };
        clusters.resize(k, surplus);

        debug!(
            "Clustered {} pixels into {} groups ({} populated) in {} iterations",
            points.len(),
            k,
            active,
            iterations
        );

        Ok(ClusterResult {
            clusters,
            assignments,
            iterations,
            converged,
        })
    }

    /// Clusters the sample and returns its dominant color
    pub fn dominant(&self, sample: &PixelSample) -> Result<DominantColor> {
        Ok(self.cluster(sample)?.dominant())
    }

    /// k-means++ seeding: each new centroid is drawn with probability proportional
    /// to its squared distance from the nearest centroid chosen so far. Stops early
    /// once every pixel coincides with a chosen centroid.
    fn initial_centroids(&self, points: &[Point]) -> Vec<Point> {
        let k = self.config.k;
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let mut centroids = vec![points[rng.gen_range(0..points.len())]];

        let mut nearest_dist: Vec<f64> = points
            .iter()
            .map(|p| distance_squared(p, &centroids[0]))
            .collect();

        while centroids.len() < k {
            let total: f64 = nearest_dist.iter().sum();
            if total <= 0.0 {
                break;
            }

            let target = rng.gen::<f64>() * total;
            let mut acc = 0.0;
            let mut chosen = None;
            for (i, d) in nearest_dist.iter().enumerate() {
                acc += d;
                if *d > 0.0 && acc >= target {
                    chosen = Some(i);
                    break;
                }
            }
            // Rounding can leave target just above the final sum
            let idx = chosen.unwrap_or_else(|| {
                nearest_dist
                    .iter()
                    .rposition(|d| *d > 0.0)
                    .unwrap_or(0)
            });
            let next = points[idx];

            for (d, p) in nearest_dist.iter_mut().zip(points) {
                *d = d.min(distance_squared(p, &next));
            }
            centroids.push(next);
        }

        centroids
    }
}

/// Rejects cluster counts outside `1..=MAX_CLUSTER_COUNT`
pub fn validate_cluster_count(k: usize) -> Result<()> {
    if k < 1 {
        return Err(AnalysisError::invalid_input(
            "cluster count must be at least 1",
        ));
    }
    if k > MAX_CLUSTER_COUNT {
        return Err(AnalysisError::invalid_input(format!(
            "cluster count {} exceeds the maximum of {}",
            k, MAX_CLUSTER_COUNT
        )));
    }
    Ok(())
}
