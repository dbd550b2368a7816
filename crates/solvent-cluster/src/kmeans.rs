use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use solvent_core::{Matrix, SolverError, SolverResult, Transformer};
use tracing::debug;

/// Lloyd's algorithm with k-means++ seeding.
pub struct KMeans {
    pub n_clusters: usize,
    pub max_iter: usize,
    /// Stop when no centroid moves further than this between iterations.
    pub tol: f64,
    pub seed: Option<u64>,
    pub centroids: Option<Matrix>,
    pub labels: Option<Vec<usize>>,
    /// Sum of squared distances to the assigned centroids.
    pub inertia: Option<f64>,
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        KMeans {
            n_clusters,
            max_iter: 300,
            tol: 1e-4,
            seed: Some(42),
            centroids: None,
            labels: None,
            inertia: None,
        }
    }

    pub fn fit(&mut self, x: &Matrix) -> SolverResult<()> {
        let n = x.rows();
        let d = x.cols();
        if n == 0 || d == 0 {
            return Err(SolverError::EmptyInput);
        }
        if self.n_clusters == 0 || self.n_clusters > n {
            return Err(SolverError::InvalidParameter(format!(
                "n_clusters must lie in [1, {}], got {}",
                n, self.n_clusters
            )));
        }

        let mut centroids = self.seed_centroids(x)?;
        let mut labels = vec![0usize; n];

        for iter in 0..self.max_iter {
            // Assignment
            for i in 0..n {
                labels[i] = Self::nearest(&centroids, x.row(i)).0;
            }

            // Update
            let mut sums = Matrix::zeros(self.n_clusters, d);
            let mut counts = vec![0usize; self.n_clusters];
            for i in 0..n {
                let k = labels[i];
                counts[k] += 1;
                for (j, v) in x.row(i).iter().enumerate() {
                    sums[(k, j)] += v;
                }
            }
            let mut max_shift: f64 = 0.0;
            for k in 0..self.n_clusters {
                if counts[k] == 0 {
                    // Empty cluster keeps its previous centroid.
                    continue;
                }
                for j in 0..d {
                    let new = sums[(k, j)] / counts[k] as f64;
                    max_shift = max_shift.max((new - centroids[(k, j)]).abs());
                    centroids[(k, j)] = new;
                }
            }

            if iter % 10 == 0 {
                debug!(iter, max_shift, "lloyd iteration");
            }
            if max_shift < self.tol {
                break;
            }
        }

        let inertia = (0..n)
            .map(|i| Self::nearest(&centroids, x.row(i)).1)
            .sum();

        self.centroids = Some(centroids);
        self.labels = Some(labels);
        self.inertia = Some(inertia);
        Ok(())
    }

    /// Cluster index for each new row.
    pub fn predict(&self, x: &Matrix) -> SolverResult<Vec<usize>> {
        let centroids = self
            .centroids
            .as_ref()
            .ok_or(SolverError::NotFitted("KMeans"))?;
        if x.cols() != centroids.cols() {
            return Err(SolverError::DimensionMismatch(format!(
                "{} features against centroids with {}",
                x.cols(),
                centroids.cols()
            )));
        }
        Ok((0..x.rows())
            .map(|i| Self::nearest(centroids, x.row(i)).0)
            .collect())
    }

    fn nearest(centroids: &Matrix, point: &[f64]) -> (usize, f64) {
        let mut best = (0usize, f64::INFINITY);
        for k in 0..centroids.rows() {
            let dist = centroids.row_distance_sq(k, point);
            if dist < best.1 {
                best = (k, dist);
            }
        }
        best
    }

    /// k-means++: first centroid uniform, the rest proportional to the
    /// squared distance to the closest centroid picked so far.
    fn seed_centroids(&self, x: &Matrix) -> SolverResult<Matrix> {
        let n = x.rows();
        let d = x.cols();
        let mut rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        let mut rows: Vec<usize> = Vec::with_capacity(self.n_clusters);
        rows.push(rng.gen_range(0..n));

        while rows.len() < self.n_clusters {
            let mut dist_sq = vec![f64::INFINITY; n];
            for i in 0..n {
                for &c in &rows {
                    let dist = x.row_distance_sq(i, x.row(c));
                    if dist < dist_sq[i] {
                        dist_sq[i] = dist;
                    }
                }
            }
            let total: f64 = dist_sq.iter().sum();
            if total == 0.0 {
                // All remaining points coincide with a centroid.
                rows.push(rng.gen_range(0..n));
                continue;
            }
            let threshold = rng.gen::<f64>() * total;
            let mut cumulative = 0.0;
            let mut chosen = n - 1;
            for (i, &dist) in dist_sq.iter().enumerate() {
                cumulative += dist;
                if cumulative >= threshold {
                    chosen = i;
                    break;
                }
            }
            rows.push(chosen);
        }

        let mut centroids = Matrix::zeros(self.n_clusters, d);
        for (k, &i) in rows.iter().enumerate() {
            for (j, v) in x.row(i).iter().enumerate() {
                centroids[(k, j)] = *v;
            }
        }
        Ok(centroids)
    }
}

impl Transformer for KMeans {
    fn fit(&mut self, x: &Matrix) -> SolverResult<()> {
        KMeans::fit(self, x)
    }

    /// Euclidean distance to each centroid, one column per cluster.
    fn transform(&self, x: &Matrix) -> SolverResult<Matrix> {
        let centroids = self
            .centroids
            .as_ref()
            .ok_or(SolverError::NotFitted("KMeans"))?;
        if x.cols() != centroids.cols() {
            return Err(SolverError::DimensionMismatch(format!(
                "{} features against centroids with {}",
                x.cols(),
                centroids.cols()
            )));
        }
        let mut out = Matrix::zeros(x.rows(), centroids.rows());
        for i in 0..x.rows() {
            for k in 0..centroids.rows() {
                out[(i, k)] = centroids.row_distance_sq(k, x.row(i)).sqrt();
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Matrix {
        Matrix::from_rows(&[
            vec![0.0, 0.0],
            vec![0.5, 0.5],
            vec![1.0, 0.0],
            vec![10.0, 10.0],
            vec![10.5, 10.5],
            vec![11.0, 10.0],
        ])
        .unwrap()
    }

    #[test]
    fn separates_two_blobs() {
        let x = two_blobs();
        let mut km = KMeans::new(2);
        km.fit(&x).unwrap();

        let labels = km.labels.as_ref().unwrap();
        assert_ne!(labels[0], labels[3]);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[3], labels[4]);
        assert!(km.inertia.unwrap() < 5.0);
    }

    #[test]
    fn predict_assigns_to_nearest_centroid() {
        let x = two_blobs();
        let mut km = KMeans::new(2);
        km.fit(&x).unwrap();

        let probe = Matrix::from_rows(&[vec![0.2, 0.2], vec![10.2, 10.2]]).unwrap();
        let assigned = km.predict(&probe).unwrap();
        let labels = km.labels.as_ref().unwrap();
        assert_eq!(assigned[0], labels[0]);
        assert_eq!(assigned[1], labels[3]);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let x = two_blobs();
        let mut a = KMeans::new(2);
        let mut b = KMeans::new(2);
        a.fit(&x).unwrap();
        b.fit(&x).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.centroids, b.centroids);
    }

    #[test]
    fn transform_yields_centroid_distances() {
        let x = two_blobs();
        let mut km = KMeans::new(2);
        km.fit(&x).unwrap();

        let d = km.transform(&x).unwrap();
        assert_eq!(d.shape(), (6, 2));
        // Each row is closest to the centroid it was assigned to.
        let labels = km.labels.as_ref().unwrap();
        for i in 0..x.rows() {
            let own = labels[i];
            assert!(d[(i, own)] < d[(i, 1 - own)]);
        }
    }

    #[test]
    fn too_many_clusters_rejected() {
        let x = two_blobs();
        let mut km = KMeans::new(7);
        assert!(matches!(
            km.fit(&x),
            Err(SolverError::InvalidParameter(_))
        ));
    }

    #[test]
    fn predict_requires_fit() {
        let km = KMeans::new(2);
        assert!(matches!(
            km.predict(&two_blobs()),
            Err(SolverError::NotFitted(_))
        ));
    }
}
