use serde::{Deserialize, Serialize};
use solvent_core::Matrix;
use std::error::Error;
use std::fs;
use std::path::Path;

/// Named fitted state of a model, serializable as JSON.
///
/// Solvers store plain vectors (coefficients, singular values) and matrices
/// (centroids, components) under string keys; the artifact carries both.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ModelArtifact {
    vectors: Vec<(String, Vec<f64>)>,
    matrices: Vec<(String, Matrix)>,
}

impl ModelArtifact {
    pub fn new() -> Self {
        ModelArtifact::default()
    }

    pub fn add_vector(&mut self, name: &str, values: &[f64]) {
        self.vectors.push((name.to_string(), values.to_vec()));
    }

    pub fn add_matrix(&mut self, name: &str, matrix: &Matrix) {
        self.matrices.push((name.to_string(), matrix.clone()));
    }

    pub fn vector(&self, name: &str) -> Option<&[f64]> {
        self.vectors
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn matrix(&self, name: &str) -> Option<&Matrix> {
        self.matrices.iter().find(|(n, _)| n == name).map(|(_, m)| m)
    }
}

pub fn save_artifact(artifact: &ModelArtifact, path: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(artifact)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_artifact(path: impl AsRef<Path>) -> Result<ModelArtifact, Box<dyn Error>> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn artifact_round_trips_through_json() {
        let path = std::env::temp_dir().join(format!(
            "solvent-artifact-{}.json",
            std::process::id()
        ));

        let mut artifact = ModelArtifact::new();
        artifact.add_vector("coefficients", &[1.5, -2.0, 0.0]);
        let centroids = Matrix::from_rows(&[vec![0.0, 0.0], vec![5.0, 5.0]]).unwrap();
        artifact.add_matrix("centroids", &centroids);

        save_artifact(&artifact, &path).unwrap();
        let back = load_artifact(&path).unwrap();

        assert_eq!(back.vector("coefficients").unwrap(), &[1.5, -2.0, 0.0]);
        assert_eq!(back.matrix("centroids").unwrap(), &centroids);
        assert!(back.vector("missing").is_none());
        fs::remove_file(&path).ok();
    }

    #[test]
    fn restores_a_fitted_ridge_model() {
        use solvent_core::Estimator;
        use solvent_linear::Ridge;

        let path = std::env::temp_dir().join(format!(
            "solvent-ridge-{}.json",
            std::process::id()
        ));

        let x = Matrix::from_rows(&[
            vec![1.0, 2.0],
            vec![2.0, 1.0],
            vec![3.0, 4.0],
            vec![4.0, 3.0],
        ])
        .unwrap();
        let y = vec![5.0, 4.0, 11.0, 10.0];

        let mut model = Ridge::new(0.1);
        model.fit(&x, &y).unwrap();

        let mut artifact = ModelArtifact::new();
        artifact.add_vector("coefficients", model.coefficients.as_ref().unwrap());
        artifact.add_vector("intercept", &[model.intercept]);
        save_artifact(&artifact, &path).unwrap();

        let back = load_artifact(&path).unwrap();
        let mut restored = Ridge::new(0.1);
        restored.coefficients = Some(back.vector("coefficients").unwrap().to_vec());
        restored.intercept = back.vector("intercept").unwrap()[0];

        assert_eq!(
            model.predict(&x).unwrap(),
            restored.predict(&x).unwrap()
        );
        fs::remove_file(&path).ok();
    }
}
