//! Exercises every re-exported solver through the flat namespace.

use solvent_core::{Estimator, Matrix, Transformer};

fn regression_data() -> (Matrix, Vec<f64>) {
    let x = Matrix::from_rows(&[
        vec![1.0, 0.3],
        vec![2.0, 1.1],
        vec![3.0, 0.7],
        vec![4.0, 2.4],
        vec![5.0, 1.9],
        vec![6.0, 3.2],
    ])
    .unwrap();
    let y: Vec<f64> = (0..x.rows())
        .map(|i| 2.0 * x[(i, 0)] - 0.5 * x[(i, 1)] + 1.0)
        .collect();
    (x, y)
}

fn classification_data() -> (Matrix, Vec<f64>) {
    let x = Matrix::from_rows(&[
        vec![0.0, 0.2],
        vec![0.5, 0.1],
        vec![0.2, 0.4],
        vec![4.0, 4.2],
        vec![4.5, 3.9],
        vec![5.0, 4.4],
    ])
    .unwrap();
    let y = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
    (x, y)
}

#[test]
fn regressors_fit_through_the_facade() {
    let (x, y) = regression_data();

    let mut pogs = solvent::Pogs::new(0.01, 0.5);
    pogs.fit(&x, &y).unwrap();
    assert!(pogs.predict(&x).unwrap().len() == y.len());

    let mut enet_native = solvent::ElasticNetH2O::new(0.01, 0.5);
    enet_native.fit(&x, &y).unwrap();

    let mut enet = solvent::ElasticNet::new();
    enet.fit(&x, &y).unwrap();

    let mut ols = solvent::LinearRegression::new();
    ols.fit(&x, &y).unwrap();
    let fitted = ols.predict(&x).unwrap();
    for (p, t) in fitted.iter().zip(&y) {
        assert!((p - t).abs() < 1e-6);
    }

    let mut lasso = solvent::Lasso::new(0.01);
    lasso.fit(&x, &y).unwrap();

    let mut ridge = solvent::Ridge::new(0.1);
    ridge.fit(&x, &y).unwrap();

    let mut forest = solvent::RandomForestRegressor::new(5, 3);
    forest.fit(&x, &y).unwrap();
    assert_eq!(forest.predict(&x).unwrap().len(), y.len());

    let mut boosting = solvent::GradientBoostingRegressor::new(10, 0.1, 2);
    boosting.fit(&x, &y).unwrap();
    assert_eq!(boosting.predict(&x).unwrap().len(), y.len());
}

#[test]
fn classifiers_fit_through_the_facade() {
    let (x, y) = classification_data();

    let mut logistic = solvent::LogisticRegression::new(0.5, 500);
    logistic.fit(&x, &y).unwrap();
    assert_eq!(logistic.predict(&x).unwrap(), y);

    let mut forest = solvent::RandomForestClassifier::new(5, 3);
    forest.fit(&x, &y).unwrap();
    assert_eq!(forest.predict(&x).unwrap(), y);

    let mut boosting = solvent::GradientBoostingClassifier::new(10, 0.3, 2);
    boosting.fit(&x, &y).unwrap();
    assert_eq!(boosting.predict(&x).unwrap(), y);
}

#[test]
fn kmeans_fits_through_the_facade() {
    let (x, _) = classification_data();
    let mut km = solvent::KMeans::new(2);
    km.fit(&x).unwrap();
    let labels = km.labels.as_ref().unwrap();
    assert_eq!(labels[0], labels[1]);
    assert_eq!(labels[3], labels[4]);
    assert_ne!(labels[0], labels[3]);
}

#[test]
fn decomposition_fits_through_the_facade() {
    let (x, _) = regression_data();

    let mut svd_native = solvent::TruncatedSVDH2O::new(1);
    let reduced = svd_native.fit_transform(&x).unwrap();
    assert_eq!(reduced.shape(), (x.rows(), 1));

    let mut svd = solvent::TruncatedSVD::new(1);
    svd.fit(&x).unwrap();
    assert_eq!(svd.transform(&x).unwrap().shape(), (x.rows(), 1));
}

// The facade re-exports the source types themselves, not wrappers.
#[test]
fn facade_types_are_the_source_crate_types() {
    fn native_kmeans(_: &solvent_cluster::KMeans) {}
    fn native_ridge(_: &solvent_linear::Ridge) {}
    fn native_svd(_: &solvent_decomposition::TruncatedSVD) {}

    native_kmeans(&solvent::KMeans::new(2));
    native_ridge(&solvent::Ridge::new(1.0));
    native_svd(&solvent::TruncatedSVD::new(1));
}
