pub mod kmeans;

pub use kmeans::KMeans;
