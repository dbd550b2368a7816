pub mod truncated_svd;

pub use truncated_svd::{TruncatedSVD, TruncatedSVDH2O};
