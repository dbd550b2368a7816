pub mod admm;

pub use admm::Pogs;
