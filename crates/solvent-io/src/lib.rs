pub mod csv_io;
pub mod model_io;

pub use csv_io::{read_matrix_csv, write_matrix_csv};
pub use model_io::{load_artifact, save_artifact, ModelArtifact};
