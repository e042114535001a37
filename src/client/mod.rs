pub mod csv_source;
pub mod uploader;

pub use csv_source::{parse_candidates, read_candidates_file};
pub use uploader::CandidateUploader;
