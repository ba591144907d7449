pub mod analysis_result;
pub mod image;
pub mod settings;
