pub mod options;
pub mod package;
pub mod version;
