pub mod domain;
pub mod error;

pub use domain::package::Package;
pub use domain::options::TesterOptions;
pub use domain::version::CompilerVersion;
pub use error::CoreError;
