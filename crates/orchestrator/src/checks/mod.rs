//! Static checks over a package's configuration files.

mod compiler_config;
mod manifest;

pub use compiler_config::{check_compiler_config, TSCONFIG_FILE};
pub use manifest::{check_manifest, default_allowed_fields, PACKAGE_JSON_FILE};
