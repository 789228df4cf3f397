use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A TypeScript compiler version a package can declare compatibility with.
///
/// The header token `latest` resolves to [`CompilerVersion::LATEST`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompilerVersion {
    #[serde(rename = "2.0")]
    V2_0,
    #[serde(rename = "2.1")]
    V2_1,
    #[serde(rename = "2.2")]
    V2_2,
    #[serde(rename = "2.3", alias = "latest")]
    V2_3,
}

impl CompilerVersion {
    pub const LATEST: CompilerVersion = CompilerVersion::V2_3;

    pub const ALL: [CompilerVersion; 4] = [Self::V2_0, Self::V2_1, Self::V2_2, Self::V2_3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V2_0 => "2.0",
            Self::V2_1 => "2.1",
            Self::V2_2 => "2.2",
            Self::V2_3 => "2.3",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "2.0" => Some(Self::V2_0),
            "2.1" => Some(Self::V2_1),
            "2.2" => Some(Self::V2_2),
            "2.3" | "latest" => Some(Self::V2_3),
            _ => None,
        }
    }

    pub fn is_latest(&self) -> bool {
        *self == Self::LATEST
    }
}

impl fmt::Display for CompilerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompilerVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::UnsupportedVersion(s.to_string()))
    }
}
