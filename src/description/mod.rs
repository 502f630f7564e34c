//! Versioned machine descriptions: cache, standard presets and the
//! activity-kind enumeration.
//!
//! Machines are description objects identified by (name, version) and
//! shared read-only across every activity of that type; the cache hands
//! out `Arc` references to the single loaded instance.

mod cache;
pub mod presets;

pub use cache::MachineCache;

use crate::machine::Error;
use std::fmt;
use std::str::FromStr;

/// The three activity kinds with a configurable default machine.
///
/// This is a closed enumeration; it is not extensible at runtime and any
/// other keyword fails to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineType {
    Elementary,
    Composite,
    Predefined,
}

impl MachineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Elementary => "Elementary",
            Self::Composite => "Composite",
            Self::Predefined => "Predefined",
        }
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MachineType {
    type Err = Error;

    fn from_str(keyword: &str) -> Result<Self, Self::Err> {
        match keyword {
            "Elementary" => Ok(Self::Elementary),
            "Composite" => Ok(Self::Composite),
            "Predefined" => Ok(Self::Predefined),
            other => Err(Error::InvalidData(format!(
                "Keyword '{other}' is not a supported activity kind"
            ))),
        }
    }
}
