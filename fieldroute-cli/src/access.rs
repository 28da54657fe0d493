//! Role-based capability checks for CLI commands.
//!
//! The sequencing engine never looks at permissions; each command declares the
//! capability it needs and the CLI refuses to run it for roles that lack it.

use std::{fmt, str::FromStr};

use crate::CliError;

/// Something a caller may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Read points and compute previews.
    Read,
    /// Write the advisory display order.
    Write,
    /// Overwrite sequence numbers and manage the database.
    Admin,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Admin => "admin",
        })
    }
}

/// Named bundle of capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Read-only access.
    #[default]
    Reader,
    /// Reads and display-order writes.
    Operator,
    /// Everything.
    Admin,
}

impl Role {
    /// Capabilities granted by the role.
    #[must_use]
    pub const fn capabilities(self) -> &'static [Capability] {
        match self {
            Self::Reader => &[Capability::Read],
            Self::Operator => &[Capability::Read, Capability::Write],
            Self::Admin => &[Capability::Read, Capability::Write, Capability::Admin],
        }
    }

    /// Whether the role grants `capability`.
    #[must_use]
    pub fn grants(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Fail with [`CliError::Forbidden`] unless the role grants `capability`.
    pub fn require(self, capability: Capability) -> Result<(), CliError> {
        if self.grants(capability) {
            Ok(())
        } else {
            Err(CliError::Forbidden {
                role: self,
                capability,
            })
        }
    }

    /// Parse an optional role name, defaulting to [`Role::Reader`].
    pub fn resolve(value: Option<&str>) -> Result<Self, CliError> {
        value.map_or(Ok(Self::default()), str::parse)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reader => "reader",
            Self::Operator => "operator",
            Self::Admin => "admin",
        })
    }
}

impl FromStr for Role {
    type Err = CliError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reader" => Ok(Self::Reader),
            "operator" => Ok(Self::Operator),
            "admin" => Ok(Self::Admin),
            _ => Err(CliError::InvalidRole {
                value: value.to_owned(),
            }),
        }
    }
}
