//! Role codes and the catalog that maps them to stored role rows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Every role the service knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCode {
    Admin,
    Staff,
    Employee,
    Leader,
}

impl RoleCode {
    pub const ALL: [RoleCode; 4] = [
        RoleCode::Admin,
        RoleCode::Staff,
        RoleCode::Employee,
        RoleCode::Leader,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleCode::Admin => "admin",
            RoleCode::Staff => "staff",
            RoleCode::Employee => "employee",
            RoleCode::Leader => "leader",
        }
    }
}

impl fmt::Display for RoleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleError {
    #[error("unknown role: {0}")]
    Unknown(String),

    #[error("role '{0}' cannot be requested during onboarding")]
    NotSelfAssignable(RoleCode),
}

impl FromStr for RoleCode {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| RoleError::Unknown(s.to_string()))
    }
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    stored_code: String,
    self_assignable: bool,
}

/// Maps role codes to the codes stored in the roles table.
///
/// Built once at startup and shared read-only. Only self-assignable
/// codes may be requested through onboarding; `admin` is reserved for
/// the bootstrap path.
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    entries: BTreeMap<RoleCode, CatalogEntry>,
}

impl RoleCatalog {
    /// An empty catalog. Use [`RoleCatalog::with_role`] to populate it.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn with_role(
        mut self,
        code: RoleCode,
        stored_code: impl Into<String>,
        self_assignable: bool,
    ) -> Self {
        self.entries.insert(
            code,
            CatalogEntry {
                stored_code: stored_code.into(),
                self_assignable,
            },
        );
        self
    }

    /// The catalog matching the seeded roles table.
    pub fn standard() -> Self {
        Self::empty()
            .with_role(RoleCode::Admin, "admin", false)
            .with_role(RoleCode::Staff, "staff", true)
            .with_role(RoleCode::Employee, "employee", true)
            .with_role(RoleCode::Leader, "leader", true)
    }

    /// Maps requested codes onto stored codes for onboarding.
    ///
    /// Codes missing from the catalog are unknown; codes present but reserved
    /// are not self-assignable. Duplicates collapse to one entry and the order
    /// of first appearance is kept.
    pub fn resolve(&self, requested: &[RoleCode]) -> Result<Vec<String>, RoleError> {
        let mut stored: Vec<String> = Vec::with_capacity(requested.len());
        for &code in requested {
            let Some(entry) = self.entries.get(&code) else {
                return Err(RoleError::Unknown(code.to_string()));
            };
            if !entry.self_assignable {
                return Err(RoleError::NotSelfAssignable(code));
            }
            if !stored.contains(&entry.stored_code) {
                stored.push(entry.stored_code.clone());
            }
        }
        Ok(stored)
    }
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
