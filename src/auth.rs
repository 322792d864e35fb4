//! Role-based access checks
//!
//! The session is passed in explicitly; nothing here reads global state.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::BuildHasher;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Recruiter,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Recruiter => "recruiter",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role {0:?} (expected student, recruiter or admin)")]
pub struct ParseRoleError(String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "recruiter" => Ok(Role::Recruiter),
            "admin" => Ok(Role::Admin),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// True when `role` is one of `required`. An empty set admits everyone.
pub fn is_authorized<S: BuildHasher>(role: Role, required: &HashSet<Role, S>) -> bool {
    required.is_empty() || required.contains(&role)
}

/// Roles allowed to run a career consultation
pub fn consultation_roles() -> HashSet<Role> {
    HashSet::from([Role::Student, Role::Admin])
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("{role} {user_id} is not allowed here")]
    Forbidden { user_id: String, role: Role },
}

/// Identity of the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: String,
    pub role: Role,
}

impl AuthSession {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn require<S: BuildHasher>(&self, required: &HashSet<Role, S>) -> Result<(), AuthError> {
        if is_authorized(self.role, required) {
            Ok(())
        } else {
            Err(AuthError::Forbidden {
                user_id: self.user_id.clone(),
                role: self.role,
            })
        }
    }
}
