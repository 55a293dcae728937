use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_ADMIN, ROLE_CUSTOMER};

/// Role claim carried by storefront access tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    /// Parse a role claim; unknown roles are rejected rather than downgraded
    pub fn from_claim(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            ROLE_ADMIN => Some(Role::Admin),
            ROLE_CUSTOMER => Some(Role::Customer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Customer => ROLE_CUSTOMER,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Caller identity resolved from a validated bearer token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Check if user may mutate the catalog
    pub fn is_admin(&self) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Customer => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_claim() {
        assert_eq!(Role::from_claim("admin"), Some(Role::Admin));
        assert_eq!(Role::from_claim("Admin"), Some(Role::Admin));
        assert_eq!(Role::from_claim("customer"), Some(Role::Customer));
        assert_eq!(Role::from_claim("superuser"), None);
    }

    #[test]
    fn test_only_admin_role_is_admin() {
        let admin = AuthenticatedUser {
            user_id: "1".to_string(),
            role: Role::Admin,
        };
        let customer = AuthenticatedUser {
            user_id: "2".to_string(),
            role: Role::Customer,
        };
        assert!(admin.is_admin());
        assert!(!customer.is_admin());
    }
}
