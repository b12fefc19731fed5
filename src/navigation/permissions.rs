use serde::{Deserialize, Serialize};

/// One grant held by the current user: an action (`method`) on a `module`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub module: String,
    pub method: String,
}

impl Permission {
    pub fn new(module: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            method: method.into(),
        }
    }
}

/// Grant a menu item asks for. Static, so the menu table can be a `const`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredPermission {
    pub module: &'static str,
    pub method: &'static str,
}

impl RequiredPermission {
    pub const fn new(module: &'static str, method: &'static str) -> Self {
        Self { module, method }
    }

    /// Module names must match exactly; methods ignore ASCII case, since the
    /// backend is not consistent about `GET` vs `get`.
    pub fn granted_by(&self, grant: &Permission) -> bool {
        grant.module == self.module && grant.method.eq_ignore_ascii_case(self.method)
    }

    pub fn is_granted(&self, grants: &[Permission]) -> bool {
        grants.iter().any(|g| self.granted_by(g))
    }
}

/// Account class from the session. Admin accounts created before grants
/// existed carry no grants at all and still see everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountClass {
    Admin,
    #[default]
    #[serde(other)]
    Staff,
}

impl AccountClass {
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_case_insensitive() {
        let need = RequiredPermission::new("campaigns", "GET");
        assert!(need.granted_by(&Permission::new("campaigns", "get")));
        assert!(need.granted_by(&Permission::new("campaigns", "GET")));
        assert!(!need.granted_by(&Permission::new("campaigns", "post")));
    }

    #[test]
    fn test_module_is_exact() {
        let need = RequiredPermission::new("campaigns", "get");
        assert!(!need.granted_by(&Permission::new("Campaigns", "get")));
        assert!(!need.granted_by(&Permission::new("campaign", "get")));
    }

    #[test]
    fn test_account_class_decoding() {
        let admin: AccountClass = serde_json::from_str(r#""admin""#).unwrap();
        assert_eq!(admin, AccountClass::Admin);
        let other: AccountClass = serde_json::from_str(r#""volunteer""#).unwrap();
        assert_eq!(other, AccountClass::Staff);
    }
}
