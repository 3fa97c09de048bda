use serde::{Deserialize, Serialize};
use std::fmt;

/// User role
///
/// Closed enumeration; every authorization check matches exhaustively.
/// Wire codes match the stored/string representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum UserRole {
    #[default]
    User = 0,
    Researcher = 1,
    Admin = 2,
}

impl UserRole {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            User => "user",
            Researcher => "researcher",
            Admin => "admin",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        use UserRole::*;
        match id {
            0 => Some(User),
            1 => Some(Researcher),
            2 => Some(Admin),
            _ => None,
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        use UserRole::*;
        match code {
            "user" => Some(User),
            "researcher" => Some(Researcher),
            "admin" => Some(Admin),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_id() {
        assert_eq!(UserRole::from_id(0), Some(UserRole::User));
        assert_eq!(UserRole::from_id(1), Some(UserRole::Researcher));
        assert_eq!(UserRole::from_id(2), Some(UserRole::Admin));
        assert_eq!(UserRole::from_id(99), None);
    }

    #[test]
    fn test_user_role_from_code() {
        assert_eq!(UserRole::from_code("user"), Some(UserRole::User));
        assert_eq!(UserRole::from_code("researcher"), Some(UserRole::Researcher));
        assert_eq!(UserRole::from_code("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_code("superuser"), None);
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(UserRole::User.to_string(), "user");
        assert_eq!(UserRole::Researcher.to_string(), "researcher");
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_is_admin() {
        assert!(!UserRole::User.is_admin());
        assert!(!UserRole::Researcher.is_admin());
        assert!(UserRole::Admin.is_admin());
    }
}
