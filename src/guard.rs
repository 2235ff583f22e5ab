// Access guard: turns a presented key into a role and enforces it

use rusqlite::Connection;
use anyhow::Result;
use crate::models::{AccessKey, Role};
use crate::repo::AccessKeyRepo;

/// Validate a presented key and return the matching access key record
pub fn authenticate(conn: &Connection, key: Option<&str>) -> Result<AccessKey> {
    let key = match key.map(str::trim) {
        Some(k) if !k.is_empty() => k,
        _ => anyhow::bail!("Access key is required"),
    };

    match AccessKeyRepo::verify(conn, key)? {
        Some(access) => {
            log::debug!("Authenticated key with role {}", access.role.as_str());
            Ok(access)
        }
        None => anyhow::bail!("Invalid access key"),
    }
}

/// Require the admin role
pub fn require_admin(access: &AccessKey) -> Result<()> {
    if access.role != Role::Admin {
        anyhow::bail!("Forbidden: admin access required");
    }
    Ok(())
}

/// Require a regular user or admin role
pub fn require_user(access: &AccessKey) -> Result<()> {
    match access.role {
        Role::Admin | Role::User => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;

    #[test]
    fn test_missing_key() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let err = authenticate(&conn, None).unwrap_err();
        assert_eq!(err.to_string(), "Access key is required");
        let err = authenticate(&conn, Some("  ")).unwrap_err();
        assert_eq!(err.to_string(), "Access key is required");
    }

    #[test]
    fn test_invalid_key() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let err = authenticate(&conn, Some("nope")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid access key");
    }

    #[test]
    fn test_roles() {
        let conn = DbConnection::connect_in_memory().unwrap();
        AccessKeyRepo::register(&conn, "admin", Role::Admin, None).unwrap();
        AccessKeyRepo::register(&conn, "user", Role::User, None).unwrap();

        let admin = authenticate(&conn, Some("admin")).unwrap();
        let user = authenticate(&conn, Some("user")).unwrap();

        assert!(require_admin(&admin).is_ok());
        assert!(require_user(&admin).is_ok());
        assert!(require_user(&user).is_ok());
        let err = require_admin(&user).unwrap_err();
        assert!(err.to_string().starts_with("Forbidden"));
    }
}
