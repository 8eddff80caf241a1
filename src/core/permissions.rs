//! Role-based authorization of mutations.
//!
//! Authentication happens elsewhere; these checks only decide whether an already
//! identified user's role may perform an action. Callers are expected to check before
//! invoking an operation, and every operation checks again and fails closed.

use crate::{
    errors::{Error, Result},
    models::Role,
};

/// Roles allowed to create plans.
pub const CAN_PLAN: &[Role] = &[Role::Admin, Role::Manager, Role::Planner];
/// Roles allowed to record actual output.
pub const CAN_RECORD: &[Role] = &[Role::Admin, Role::Manager, Role::Operator];
/// Roles allowed to edit or delete entries.
pub const CAN_MODIFY: &[Role] = &[Role::Admin, Role::Manager];
/// Roles allowed to administer staff accounts.
pub const CAN_ADMINISTER: &[Role] = &[Role::Admin];

/// Whether `role` is in `allowed`.
#[must_use]
pub fn is_allowed(role: Role, allowed: &[Role]) -> bool {
    allowed.contains(&role)
}

/// Fails with [`Error::Permission`] unless `role` is in `allowed`.
pub fn ensure_allowed(role: Role, allowed: &[Role], action: &'static str) -> Result<()> {
    if is_allowed(role, allowed) {
        Ok(())
    } else {
        Err(Error::Permission {
            role: role.to_string(),
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_permissions() {
        assert!(is_allowed(Role::Admin, CAN_PLAN));
        assert!(is_allowed(Role::Manager, CAN_PLAN));
        assert!(is_allowed(Role::Planner, CAN_PLAN));
        assert!(!is_allowed(Role::Operator, CAN_PLAN));
    }

    #[test]
    fn test_record_permissions() {
        assert!(is_allowed(Role::Operator, CAN_RECORD));
        assert!(!is_allowed(Role::Planner, CAN_RECORD));
    }

    #[test]
    fn test_modify_permissions() {
        assert!(is_allowed(Role::Admin, CAN_MODIFY));
        assert!(is_allowed(Role::Manager, CAN_MODIFY));
        assert!(!is_allowed(Role::Planner, CAN_MODIFY));
        assert!(!is_allowed(Role::Operator, CAN_MODIFY));
    }

    #[test]
    fn test_ensure_allowed_fails_closed() {
        let result = ensure_allowed(Role::Manager, CAN_ADMINISTER, "manage users");
        assert!(matches!(
            result,
            Err(Error::Permission {
                action: "manage users",
                ..
            })
        ));
        assert!(ensure_allowed(Role::Admin, CAN_ADMINISTER, "manage users").is_ok());
    }
}
