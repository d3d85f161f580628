//! Call-site policy the store itself stays agnostic about.

use stockroom_model::User;

/// Whether the management surface may delete this account. Admin accounts
/// are refused, which keeps the system from deleting its last admin.
pub fn can_delete_user(user: &User) -> bool {
    !user.is_admin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_model::{EntityId, Role};

    fn user_with_role(role: Role) -> User {
        User {
            id: EntityId(1),
            name: "Test".to_string(),
            department: "IT".to_string(),
            role,
            username: "test".to_string(),
            password: "123".to_string(),
        }
    }

    #[test]
    fn admins_are_not_deletable() {
        assert!(!can_delete_user(&user_with_role(Role::Admin)));
        assert!(can_delete_user(&user_with_role(Role::User)));
    }
}
