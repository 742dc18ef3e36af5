pub const ROLE_SUPER_ADMIN: &str = "super_admin";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_CASHIER: &str = "cashier";

/// Highest privilege first.
pub const ROLE_HIERARCHY: &[&str] = &[ROLE_SUPER_ADMIN, ROLE_ADMIN, ROLE_MANAGER, ROLE_CASHIER];

/// Position in [`ROLE_HIERARCHY`]; lower is more privileged. Unknown roles
/// have no rank.
pub fn rank(role: &str) -> Option<usize> {
    ROLE_HIERARCHY
        .iter()
        .position(|known| known.eq_ignore_ascii_case(role.trim()))
}
