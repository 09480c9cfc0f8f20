use crate::models::UserIdentity;

/// Role hierarchy for permission checks.
/// Must match the backend's role names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Unknown = 0,
    Readonly = 1,
    Member = 2,
    OrgAdmin = 3,
    SysAdmin = 4,
}

impl Role {
    /// Unrecognized names map to `Unknown`, which ranks below every real role
    pub fn from_name(name: &str) -> Self {
        match name {
            "readonly" => Role::Readonly,
            "member" => Role::Member,
            "org_admin" => Role::OrgAdmin,
            "sys_admin" => Role::SysAdmin,
            _ => Role::Unknown,
        }
    }

    pub fn level(&self) -> u8 {
        *self as u8
    }
}

/// Does `user` hold at least `min_role`?
///
/// No minimum (or an empty one) always passes; a missing user or a user
/// without a role never does.
pub fn has_required_role(user: Option<&UserIdentity>, min_role: Option<&str>) -> bool {
    let Some(min_role) = min_role.filter(|r| !r.is_empty()) else {
        return true;
    };
    let Some(role) = user.and_then(|u| u.role.as_ref()) else {
        return false;
    };

    Role::from_name(&role.name) >= Role::from_name(min_role)
}
