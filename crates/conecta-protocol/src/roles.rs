use crate::types::GlobalRole;

/// What a global role may do in the UI.
///
/// Every screen gates its affordances through this one predicate set; actual
/// enforcement lives in the backend's row-level policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub manage_ministries: bool,
    pub manage_ministry_members: bool,
    pub manage_invites: bool,
    pub manage_member_roles: bool,
    pub create_announcements: bool,
    pub create_events: bool,
}

impl Capabilities {
    pub fn for_role(role: GlobalRole) -> Self {
        match role {
            GlobalRole::Member => Self {
                manage_ministries: false,
                manage_ministry_members: false,
                manage_invites: false,
                manage_member_roles: false,
                create_announcements: false,
                create_events: false,
            },
            GlobalRole::Leader => Self {
                manage_ministries: false,
                manage_ministry_members: true,
                manage_invites: false,
                manage_member_roles: false,
                create_announcements: true,
                create_events: true,
            },
            GlobalRole::Pastor => Self {
                manage_ministries: true,
                manage_ministry_members: true,
                manage_invites: true,
                manage_member_roles: true,
                create_announcements: true,
                create_events: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_sees_no_admin_affordances() {
        let caps = Capabilities::for_role(GlobalRole::Member);
        assert!(!caps.manage_ministries);
        assert!(!caps.manage_ministry_members);
        assert!(!caps.manage_invites);
        assert!(!caps.manage_member_roles);
    }

    #[test]
    fn pastor_sees_ministry_creation_and_member_management() {
        let caps = Capabilities::for_role(GlobalRole::Pastor);
        assert!(caps.manage_ministries);
        assert!(caps.manage_ministry_members);
        assert!(caps.manage_invites);
        assert!(caps.manage_member_roles);
    }

    #[test]
    fn leader_manages_members_but_not_ministries() {
        let caps = Capabilities::for_role(GlobalRole::Leader);
        assert!(!caps.manage_ministries);
        assert!(caps.manage_ministry_members);
        assert!(caps.create_events);
    }
}
