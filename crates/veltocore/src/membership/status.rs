use strum::{AsRefStr, Display, EnumString};

/// Membership status of a user in the group, named the way the Bot API names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MemberStatus {
    /// Counts as "already in the group" for the start short-circuit.
    pub fn is_active_member(self) -> bool {
        matches!(self, Self::Member | Self::Administrator | Self::Creator)
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Administrator | Self::Creator)
    }

    /// The user is out of the group.
    pub fn is_gone(self) -> bool {
        matches!(self, Self::Left | Self::Kicked)
    }
}
