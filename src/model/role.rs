use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User = 1,
    Moderator = 2,
    Admin = 3,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Moderator, Role::Admin];

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::User),
            2 => Some(Role::Moderator),
            3 => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Name stored in the `roles` table.
    pub fn db_name(self) -> String {
        format!("ROLE_{}", self)
    }
}
