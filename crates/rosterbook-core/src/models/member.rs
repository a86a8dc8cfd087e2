use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RosterError;
use crate::utils::format_phone;

/// Stable identifier of a ministry member, owned by the member directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MemberId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MemberId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A function a member can fill at a service.
///
/// Declaration order is the canonical sort order (used by `BTreeSet<Role>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Drums,
    Bass,
    Guitar,
    AcousticGuitar,
    Vocal,
    WorshipLeader,
    Media,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Drums,
        Role::Bass,
        Role::Guitar,
        Role::AcousticGuitar,
        Role::Vocal,
        Role::WorshipLeader,
        Role::Media,
    ];

    /// Machine name, matching the serialized form.
    pub fn key(&self) -> &'static str {
        match self {
            Role::Drums => "drums",
            Role::Bass => "bass",
            Role::Guitar => "guitar",
            Role::AcousticGuitar => "acoustic-guitar",
            Role::Vocal => "vocal",
            Role::WorshipLeader => "worship-leader",
            Role::Media => "media",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Drums => "Drums",
            Role::Bass => "Bass",
            Role::Guitar => "Guitar",
            Role::AcousticGuitar => "Acoustic Guitar",
            Role::Vocal => "Vocal",
            Role::WorshipLeader => "Worship Leader",
            Role::Media => "Media",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = RosterError;

    /// Accepts the kebab-case key in any case; spaces and underscores count as hyphens.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.key() == normalized)
            .ok_or_else(|| RosterError::UnknownRole(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub roles: BTreeSet<Role>,
    #[serde(rename = "isActive", default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Member {
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            phone: None,
            roles: BTreeSet::new(),
            active: true,
        }
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles.extend(roles);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn is_qualified(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn formatted_phone(&self) -> Option<String> {
        self.phone.as_deref().map(format_phone)
    }

    /// Comma separated role labels for list views
    pub fn roles_display(&self) -> String {
        if self.roles.is_empty() {
            return "-".to_string();
        }
        self.roles
            .iter()
            .map(|r| r.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
