//! Read access to the member directory.
//!
//! The directory is owned elsewhere; the roster only needs member identity,
//! names and qualified roles.

use crate::models::{Member, MemberId, Role};
use crate::utils::{cmp_ignore_case, contains_ignore_case};

pub trait MemberDirectory {
    fn member(&self, id: &MemberId) -> Option<&Member>;

    fn members(&self) -> &[Member];

    /// Display name for a member id, falling back to the id itself.
    fn display_name(&self, id: &MemberId) -> String {
        self.member(id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

/// In-memory member directory.
#[derive(Debug, Clone, Default)]
pub struct MemberList {
    members: Vec<Member>,
}

impl MemberList {
    pub fn new(members: Vec<Member>) -> Self {
        let mut list = Self::default();
        for member in members {
            list.upsert(member);
        }
        list
    }

    /// Insert a member, replacing any existing record with the same id.
    pub fn upsert(&mut self, member: Member) {
        match self.members.iter_mut().find(|m| m.id == member.id) {
            Some(existing) => *existing = member,
            None => self.members.push(member),
        }
    }

    pub fn remove(&mut self, id: &MemberId) -> Option<Member> {
        let index = self.members.iter().position(|m| &m.id == id)?;
        Some(self.members.remove(index))
    }

    /// Members whose name or email contains `query`, sorted by name.
    pub fn search(&self, query: &str) -> Vec<&Member> {
        let query = query.trim();
        let mut found: Vec<&Member> = self
            .members
            .iter()
            .filter(|m| {
                contains_ignore_case(&m.name, query)
                    || m.email
                        .as_deref()
                        .map(|e| contains_ignore_case(e, query))
                        .unwrap_or(false)
            })
            .collect();
        found.sort_by(|a, b| cmp_ignore_case(&a.name, &b.name));
        found
    }

    pub fn with_role(&self, role: Role) -> Vec<&Member> {
        self.sorted_by_name()
            .into_iter()
            .filter(|m| m.is_qualified(role))
            .collect()
    }

    pub fn active(&self) -> Vec<&Member> {
        self.sorted_by_name()
            .into_iter()
            .filter(|m| m.active)
            .collect()
    }

    pub fn sorted_by_name(&self) -> Vec<&Member> {
        let mut sorted: Vec<&Member> = self.members.iter().collect();
        sorted.sort_by(|a, b| cmp_ignore_case(&a.name, &b.name));
        sorted
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn into_members(self) -> Vec<Member> {
        self.members
    }
}

impl MemberDirectory for MemberList {
    fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == id)
    }

    fn members(&self) -> &[Member] {
        &self.members
    }
}
