use super::page::Page;

pub const CHANGE_PAGE: &str = "change_page";

/// The requester, as seen by the access policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum User {
    Anonymous,
    Authenticated {
        username: String,
        is_superuser: bool,
        permissions: Vec<String>,
    },
}

impl User {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, User::Authenticated { .. })
    }

    pub fn has_perm(&self, codename: &str) -> bool {
        match self {
            User::Anonymous => false,
            User::Authenticated {
                is_superuser,
                permissions,
                ..
            } => *is_superuser || permissions.iter().any(|p| p == codename),
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            User::Anonymous => None,
            User::Authenticated { username, .. } => Some(username),
        }
    }
}

/// Community pages are open to everyone; anything else needs `change_page`.
pub fn can_edit(page: Option<&Page>, user: &User) -> bool {
    match page {
        Some(page) if page.is_community() => true,
        _ => user.has_perm(CHANGE_PAGE),
    }
}
