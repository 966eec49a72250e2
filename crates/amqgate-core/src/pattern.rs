//! Address allow-list compilation and matching.
//!
//! An allow-list is a comma separated string of tokens:
//! - `*` matches any address,
//! - `prefix*` matches addresses starting with `prefix`,
//! - anything else must match the address exactly.
//!
//! Tokens may contain the `${user}` placeholder. Before matching, the first
//! occurrence of the connection's user name in the proposed address is
//! replaced by the placeholder, so `${user}/*` admits `alice/inbox` for
//! `alice` only. Both the literal and the substituted address are tried.

/// Placeholder a rule author writes in place of the user name.
pub const USER_PLACEHOLDER: &str = "${user}";

const WILDCARD: char = '*';
const ANY: &str = "*";
const SEPARATOR: char = ',';

/// One compiled allow-list token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressRule {
    Any,
    Prefix(String),
    Exact(String),
}

impl AddressRule {
    fn parse(token: &str) -> Self {
        if token == ANY {
            return AddressRule::Any;
        }
        match token.strip_suffix(WILDCARD) {
            Some(prefix) => AddressRule::Prefix(prefix.to_string()),
            None => AddressRule::Exact(token.to_string()),
        }
    }

    fn matches(&self, proposed: &str, substituted: Option<&str>) -> bool {
        let hit = |candidate: &str| match self {
            AddressRule::Any => true,
            AddressRule::Prefix(p) => candidate.starts_with(p.as_str()),
            AddressRule::Exact(e) => candidate == e,
        };
        hit(proposed) || substituted.is_some_and(hit)
    }
}

/// Compiled allow-list. Keeps the raw text for logs and management readout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    raw: String,
    rules: Vec<AddressRule>,
}

impl AllowList {
    pub fn parse(raw: &str) -> Self {
        let rules = raw
            .split(SEPARATOR)
            .filter(|t| !t.is_empty())
            .map(AddressRule::parse)
            .collect();
        Self {
            raw: raw.to_string(),
            rules,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn rules(&self) -> &[AddressRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Decide whether `user` may use `proposed`. First matching token wins.
    pub fn is_allowed(&self, user: &str, proposed: &str) -> bool {
        if proposed.is_empty() || self.rules.is_empty() {
            return false;
        }
        let substituted = substitute_user(user, proposed);
        self.rules
            .iter()
            .any(|r| r.matches(proposed, substituted.as_deref()))
    }
}

/// Convenience for one-shot checks against an uncompiled allow-list.
pub fn is_allowed(user: &str, allow_list: &str, proposed: &str) -> bool {
    if allow_list.is_empty() {
        return false;
    }
    AllowList::parse(allow_list).is_allowed(user, proposed)
}

/// Replace the first occurrence of `user` in `proposed` with the placeholder.
/// `None` when the user name is empty or does not occur.
pub fn substitute_user(user: &str, proposed: &str) -> Option<String> {
    if user.is_empty() || !proposed.contains(user) {
        return None;
    }
    Some(proposed.replacen(user, USER_PLACEHOLDER, 1))
}
