//! Exact and wildcard domain membership.

use std::collections::HashSet;

/// A set of domains with exact and wildcard entries.
///
/// Exact entries match one name. Wildcard entries store a parent suffix
/// and match any name with at least one label to the left of it. With
/// `include_subdomains`, exact entries additionally match as suffixes,
/// which is how the `block_subdomains` policy is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainSet {
    exact: HashSet<String>,
    wildcards: HashSet<String>,
}

impl DomainSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exact domain. Empty inputs are ignored.
    pub fn add_exact(&mut self, domain: &str) {
        let normalized = normalize(domain);
        if !normalized.is_empty() {
            self.exact.insert(normalized);
        }
    }

    /// Add a wildcard parent suffix. A leading `*.` is stripped, so both
    /// `*.ads.example.com` and `ads.example.com` store the same suffix.
    pub fn add_wildcard(&mut self, domain: &str) {
        let suffix = domain.trim().strip_prefix("*.").unwrap_or(domain);
        let normalized = normalize(suffix);
        if !normalized.is_empty() {
            self.wildcards.insert(normalized);
        }
    }

    /// Union `other` into this set.
    pub fn merge(&mut self, other: DomainSet) {
        self.exact.extend(other.exact);
        self.wildcards.extend(other.wildcards);
    }

    /// Whether `name` is in the set.
    ///
    /// Checks the exact set, then each proper parent suffix against the
    /// wildcard set, then (when `include_subdomains` is on) each proper
    /// parent suffix against the exact set.
    pub fn matches(&self, name: &str, include_subdomains: bool) -> bool {
        let normalized = normalize(name);
        if normalized.is_empty() {
            return false;
        }

        if self.exact.contains(&normalized) {
            return true;
        }

        let labels: Vec<&str> = normalized.split('.').collect();
        for i in 1..labels.len() {
            let suffix = labels[i..].join(".");
            if self.wildcards.contains(&suffix) {
                return true;
            }
        }

        if !include_subdomains {
            return false;
        }

        for i in 1..labels.len() {
            let suffix = labels[i..].join(".");
            if self.exact.contains(&suffix) {
                return true;
            }
        }

        false
    }

    /// Number of entries across both sets.
    pub fn len(&self) -> usize {
        self.exact.len() + self.wildcards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.wildcards.is_empty()
    }
}

/// Trim, lowercase, and strip one trailing dot.
pub(crate) fn normalize(name: &str) -> String {
    name.trim().trim_end_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        let mut set = DomainSet::new();
        set.add_exact("blocked.example.com");

        assert!(set.matches("blocked.example.com", false));
        assert!(set.matches("BLOCKED.example.COM", false));
        assert!(set.matches("blocked.example.com.", false));
        assert!(!set.matches("other.example.com", false));
    }

    #[test]
    fn exact_does_not_match_subdomains_by_default() {
        let mut set = DomainSet::new();
        set.add_exact("example.com");

        assert!(!set.matches("sub.example.com", false));
        assert!(set.matches("sub.example.com", true));
        // Suffix matching never fires on the lookalike TLD case
        assert!(!set.matches("example.com.evil.net", true));
    }

    #[test]
    fn wildcard_matches_subdomains_only() {
        let mut set = DomainSet::new();
        set.add_wildcard("ads.example.com");

        assert!(set.matches("banner.ads.example.com", false));
        assert!(set.matches("a.b.ads.example.com", false));
        assert!(!set.matches("ads.example.com", false));
    }

    #[test]
    fn wildcard_prefix_is_stripped_on_insert() {
        let mut set = DomainSet::new();
        set.add_wildcard("*.tracker.example.net");

        assert!(set.matches("cdn.tracker.example.net", false));
        assert!(!set.matches("tracker.example.net", false));
    }

    #[test]
    fn empty_inputs() {
        let mut set = DomainSet::new();
        set.add_exact("");
        set.add_exact("   ");
        set.add_wildcard(".");
        assert!(set.is_empty());
        assert!(!set.matches("", false));
        assert!(!set.matches("  ", true));
    }

    #[test]
    fn merge_unions_both_sets() {
        let mut a = DomainSet::new();
        a.add_exact("one.example.com");

        let mut b = DomainSet::new();
        b.add_exact("two.example.com");
        b.add_wildcard("ads.example.com");

        a.merge(b);
        assert_eq!(a.len(), 3);
        assert!(a.matches("one.example.com", false));
        assert!(a.matches("two.example.com", false));
        assert!(a.matches("x.ads.example.com", false));
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize("  Blocked.Example.COM.  ");
        let twice = normalize(&once);
        assert_eq!(once, "blocked.example.com");
        assert_eq!(once, twice);
    }
}
