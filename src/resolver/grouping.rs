//! Host grouping.
//!
//! Collapses a flat announcement list into one [`HostCandidate`] per
//! distinct host. Pure, no I/O.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;

use super::{Announcement, Endpoint};

// ============================================================================
// HostCandidate
// ============================================================================

/// Every port one host announced, plus its verified control port once known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCandidate {
    host: String,
    ports: Vec<u16>,
    verified_port: Option<u16>,
}

impl HostCandidate {
    /// Creates a candidate with no ports.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ports: Vec::new(),
            verified_port: None,
        }
    }

    /// Returns the host.
    #[inline]
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the announced ports in encounter order, without duplicates.
    #[inline]
    #[must_use]
    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    /// Returns the verified control port, if any.
    #[inline]
    #[must_use]
    pub const fn verified_port(&self) -> Option<u16> {
        self.verified_port
    }

    /// Records an announced port. Repeats are ignored.
    pub fn push_port(&mut self, port: u16) {
        if !self.ports.contains(&port) {
            self.ports.push(port);
        }
    }

    /// Marks `port` as the control port.
    ///
    /// Returns `false`, leaving the candidate unchanged, if a port was
    /// already verified or `port` was never announced.
    #[must_use]
    pub fn mark_verified(&mut self, port: u16) -> bool {
        if self.verified_port.is_some() || !self.ports.contains(&port) {
            return false;
        }
        self.verified_port = Some(port);
        true
    }

    /// Returns the candidate endpoints in probe order.
    pub fn endpoints(&self) -> impl Iterator<Item = Endpoint> + '_ {
        self.ports
            .iter()
            .map(|&port| Endpoint::new(self.host.clone(), port))
    }
}

// ============================================================================
// Grouping
// ============================================================================

/// Groups announcements by host.
///
/// Candidates come out in the order their host first appears; each
/// candidate's ports keep their encounter order.
#[must_use]
pub fn group_by_host(announcements: &[Announcement]) -> Vec<HostCandidate> {
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut candidates: Vec<HostCandidate> = Vec::new();

    for announcement in announcements {
        let slot = *index.entry(announcement.host.as_str()).or_insert_with(|| {
            candidates.push(HostCandidate::new(announcement.host.clone()));
            candidates.len() - 1
        });
        candidates[slot].push_port(announcement.port);
    }

    candidates
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rustc_hash::FxHashSet;

    fn announce(pairs: &[(&str, u16)]) -> Vec<Announcement> {
        pairs
            .iter()
            .map(|&(host, port)| Announcement::new(host, port))
            .collect()
    }

    #[test]
    fn test_groups_ports_per_host() {
        let candidates = group_by_host(&announce(&[
            ("10.0.0.1", 9944),
            ("10.0.0.2", 30333),
            ("10.0.0.1", 4000),
        ]));

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].host(), "10.0.0.1");
        assert_eq!(candidates[0].ports(), &[9944, 4000]);
        assert_eq!(candidates[1].host(), "10.0.0.2");
        assert_eq!(candidates[1].ports(), &[30333]);
    }

    #[test]
    fn test_duplicate_announcements_collapse() {
        let candidates = group_by_host(&announce(&[("h", 1), ("h", 1), ("h", 2)]));
        assert_eq!(candidates[0].ports(), &[1, 2]);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_host(&[]).is_empty());
    }

    #[test]
    fn test_mark_verified_once() {
        let mut candidate = HostCandidate::new("h");
        candidate.push_port(1);
        candidate.push_port(2);

        assert!(!candidate.mark_verified(3));
        assert!(candidate.mark_verified(1));
        assert!(!candidate.mark_verified(2));
        assert_eq!(candidate.verified_port(), Some(1));
    }

    #[test]
    fn test_endpoints_follow_port_order() {
        let candidates = group_by_host(&announce(&[("h", 3), ("h", 1)]));
        let urls: Vec<String> = candidates[0].endpoints().map(|e| e.ws_url()).collect();
        assert_eq!(urls, ["ws://h:3", "ws://h:1"]);
    }

    proptest! {
        #[test]
        fn prop_grouping_preserves_every_pair(
            pairs in proptest::collection::vec(("[a-d]", 1u16..6), 0..40)
        ) {
            let announcements: Vec<Announcement> = pairs
                .iter()
                .map(|(host, port)| Announcement::new(host.clone(), *port))
                .collect();
            let candidates = group_by_host(&announcements);

            let hosts: FxHashSet<&str> = candidates.iter().map(HostCandidate::host).collect();
            prop_assert_eq!(hosts.len(), candidates.len());

            for (host, port) in &pairs {
                let candidate = candidates.iter().find(|c| c.host() == host);
                prop_assert!(candidate.is_some_and(|c| c.ports().contains(port)));
            }

            let total: usize = candidates.iter().map(|c| c.ports().len()).sum();
            let distinct: FxHashSet<(&String, &u16)> = pairs.iter().map(|(h, p)| (h, p)).collect();
            prop_assert_eq!(total, distinct.len());
        }
    }
}
