//! Best-effort process identity for local endpoints.
//!
//! A node's trace names the owning process of every connection, but the same
//! (address, port) can show up under several processes: forked workers,
//! sockets handed over between processes, short-lived clients reusing a
//! port. Each endpoint is attributed to the identity observed most often.
//! Ties go to the identity seen first, so the result is deterministic.
//!
//! This is a vote, not ground truth: a short-lived process that happens to
//! appear in more rows wins over a long-lived one.

use std::collections::HashMap;

use fleetmap_types::{ConnectionRecord, Endpoint};

/// One candidate identity for an endpoint and how often it was seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub identity: String,
    pub pid: u32,
    pub count: u32,
}

/// The winning owner of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub identity: String,
    pub pid: u32,
}

/// Accumulates votes for one node.
#[derive(Debug)]
pub struct IdentityResolver {
    node: String,
    /// Candidates per endpoint, in first-seen order.
    votes: HashMap<Endpoint, Vec<Candidate>>,
    /// Endpoints in first-seen order.
    order: Vec<Endpoint>,
}

impl IdentityResolver {
    pub fn new(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            votes: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Count one observation of the record's process on its local endpoint.
    pub fn observe(&mut self, record: &ConnectionRecord) {
        let identity = record.identity(&self.node);
        if !self.votes.contains_key(&record.local) {
            self.order.push(record.local.clone());
        }
        let candidates = self.votes.entry(record.local.clone()).or_default();

        match candidates.iter_mut().find(|c| c.identity == identity) {
            Some(c) => c.count += 1,
            None => candidates.push(Candidate {
                identity,
                pid: record.pid,
                count: 1,
            }),
        }
    }

    /// Candidates seen for an endpoint, in first-seen order.
    pub fn candidates(&self, endpoint: &Endpoint) -> &[Candidate] {
        self.votes.get(endpoint).map_or(&[], Vec::as_slice)
    }

    /// Pick the winner for every endpoint.
    pub fn resolve(self) -> Identities {
        let mut identities = Identities::default();
        for endpoint in self.order {
            let Some(candidates) = self.votes.get(&endpoint) else {
                continue;
            };
            // Strictly greater, so the earliest candidate keeps a tie.
            let mut best: Option<&Candidate> = None;
            for c in candidates {
                if best.map_or(true, |b| c.count > b.count) {
                    best = Some(c);
                }
            }
            if let Some(best) = best {
                identities.insert(
                    endpoint,
                    Owner {
                        identity: best.identity.clone(),
                        pid: best.pid,
                    },
                );
            }
        }
        identities
    }
}

/// Resolve every local endpoint of one node's records.
pub fn resolve_identities(node: &str, records: &[ConnectionRecord]) -> Identities {
    let mut resolver = IdentityResolver::new(node);
    for record in records {
        resolver.observe(record);
    }
    resolver.resolve()
}

/// Endpoint → owner for one node, iterable in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Identities {
    entries: Vec<(Endpoint, Owner)>,
    index: HashMap<Endpoint, usize>,
}

impl Identities {
    fn insert(&mut self, endpoint: Endpoint, owner: Owner) {
        self.index.insert(endpoint.clone(), self.entries.len());
        self.entries.push((endpoint, owner));
    }

    pub fn get(&self, endpoint: &Endpoint) -> Option<&Owner> {
        self.index.get(endpoint).map(|&i| &self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Endpoint, &Owner)> {
        self.entries.iter().map(|(e, o)| (e, o))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(addr: &str, port: u16, comm: &str, pid: u32) -> ConnectionRecord {
        ConnectionRecord::builder()
            .local(Endpoint::new(addr, port))
            .process(comm, pid)
            .build()
    }

    #[test]
    fn test_most_frequent_wins() {
        let records = vec![
            record("10.0.0.1", 80, "sniff", 9),
            record("10.0.0.1", 80, "nginx", 1),
            record("10.0.0.1", 80, "nginx", 1),
        ];
        let ids = resolve_identities("web", &records);
        let owner = ids.get(&Endpoint::new("10.0.0.1", 80)).unwrap();
        assert_eq!(owner.identity, "nginx (1, web)");
        assert_eq!(owner.pid, 1);
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let records = vec![
            record("10.0.0.1", 80, "b", 2),
            record("10.0.0.1", 80, "a", 1),
            record("10.0.0.1", 80, "a", 1),
            record("10.0.0.1", 80, "b", 2),
        ];
        for _ in 0..10 {
            let ids = resolve_identities("n", &records);
            assert_eq!(ids.get(&Endpoint::new("10.0.0.1", 80)).unwrap().identity, "b (2, n)");
        }
    }

    #[test]
    fn test_winner_count_dominates_every_candidate() {
        let records = vec![
            record("h", 1, "x", 1),
            record("h", 1, "y", 2),
            record("h", 1, "y", 2),
            record("h", 1, "z", 3),
            record("h", 1, "z", 3),
            record("h", 1, "z", 3),
            record("h", 1, "y", 2),
        ];
        let mut resolver = IdentityResolver::new("n");
        for r in &records {
            resolver.observe(r);
        }
        let endpoint = Endpoint::new("h", 1);
        let candidates = resolver.candidates(&endpoint).to_vec();
        assert_eq!(candidates.len(), 3);

        let winner = resolver.resolve().get(&endpoint).unwrap().identity.clone();
        let winner_count = candidates
            .iter()
            .find(|c| c.identity == winner)
            .unwrap()
            .count;
        assert!(candidates.iter().all(|c| winner_count >= c.count));
        // y and z both have 3; y was seen first.
        assert_eq!(winner, "y (2, n)");
    }

    #[test]
    fn test_same_pid_different_port_are_separate_endpoints() {
        let records = vec![record("10.0.0.1", 80, "svc", 1), record("10.0.0.1", 81, "svc", 1)];
        let ids = resolve_identities("n", &records);
        assert_eq!(ids.len(), 2);
        let order: Vec<u16> = ids.iter().map(|(e, _)| e.port).collect();
        assert_eq!(order, vec![80, 81]);
    }

    #[test]
    fn test_remote_endpoints_do_not_vote() {
        let r = ConnectionRecord::builder()
            .local(Endpoint::new("10.0.0.1", 80))
            .remote(Endpoint::new("10.0.0.2", 9000))
            .process("svc", 1)
            .build();
        let ids = resolve_identities("n", &[r]);
        assert!(ids.get(&Endpoint::new("10.0.0.2", 9000)).is_none());
    }

    #[test]
    fn test_no_records() {
        assert!(resolve_identities("n", &[]).is_empty());
    }
}
