use std::collections::{BTreeSet, HashMap, HashSet};

use crate::domain::{Username, social::FollowEdge};

pub const MAX_DEPTH: u8 = 3;
pub const DEFAULT_MAX_FRONTIER: usize = 1000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    pub username: Username,
    pub depth: u8,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SocialDistance {
    /// Ordered by depth, then username.
    pub connections: Vec<Connection>,
    /// Players on the discovery path of a connection who did not rate the game themselves.
    pub intermediaries: Vec<Username>,
    pub edges: Vec<FollowEdge>,
    pub truncated: bool,
}

struct Discovery {
    depth: u8,
    parent: Option<Username>,
}

/// Level-synchronous breadth-first walk over FOLLOWS edges.
///
/// The caller drives the walk: while [`pending_frontier`](Self::pending_frontier) yields
/// players, fetch their outgoing edges and hand them to [`expand`](Self::expand). A player
/// is tagged with the level at which it is first discovered, which is its minimum hop
/// count from the origin. The origin is discovered at level 0 and so never reappears.
pub struct SocialDistanceTraversal {
    origin: Username,
    max_depth: u8,
    max_frontier: usize,
    depth: u8,
    frontier: Vec<Username>,
    discovered: HashMap<Username, Discovery>,
    truncated: bool,
}

impl SocialDistanceTraversal {
    pub fn new(origin: Username, max_depth: u8, max_frontier: usize) -> Self {
        let mut discovered = HashMap::new();
        discovered.insert(
            origin.clone(),
            Discovery {
                depth: 0,
                parent: None,
            },
        );
        Self {
            frontier: vec![origin.clone()],
            origin,
            max_depth,
            max_frontier: max_frontier.max(1),
            depth: 0,
            discovered,
            truncated: false,
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn pending_frontier(&self) -> Option<&[Username]> {
        if self.depth >= self.max_depth || self.frontier.is_empty() {
            None
        } else {
            Some(&self.frontier)
        }
    }

    /// Consumes the outgoing edges of the current frontier and advances one level.
    /// Edges that do not start in the frontier are ignored.
    pub fn expand(&mut self, edges: impl IntoIterator<Item = FollowEdge>) {
        let frontier: HashSet<Username> = std::mem::take(&mut self.frontier).into_iter().collect();
        let next_depth = self.depth + 1;

        let mut edges: Vec<FollowEdge> = edges
            .into_iter()
            .filter(|edge| frontier.contains(&edge.from))
            .collect();
        // Sorted so the parent recorded for a player is the smallest username that reached it.
        edges.sort();

        let mut next = BTreeSet::new();
        for edge in edges {
            if self.discovered.contains_key(&edge.to) {
                continue;
            }
            self.discovered.insert(
                edge.to.clone(),
                Discovery {
                    depth: next_depth,
                    parent: Some(edge.from),
                },
            );
            next.insert(edge.to);
        }

        let mut next: Vec<Username> = next.into_iter().collect();
        if next_depth < self.max_depth && next.len() > self.max_frontier {
            log::debug!(
                "Social distance frontier for {} at depth {} truncated from {} to {}",
                self.origin,
                next_depth,
                next.len(),
                self.max_frontier
            );
            next.truncate(self.max_frontier);
            self.truncated = true;
        }
        self.frontier = next;
        self.depth = next_depth;
    }

    /// Every player discovered so far, excluding the origin.
    pub fn discovered_players(&self) -> Vec<Username> {
        let mut players: Vec<Username> = self
            .discovered
            .keys()
            .filter(|username| **username != self.origin)
            .cloned()
            .collect();
        players.sort();
        players
    }

    /// Keeps the discovered players that satisfy `is_rater` and resolves the path
    /// nodes linking each of them back to the origin.
    pub fn finish(self, raters: &HashSet<Username>) -> TraversalOutcome {
        let mut connections: Vec<Connection> = self
            .discovered
            .iter()
            .filter(|(username, discovery)| discovery.depth > 0 && raters.contains(*username))
            .map(|(username, discovery)| Connection {
                username: username.clone(),
                depth: discovery.depth,
            })
            .collect();
        connections.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.username.cmp(&b.username)));

        let connected: HashSet<&Username> = connections.iter().map(|c| &c.username).collect();
        let mut intermediaries = BTreeSet::new();
        for connection in &connections {
            let mut current = self
                .discovered
                .get(&connection.username)
                .and_then(|d| d.parent.as_ref());
            while let Some(player) = current {
                if *player == self.origin {
                    break;
                }
                if !connected.contains(player) {
                    intermediaries.insert(player.clone());
                }
                current = self.discovered.get(player).and_then(|d| d.parent.as_ref());
            }
        }

        TraversalOutcome {
            origin: self.origin,
            connections,
            intermediaries: intermediaries.into_iter().collect(),
            truncated: self.truncated,
        }
    }
}

pub struct TraversalOutcome {
    pub origin: Username,
    pub connections: Vec<Connection>,
    pub intermediaries: Vec<Username>,
    pub truncated: bool,
}

impl TraversalOutcome {
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// The origin, every connection and every intermediary.
    pub fn members(&self) -> Vec<Username> {
        let mut members = vec![self.origin.clone()];
        members.extend(self.connections.iter().map(|c| c.username.clone()));
        members.extend(self.intermediaries.iter().cloned());
        members
    }

    /// Attaches the FOLLOWS edges whose endpoints are both members.
    pub fn with_edges(self, edges: impl IntoIterator<Item = FollowEdge>) -> SocialDistance {
        if self.connections.is_empty() {
            return SocialDistance {
                truncated: self.truncated,
                ..Default::default()
            };
        }
        let members: HashSet<Username> = self.members().into_iter().collect();
        let edges: BTreeSet<FollowEdge> = edges
            .into_iter()
            .filter(|edge| {
                edge.from != edge.to && members.contains(&edge.from) && members.contains(&edge.to)
            })
            .collect();
        SocialDistance {
            connections: self.connections,
            intermediaries: self.intermediaries,
            edges: edges.into_iter().collect(),
            truncated: self.truncated,
        }
    }
}
