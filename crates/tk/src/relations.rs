//! Relationship queries over a loaded set of tickets.
//!
//! Everything here is pure: the caller loads tickets through the store and
//! decides what to do with the answers. A reference to an ID with no record
//! is dangling. Dangling deps count as unresolved blockers.

use crate::domain::{Ticket, TicketStatus};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Tickets other than `id` that list `id` in their deps.
pub fn dependants<'a>(tickets: &'a [Ticket], id: &str) -> Vec<&'a Ticket> {
    tickets
        .iter()
        .filter(|t| t.id != id && t.deps.iter().any(|dep| dep == id))
        .collect()
}

/// Tickets whose parent is `id`.
pub fn children<'a>(tickets: &'a [Ticket], id: &str) -> Vec<&'a Ticket> {
    tickets
        .iter()
        .filter(|t| t.parent.as_deref() == Some(id))
        .collect()
}

fn is_active(ticket: &Ticket) -> bool {
    matches!(
        ticket.status,
        TicketStatus::Open | TicketStatus::InProgress
    )
}

fn status_map(tickets: &[Ticket]) -> HashMap<&str, TicketStatus> {
    tickets.iter().map(|t| (t.id.as_str(), t.status)).collect()
}

fn by_priority_then_id(a: &Ticket, b: &Ticket) -> std::cmp::Ordering {
    a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id))
}

/// Deps of `ticket` that are not closed, in dep order.
fn unresolved<'a>(ticket: &'a Ticket, statuses: &HashMap<&str, TicketStatus>) -> Vec<&'a str> {
    ticket
        .deps
        .iter()
        .map(String::as_str)
        .filter(|dep| statuses.get(dep) != Some(&TicketStatus::Closed))
        .collect()
}

/// Open or in-progress tickets whose deps are all closed, sorted by
/// priority and then ID.
pub fn ready(tickets: &[Ticket]) -> Vec<&Ticket> {
    let statuses = status_map(tickets);
    let mut ready: Vec<&Ticket> = tickets
        .iter()
        .filter(|t| is_active(t) && unresolved(t, &statuses).is_empty())
        .collect();
    ready.sort_by(|a, b| by_priority_then_id(a, b));
    ready
}

/// Open or in-progress tickets with at least one unclosed dep, paired
/// with those deps. Sorted by priority and then ID.
pub fn blocked(tickets: &[Ticket]) -> Vec<(&Ticket, Vec<&str>)> {
    let statuses = status_map(tickets);
    let mut blocked: Vec<(&Ticket, Vec<&str>)> = tickets
        .iter()
        .filter(|t| is_active(t))
        .map(|t| (t, unresolved(t, &statuses)))
        .filter(|(_, blockers)| !blockers.is_empty())
        .collect();
    blocked.sort_by(|(a, _), (b, _)| by_priority_then_id(a, b));
    blocked
}

/// References from one ticket to IDs that have no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingRefs<'a> {
    /// The ticket holding the references.
    pub ticket: &'a Ticket,
    /// Dangling entries of `deps`.
    pub deps: Vec<&'a str>,
    /// Dangling entries of `links`.
    pub links: Vec<&'a str>,
    /// The parent, if it is dangling.
    pub parent: Option<&'a str>,
}

impl DanglingRefs<'_> {
    /// Total number of dangling references.
    #[must_use]
    pub fn count(&self) -> usize {
        self.deps.len() + self.links.len() + usize::from(self.parent.is_some())
    }
}

/// Every ticket holding at least one dangling reference, in input order.
pub fn dangling_refs(tickets: &[Ticket]) -> Vec<DanglingRefs<'_>> {
    let known: HashSet<&str> = tickets.iter().map(|t| t.id.as_str()).collect();
    let missing = |id: &&str| !known.contains(id);

    tickets
        .iter()
        .map(|ticket| DanglingRefs {
            ticket,
            deps: ticket.deps.iter().map(String::as_str).filter(missing).collect(),
            links: ticket.links.iter().map(String::as_str).filter(missing).collect(),
            parent: ticket.parent.as_deref().filter(missing),
        })
        .filter(|refs| refs.count() > 0)
        .collect()
}

/// `list` without any entry in `remove`.
pub fn without<S: AsRef<str>>(list: &[String], remove: &[S]) -> Vec<String> {
    list.iter()
        .filter(|item| !remove.iter().any(|r| r.as_ref() == item.as_str()))
        .cloned()
        .collect()
}

/// Why a closed ticket cannot be cleaned up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanBlocker {
    /// Another ticket depends on it, whatever that ticket's status.
    Dependants,
    /// A child ticket is not closed yet.
    OpenChildren,
    /// It still has links.
    Links,
}

impl fmt::Display for CleanBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dependants => "has dependants",
            Self::OpenChildren => "has non-closed children",
            Self::Links => "has links",
        })
    }
}

/// Every closed ticket, paired with the first reason it must be kept.
/// `None` means the ticket can be deleted.
pub fn clean_candidates(tickets: &[Ticket]) -> Vec<(&Ticket, Option<CleanBlocker>)> {
    tickets
        .iter()
        .filter(|t| t.is_closed())
        .map(|ticket| {
            let blocker = if !dependants(tickets, &ticket.id).is_empty() {
                Some(CleanBlocker::Dependants)
            } else if children(tickets, &ticket.id)
                .iter()
                .any(|child| !child.is_closed())
            {
                Some(CleanBlocker::OpenChildren)
            } else if !ticket.links.is_empty() {
                Some(CleanBlocker::Links)
            } else {
                None
            };
            (ticket, blocker)
        })
        .collect()
}
