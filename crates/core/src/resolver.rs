//! Role-holder resolution contract.
//!
//! "Who holds role R" is the most fragile invariant of the engine: a stage
//! routed to a role with zero holders strands the document. Rather than
//! silently taking the first row a query returns, holder lookups classify
//! their result and force the caller to pick a policy for the ambiguous
//! case.

/// Outcome of resolving the holder(s) of a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolderResolution<T> {
    /// Exactly one user holds the role.
    One(T),
    /// Nobody holds the role; the transition must abort before mutating.
    NoHolder,
    /// Several users hold the role. Callers decide which one receives the
    /// document; the engine picks the first of the repository's id-ordered
    /// list so routing stays reproducible.
    Ambiguous(Vec<T>),
}

impl<T> HolderResolution<T> {
    /// Classify an already-ordered holder list.
    pub fn classify(mut holders: Vec<T>) -> Self {
        match holders.len() {
            0 => HolderResolution::NoHolder,
            1 => HolderResolution::One(holders.remove(0)),
            _ => HolderResolution::Ambiguous(holders),
        }
    }

    /// The holder the engine routes to: the single holder, or the first of
    /// an ambiguous set. `None` when the role has no holder.
    pub fn into_primary(self) -> Option<T> {
        match self {
            HolderResolution::One(holder) => Some(holder),
            HolderResolution::Ambiguous(mut holders) => {
                if holders.is_empty() {
                    None
                } else {
                    Some(holders.remove(0))
                }
            }
            HolderResolution::NoHolder => None,
        }
    }
}
