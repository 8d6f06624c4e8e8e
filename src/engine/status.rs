//! Status vocabulary shared by nodes and layers.
use std::fmt;

/// Discrete status of a node or layer, derived from the filesystem on demand.
///
/// # Examples
///
/// ```
/// use dotlayers::engine::status::Status;
///
/// assert_eq!(Status::Symlinked.symbol(), 'S');
/// assert!(Status::Identical.is_claim());
/// assert!(!Status::Owned.is_claim());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Target is absent.
    Missing,
    /// Target is claimed by a sibling in another layer.
    Owned,
    /// Target is a symlink pointing at this node's source.
    Symlinked,
    /// Target is a regular file with the same content as the source.
    Identical,
    /// Target exists, differs, and no sibling claims it.
    Conflicted,
}

impl Status {
    /// One-character marker used in the status report.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Missing => 'N',
            Self::Owned => 'O',
            Self::Symlinked => 'S',
            Self::Identical => 'C',
            Self::Conflicted => '!',
        }
    }

    /// `true` for the two statuses that claim the target.
    #[must_use]
    pub const fn is_claim(self) -> bool {
        matches!(self, Self::Symlinked | Self::Identical)
    }

    /// `true` for the statuses `merge`/`unmerge` accept.
    #[must_use]
    pub const fn is_mergeable(self) -> bool {
        matches!(self, Self::Symlinked | Self::Identical | Self::Missing)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Missing => "missing",
            Self::Owned => "owned",
            Self::Symlinked => "symlinked",
            Self::Identical => "identical",
            Self::Conflicted => "conflicted",
        };
        f.write_str(name)
    }
}

/// Mutating operations guarded by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Link the target to the source.
    Merge,
    /// Remove the target.
    Unmerge,
    /// Replace a conflicting target with the layer's copy.
    ForceOut,
    /// Adopt a conflicting target into the layer.
    ForceIn,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Merge => "merge",
            Self::Unmerge => "unmerge",
            Self::ForceOut => "force-out",
            Self::ForceIn => "force-in",
        };
        f.write_str(name)
    }
}

/// Outcome of a mutating operation.
///
/// # Examples
///
/// ```
/// use dotlayers::engine::status::Change;
///
/// assert_ne!(Change::Applied, Change::AlreadyCorrect);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// The filesystem was changed.
    Applied,
    /// Already in the requested state; nothing was touched.
    AlreadyCorrect,
    /// The user declined the confirmation; nothing was touched.
    Declined,
}
