//! How the core repository obtains its new branch.

use std::fmt;

/// Probed state of the new branch in the core checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbeFacts {
    /// A local branch with the new name exists.
    pub has_local_branch: bool,
    /// The remote already has the new branch.
    pub has_remote_branch: bool,
    /// The new branch is checked out.
    pub on_new_branch: bool,
    /// The local branch tracks `origin/<new branch>`.
    pub local_tracks_remote: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchDecision {
    /// Check out the branch someone already pushed.
    UseExistingRemote,
    /// Already on the tracking branch; just pull.
    ContinueLocalTrackingRemote,
    /// Switch to the existing tracking branch, then pull.
    SwitchToLocalTrackingRemote,
    /// Create the branch from the base reference.
    CreateFromBase,
    /// A local branch exists without a matching upstream; use it as is.
    NoActionNeeded,
}

impl fmt::Display for BranchDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BranchDecision::UseExistingRemote => "use existing remote branch",
            BranchDecision::ContinueLocalTrackingRemote => "continue on local tracking branch",
            BranchDecision::SwitchToLocalTrackingRemote => "switch to local tracking branch",
            BranchDecision::CreateFromBase => "create from base",
            BranchDecision::NoActionNeeded => "no action needed",
        };
        f.write_str(s)
    }
}

/// Pick exactly one action. Earlier rules win: an existing remote branch
/// beats creating a duplicate, continuing in place beats switching, and
/// creating from base is the fallback.
pub fn decide(facts: ProbeFacts) -> BranchDecision {
    let ProbeFacts {
        has_local_branch,
        has_remote_branch,
        on_new_branch,
        local_tracks_remote,
    } = facts;

    if has_remote_branch && !has_local_branch {
        BranchDecision::UseExistingRemote
    } else if on_new_branch && local_tracks_remote {
        BranchDecision::ContinueLocalTrackingRemote
    } else if has_local_branch && local_tracks_remote {
        BranchDecision::SwitchToLocalTrackingRemote
    } else if !has_local_branch {
        BranchDecision::CreateFromBase
    } else {
        BranchDecision::NoActionNeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BranchDecision::*;

    fn facts(local: bool, remote: bool, on_new: bool, tracks: bool) -> ProbeFacts {
        ProbeFacts {
            has_local_branch: local,
            has_remote_branch: remote,
            on_new_branch: on_new,
            local_tracks_remote: tracks,
        }
    }

    #[test]
    fn decision_table() {
        // Reachable states only: being on or tracking the branch needs a
        // local branch, and tracking it needs the remote branch.
        let cases = [
            (facts(false, false, false, false), CreateFromBase),
            (facts(false, true, false, false), UseExistingRemote),
            (facts(true, false, false, false), NoActionNeeded),
            (facts(true, false, true, false), NoActionNeeded),
            (facts(true, true, false, false), NoActionNeeded),
            (facts(true, true, true, false), NoActionNeeded),
            (facts(true, true, false, true), SwitchToLocalTrackingRemote),
            (facts(true, true, true, true), ContinueLocalTrackingRemote),
        ];

        for (input, expected) in cases {
            assert_eq!(decide(input), expected, "{input:?}");
        }
    }

    #[test]
    fn remote_branch_wins_over_creating_a_duplicate() {
        assert_eq!(decide(facts(false, true, false, false)), UseExistingRemote);
        assert_ne!(decide(facts(false, true, false, false)), CreateFromBase);
    }

    #[test]
    fn continuing_in_place_wins_over_switching() {
        assert_eq!(decide(facts(true, true, true, true)), ContinueLocalTrackingRemote);
    }

    #[test]
    fn every_raw_combination_yields_one_decision() {
        for bits in 0u8..16 {
            let input = facts(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0);
            let decision = decide(input);
            if !input.has_local_branch && !input.has_remote_branch && !input.local_tracks_remote {
                assert_eq!(decision, CreateFromBase, "{input:?}");
            }
        }
    }
}
