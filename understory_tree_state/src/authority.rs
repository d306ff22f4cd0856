// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Controlled and uncontrolled state holders.

/// Who owns the authoritative value of a state set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Authority {
    /// The engine owns the value and commits every proposal.
    Internal,
    /// The host owns the value; proposals are reported but not committed.
    /// The host feeds the accepted value back with [`Controlled::sync`].
    External,
}

/// A value together with its [`Authority`], resolved once at construction.
///
/// Controllers always compute the proposed next value and hand it to
/// [`Controlled::propose`], which commits only under [`Authority::Internal`].
#[derive(Clone, Debug)]
pub struct Controlled<S> {
    authority: Authority,
    value: S,
}

impl<S> Controlled<S> {
    /// An engine-owned value with an initial state.
    pub fn internal(initial: S) -> Self {
        Self {
            authority: Authority::Internal,
            value: initial,
        }
    }

    /// A host-owned value.
    pub fn external(value: S) -> Self {
        Self {
            authority: Authority::External,
            value,
        }
    }

    /// Internal when `external` is `None`, otherwise external with that value.
    pub fn resolve(external: Option<S>, initial: impl FnOnce() -> S) -> Self {
        match external {
            Some(value) => Self::external(value),
            None => Self::internal(initial()),
        }
    }

    /// The authority resolved at construction.
    pub fn authority(&self) -> Authority {
        self.authority
    }

    /// The current value.
    pub fn get(&self) -> &S {
        &self.value
    }

    /// Offer a new value; returns `true` if it was committed.
    pub fn propose(&mut self, next: S) -> bool {
        match self.authority {
            Authority::Internal => {
                self.value = next;
                true
            }
            Authority::External => false,
        }
    }

    /// Replace the value regardless of authority.
    ///
    /// Hosts that own the value call this to feed back what they accepted.
    pub fn sync(&mut self, value: S) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_commits_proposals() {
        let mut state = Controlled::internal(1_u32);
        assert!(state.propose(2));
        assert_eq!(*state.get(), 2);
    }

    #[test]
    fn external_only_changes_on_sync() {
        let mut state = Controlled::external(1_u32);
        assert!(!state.propose(2));
        assert_eq!(*state.get(), 1);
        state.sync(5);
        assert_eq!(*state.get(), 5);
        assert_eq!(state.authority(), Authority::External);
    }

    #[test]
    fn resolve_picks_authority_once() {
        let internal = Controlled::resolve(None, || 0_u32);
        assert_eq!(internal.authority(), Authority::Internal);
        let external = Controlled::resolve(Some(3_u32), || 0);
        assert_eq!(external.authority(), Authority::External);
        assert_eq!(*external.get(), 3);
    }
}
