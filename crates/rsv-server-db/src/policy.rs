// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-record access policies consulted by the table gateways.

use std::fmt;

/// Operation a policy is asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
	Read,
	Write,
	Delete,
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Action::Read => f.write_str("read"),
			Action::Write => f.write_str("write"),
			Action::Delete => f.write_str("delete"),
		}
	}
}

/// Decides whether an action on a given record is allowed.
///
/// Rows failing [`Action::Read`] are dropped from query results; a rejected
/// write or delete fails with `DbError::Permission`.
pub trait AccessPolicy<R>: Send + Sync {
	fn is_allowed(&self, action: Action, record: &R) -> bool;
}

/// Permits everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl<R> AccessPolicy<R> for AllowAll {
	fn is_allowed(&self, _action: Action, _record: &R) -> bool {
		true
	}
}

/// Adapts a closure into a policy.
pub struct PolicyFn<F>(pub F);

impl<R, F> AccessPolicy<R> for PolicyFn<F>
where
	F: Fn(Action, &R) -> bool + Send + Sync,
{
	fn is_allowed(&self, action: Action, record: &R) -> bool {
		(self.0)(action, record)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn allow_all_allows_every_action() {
		for action in [Action::Read, Action::Write, Action::Delete] {
			assert!(AccessPolicy::<u8>::is_allowed(&AllowAll, action, &0));
		}
	}

	#[test]
	fn policy_fn_delegates_to_closure() {
		let read_only = PolicyFn(|action: Action, _: &u8| action == Action::Read);
		assert!(read_only.is_allowed(Action::Read, &1));
		assert!(!read_only.is_allowed(Action::Write, &1));
		assert!(!read_only.is_allowed(Action::Delete, &1));
	}
}
