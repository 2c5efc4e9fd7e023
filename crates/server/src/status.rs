use std::fmt;

use parking_lot::Mutex;
use tracing::{Span, debug, error};

use crate::{ErrorCode, Result, ServerError};

/// Lifecycle phase of a language server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerStatus {
	/// No `initialize` request seen yet.
	#[default]
	Created,
	/// `initialize` is being handled.
	Initializing,
	/// `initialized` was received; normal traffic is allowed.
	Initialized,
	/// `shutdown` was received.
	Shutdown,
}

impl fmt::Display for ServerStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Created => "created",
			Self::Initializing => "initializing",
			Self::Initialized => "initialized",
			Self::Shutdown => "shutdown",
		})
	}
}

/// Tracks the [`ServerStatus`] and rejects out-of-order transitions.
pub struct StatusGuard {
	status: Mutex<ServerStatus>,
	span: Span,
}

impl fmt::Debug for StatusGuard {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StatusGuard").field("status", &*self.status.lock()).finish()
	}
}

impl Default for StatusGuard {
	fn default() -> Self {
		Self::new(Span::none())
	}
}

impl StatusGuard {
	/// Creates a guard in [`ServerStatus::Created`].
	pub fn new(span: Span) -> Self {
		Self {
			status: Mutex::new(ServerStatus::Created),
			span,
		}
	}

	/// Returns the current status.
	pub fn status(&self) -> ServerStatus {
		*self.status.lock()
	}

	/// Moves from `from` to `to`, or fails without changing anything.
	pub fn transition(&self, from: ServerStatus, to: ServerStatus) -> Result<()> {
		let _guard = self.span.enter();
		let mut status = self.status.lock();
		if *status != from {
			error!(
				current = %*status,
				expected = %from,
				target = %to,
				"invalid server status transition"
			);
			return Err(ServerError::new(
				ErrorCode::InvalidRequest,
				format!("cannot move to {to} while {}", *status),
			));
		}
		debug!(from = %from, to = %to, "server status changed");
		*status = to;
		Ok(())
	}

	/// Puts the status back to `to` unconditionally.
	///
	/// Used to undo [`ServerStatus::Initializing`] when `initialize` fails.
	pub fn reset(&self, to: ServerStatus) {
		let _guard = self.span.enter();
		let mut status = self.status.lock();
		debug!(from = %*status, to = %to, "server status reset");
		*status = to;
	}

	/// Fails with [`ErrorCode::ServerNotInitialized`] unless traffic is allowed.
	pub fn ensure_initialized(&self, method: &str) -> Result<()> {
		match self.status() {
			ServerStatus::Initialized => Ok(()),
			status => Err(ServerError::new(
				ErrorCode::ServerNotInitialized,
				format!("{method} received while {status}"),
			)),
		}
	}
}
