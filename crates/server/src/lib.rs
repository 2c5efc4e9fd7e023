//! Language server decoration around the [`quire_cache`] document cache.
//!
//! A language server implements [`Server`]. Cross-cutting concerns are added
//! by wrapping it in decorators, each one a [`tower_layer::Layer`]:
//!
//! * [`layer::Logging`]: logs every call and its failures.
//! * [`layer::Lifecycle`]: enforces the `initialize` → `initialized` →
//!   `shutdown` order through a [`StatusGuard`].
//! * [`layer::Caching`]: keeps a shared [`Cache`] in sync with the editor.
//!
//! [`wrap`] composes all three from a [`Context`]. Calls going the other way,
//! from the server to the editor, go through a [`Client`]; [`wrap_client`]
//! adds logging to it. Transport and JSON-RPC framing are left to the
//! embedding application.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

mod client;
pub mod config;
mod context;
pub mod layer;
pub mod logging;
mod status;

use async_trait::async_trait;
pub use client::Client;
pub use config::{Config, ConfigError, LogConfig};
pub use context::Context;
use lsp_types::{
	DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
	DidSaveTextDocumentParams, InitializeParams, InitializeResult, InitializedParams,
};
/// Re-export of the cache this crate decorates servers with.
pub use quire_cache::{self as cache, Cache};
pub use status::{ServerStatus, StatusGuard};

/// A convenient type alias for `Result` with `E` = [`ServerError`].
pub type Result<T, E = ServerError> = std::result::Result<T, E>;

/// JSON-RPC error codes reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCode {
	/// The request is not a valid request object.
	InvalidRequest,
	/// Invalid method parameters.
	InvalidParams,
	/// Internal server error.
	InternalError,
	/// A request arrived before `initialize`.
	ServerNotInitialized,
}

impl ErrorCode {
	/// Returns the numeric JSON-RPC code.
	pub fn code(self) -> i32 {
		match self {
			Self::InvalidRequest => -32600,
			Self::InvalidParams => -32602,
			Self::InternalError => -32603,
			Self::ServerNotInitialized => -32002,
		}
	}
}

/// An error returned to the client for a failed call.
#[derive(Debug, thiserror::Error)]
#[error("{message} (code {})", code.code())]
pub struct ServerError {
	/// Error classification.
	pub code: ErrorCode,
	/// Human-readable description.
	pub message: String,
	/// Underlying cache error, if any.
	#[source]
	pub source: Option<quire_cache::Error>,
}

impl ServerError {
	/// Creates an error without an underlying cause.
	pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
			source: None,
		}
	}
}

impl From<quire_cache::Error> for ServerError {
	fn from(err: quire_cache::Error) -> Self {
		use quire_cache::ErrorKind;

		let code = match err.kind() {
			ErrorKind::InvalidRequest => ErrorCode::InvalidParams,
			ErrorKind::Protocol | ErrorKind::Consistency | ErrorKind::Io => {
				ErrorCode::InternalError
			}
		};
		Self {
			code,
			message: err.to_string(),
			source: Some(err),
		}
	}
}

/// The lifecycle and text synchronization surface of a language server.
///
/// Decorators implement this trait by forwarding to an inner `Server`.
#[async_trait]
pub trait Server: Send + Sync {
	/// Handles the `initialize` request.
	async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult>;

	/// Handles the `initialized` notification.
	async fn initialized(&self, params: InitializedParams) -> Result<()>;

	/// Handles the `shutdown` request.
	async fn shutdown(&self) -> Result<()>;

	/// Handles the `exit` notification.
	async fn exit(&self) -> Result<()>;

	/// Handles `textDocument/didOpen`.
	async fn did_open(&self, params: DidOpenTextDocumentParams) -> Result<()>;

	/// Handles `textDocument/didChange`.
	async fn did_change(&self, params: DidChangeTextDocumentParams) -> Result<()>;

	/// Handles `textDocument/didClose`.
	async fn did_close(&self, params: DidCloseTextDocumentParams) -> Result<()>;

	/// Handles `textDocument/didSave`.
	async fn did_save(&self, params: DidSaveTextDocumentParams) -> Result<()>;
}

/// A server wrapped by [`wrap`], plus the cache it feeds when caching is on.
pub struct Wrapped {
	/// The decorated server.
	pub server: Box<dyn Server>,
	/// The shared cache, `None` when caching is disabled.
	pub cache: Option<std::sync::Arc<Cache>>,
}

impl std::fmt::Debug for Wrapped {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Wrapped").field("cache", &self.cache).finish_non_exhaustive()
	}
}

/// Decorates `inner` with logging, lifecycle checks and, if enabled in the
/// context's configuration, the document cache.
///
/// Calls pass through logging first, then the lifecycle guard, then the
/// cache, and finally reach `inner`.
pub fn wrap<S>(inner: S, ctx: &Context) -> Wrapped
where
	S: Server + 'static,
{
	use tower_layer::{Layer, Stack};

	let logging = layer::LoggingLayer::new(ctx.span_for("server"));
	let lifecycle = layer::LifecycleLayer::new(StatusGuard::new(ctx.span_for("status")));

	if ctx.config().caching {
		let cache = std::sync::Arc::new(
			Cache::new()
				.with_walk_options(ctx.config().walk.clone())
				.with_span(ctx.span_for("cache")),
		);
		let caching = layer::CachingLayer::new(cache.clone());
		let stack = Stack::new(caching, Stack::new(lifecycle, logging));
		Wrapped {
			server: Box::new(stack.layer(inner)),
			cache: Some(cache),
		}
	} else {
		let stack = Stack::new(lifecycle, logging);
		Wrapped {
			server: Box::new(stack.layer(inner)),
			cache: None,
		}
	}
}

/// Decorates a client with call logging under the context's `client` span.
pub fn wrap_client<C: Client>(inner: C, ctx: &Context) -> layer::Logging<C> {
	use tower_layer::Layer;

	layer::LoggingLayer::new(ctx.span_for("client")).layer(inner)
}
