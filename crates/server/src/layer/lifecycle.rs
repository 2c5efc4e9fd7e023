use std::sync::Arc;

use async_trait::async_trait;
use lsp_types::{
	DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
	DidSaveTextDocumentParams, InitializeParams, InitializeResult, InitializedParams,
};
use tower_layer::Layer;

use crate::{Result, Server, ServerStatus, StatusGuard};

/// Layer producing [`Lifecycle`]. All servers it wraps share one guard.
#[derive(Debug, Clone)]
pub struct LifecycleLayer {
	guard: Arc<StatusGuard>,
}

impl LifecycleLayer {
	/// Creates a layer driving `guard`.
	pub fn new(guard: StatusGuard) -> Self {
		Self { guard: Arc::new(guard) }
	}

	/// Returns the shared guard.
	pub fn guard(&self) -> &Arc<StatusGuard> {
		&self.guard
	}
}

impl<S> Layer<S> for LifecycleLayer {
	type Service = Lifecycle<S>;

	fn layer(&self, inner: S) -> Self::Service {
		Lifecycle {
			inner,
			guard: self.guard.clone(),
		}
	}
}

/// Enforces request ordering around the server lifecycle.
///
/// `initialize` may arrive once, `initialized` only after it, and document
/// notifications only between `initialized` and `shutdown`. A failed
/// `initialize` returns the guard to [`ServerStatus::Created`] so the client
/// may retry.
#[derive(Debug)]
pub struct Lifecycle<S> {
	inner: S,
	guard: Arc<StatusGuard>,
}

impl<S> Lifecycle<S> {
	/// Returns the current lifecycle status.
	pub fn status(&self) -> ServerStatus {
		self.guard.status()
	}
}

#[async_trait]
impl<S: Server> Server for Lifecycle<S> {
	async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
		self.guard.transition(ServerStatus::Created, ServerStatus::Initializing)?;
		let res = self.inner.initialize(params).await;
		if res.is_err() {
			self.guard.reset(ServerStatus::Created);
		}
		res
	}

	async fn initialized(&self, params: InitializedParams) -> Result<()> {
		self.guard.transition(ServerStatus::Initializing, ServerStatus::Initialized)?;
		self.inner.initialized(params).await
	}

	async fn shutdown(&self) -> Result<()> {
		self.guard.transition(ServerStatus::Initialized, ServerStatus::Shutdown)?;
		self.inner.shutdown().await
	}

	async fn exit(&self) -> Result<()> {
		self.inner.exit().await
	}

	async fn did_open(&self, params: DidOpenTextDocumentParams) -> Result<()> {
		self.guard.ensure_initialized("textDocument/didOpen")?;
		self.inner.did_open(params).await
	}

	async fn did_change(&self, params: DidChangeTextDocumentParams) -> Result<()> {
		self.guard.ensure_initialized("textDocument/didChange")?;
		self.inner.did_change(params).await
	}

	async fn did_close(&self, params: DidCloseTextDocumentParams) -> Result<()> {
		self.guard.ensure_initialized("textDocument/didClose")?;
		self.inner.did_close(params).await
	}

	async fn did_save(&self, params: DidSaveTextDocumentParams) -> Result<()> {
		self.guard.ensure_initialized("textDocument/didSave")?;
		self.inner.did_save(params).await
	}
}
