use std::sync::Arc;

use async_trait::async_trait;
use lsp_types::{
	DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
	DidSaveTextDocumentParams, InitializeParams, InitializeResult, InitializedParams,
};
use quire_cache::Cache;
use tower_layer::Layer;

use crate::{Result, Server};

/// Layer producing [`Caching`]. All servers it wraps feed the same cache.
#[derive(Debug, Clone)]
pub struct CachingLayer {
	cache: Arc<Cache>,
}

impl CachingLayer {
	/// Creates a layer feeding `cache`.
	pub fn new(cache: Arc<Cache>) -> Self {
		Self { cache }
	}
}

impl<S> Layer<S> for CachingLayer {
	type Service = Caching<S>;

	fn layer(&self, inner: S) -> Self::Service {
		Caching {
			inner,
			cache: self.cache.clone(),
		}
	}
}

/// Keeps a [`Cache`] in sync with the editor.
///
/// Document notifications reach the cache before the inner server, so the
/// inner server always observes the updated buffer. A notification the cache
/// rejects is not forwarded.
#[derive(Debug)]
pub struct Caching<S> {
	inner: S,
	cache: Arc<Cache>,
}

impl<S> Caching<S> {
	/// Returns the shared cache.
	pub fn cache(&self) -> &Arc<Cache> {
		&self.cache
	}
}

#[async_trait]
impl<S: Server> Server for Caching<S> {
	async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
		let mut result = self.inner.initialize(params.clone()).await?;
		self.cache.initialize_from_params(&params)?;
		self.cache.contribute_capabilities(&mut result);
		Ok(result)
	}

	async fn initialized(&self, params: InitializedParams) -> Result<()> {
		self.inner.initialized(params).await
	}

	async fn shutdown(&self) -> Result<()> {
		self.inner.shutdown().await
	}

	async fn exit(&self) -> Result<()> {
		self.inner.exit().await
	}

	async fn did_open(&self, params: DidOpenTextDocumentParams) -> Result<()> {
		self.cache.did_open(&params)?;
		self.inner.did_open(params).await
	}

	async fn did_change(&self, params: DidChangeTextDocumentParams) -> Result<()> {
		self.cache.did_change(&params)?;
		self.inner.did_change(params).await
	}

	async fn did_close(&self, params: DidCloseTextDocumentParams) -> Result<()> {
		self.cache.did_close(&params)?;
		self.inner.did_close(params).await
	}

	async fn did_save(&self, params: DidSaveTextDocumentParams) -> Result<()> {
		self.cache.did_save(&params)?;
		self.inner.did_save(params).await
	}
}
