use async_trait::async_trait;
use lsp_types::{
	DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
	DidSaveTextDocumentParams, InitializeParams, InitializeResult, InitializedParams,
	LogMessageParams, PublishDiagnosticsParams, ShowMessageParams,
};
use tower_layer::Layer;
use tracing::{Instrument, Span, debug, error};

use crate::{Client, Result, Server};

/// Layer producing [`Logging`].
#[derive(Debug, Clone)]
pub struct LoggingLayer {
	span: Span,
}

impl LoggingLayer {
	/// Creates a layer recording calls under `span`.
	pub fn new(span: Span) -> Self {
		Self { span }
	}
}

impl<S> Layer<S> for LoggingLayer {
	type Service = Logging<S>;

	fn layer(&self, inner: S) -> Self::Service {
		Logging {
			inner,
			span: self.span.clone(),
		}
	}
}

/// Logs every call at debug level and every failure at error level.
///
/// Wraps either direction: a [`Server`] receiving editor traffic or a
/// [`Client`] sending it.
#[derive(Debug)]
pub struct Logging<S> {
	inner: S,
	span: Span,
}

impl<S> Logging<S> {
	/// Returns the wrapped server or client.
	pub fn inner(&self) -> &S {
		&self.inner
	}
}

fn log_result<T>(method: &'static str, res: Result<T>) -> Result<T> {
	if let Err(err) = &res {
		error!(method, code = err.code.code(), error = %err, "request failed");
	}
	res
}

#[async_trait]
impl<S: Server> Server for Logging<S> {
	async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
		async {
			debug!(method = "initialize", ?params);
			log_result("initialize", self.inner.initialize(params).await)
		}
		.instrument(self.span.clone())
		.await
	}

	async fn initialized(&self, params: InitializedParams) -> Result<()> {
		async {
			debug!(method = "initialized");
			log_result("initialized", self.inner.initialized(params).await)
		}
		.instrument(self.span.clone())
		.await
	}

	async fn shutdown(&self) -> Result<()> {
		async {
			debug!(method = "shutdown");
			log_result("shutdown", self.inner.shutdown().await)
		}
		.instrument(self.span.clone())
		.await
	}

	async fn exit(&self) -> Result<()> {
		async {
			debug!(method = "exit");
			log_result("exit", self.inner.exit().await)
		}
		.instrument(self.span.clone())
		.await
	}

	async fn did_open(&self, params: DidOpenTextDocumentParams) -> Result<()> {
		async {
			let doc = &params.text_document;
			debug!(
				method = "textDocument/didOpen",
				uri = doc.uri.as_str(),
				version = doc.version,
				language = %doc.language_id,
				len = doc.text.len()
			);
			log_result("textDocument/didOpen", self.inner.did_open(params).await)
		}
		.instrument(self.span.clone())
		.await
	}

	async fn did_change(&self, params: DidChangeTextDocumentParams) -> Result<()> {
		async {
			let doc = &params.text_document;
			debug!(
				method = "textDocument/didChange",
				uri = doc.uri.as_str(),
				version = doc.version,
				changes = params.content_changes.len()
			);
			log_result("textDocument/didChange", self.inner.did_change(params).await)
		}
		.instrument(self.span.clone())
		.await
	}

	async fn did_close(&self, params: DidCloseTextDocumentParams) -> Result<()> {
		async {
			debug!(method = "textDocument/didClose", uri = params.text_document.uri.as_str());
			log_result("textDocument/didClose", self.inner.did_close(params).await)
		}
		.instrument(self.span.clone())
		.await
	}

	async fn did_save(&self, params: DidSaveTextDocumentParams) -> Result<()> {
		async {
			debug!(method = "textDocument/didSave", uri = params.text_document.uri.as_str());
			log_result("textDocument/didSave", self.inner.did_save(params).await)
		}
		.instrument(self.span.clone())
		.await
	}
}

#[async_trait]
impl<C: Client> Client for Logging<C> {
	async fn publish_diagnostics(&self, params: PublishDiagnosticsParams) -> Result<()> {
		async {
			debug!(
				method = "textDocument/publishDiagnostics",
				uri = params.uri.as_str(),
				version = ?params.version,
				diagnostics = params.diagnostics.len()
			);
			let res = self.inner.publish_diagnostics(params).await;
			log_result("textDocument/publishDiagnostics", res)
		}
		.instrument(self.span.clone())
		.await
	}

	async fn log_message(&self, params: LogMessageParams) -> Result<()> {
		async {
			debug!(method = "window/logMessage", kind = ?params.typ);
			log_result("window/logMessage", self.inner.log_message(params).await)
		}
		.instrument(self.span.clone())
		.await
	}

	async fn show_message(&self, params: ShowMessageParams) -> Result<()> {
		async {
			debug!(method = "window/showMessage", kind = ?params.typ);
			log_result("window/showMessage", self.inner.show_message(params).await)
		}
		.instrument(self.span.clone())
		.await
	}

	async fn diagnostic_refresh(&self) -> Result<()> {
		async {
			debug!(method = "workspace/diagnostic/refresh");
			log_result("workspace/diagnostic/refresh", self.inner.diagnostic_refresh().await)
		}
		.instrument(self.span.clone())
		.await
	}

	async fn inlay_hint_refresh(&self) -> Result<()> {
		async {
			debug!(method = "workspace/inlayHint/refresh");
			log_result("workspace/inlayHint/refresh", self.inner.inlay_hint_refresh().await)
		}
		.instrument(self.span.clone())
		.await
	}

	async fn inline_value_refresh(&self) -> Result<()> {
		async {
			debug!(method = "workspace/inlineValue/refresh");
			log_result("workspace/inlineValue/refresh", self.inner.inline_value_refresh().await)
		}
		.instrument(self.span.clone())
		.await
	}

	async fn semantic_tokens_refresh(&self) -> Result<()> {
		async {
			debug!(method = "workspace/semanticTokens/refresh");
			let res = self.inner.semantic_tokens_refresh().await;
			log_result("workspace/semanticTokens/refresh", res)
		}
		.instrument(self.span.clone())
		.await
	}

	async fn code_lens_refresh(&self) -> Result<()> {
		async {
			debug!(method = "workspace/codeLens/refresh");
			log_result("workspace/codeLens/refresh", self.inner.code_lens_refresh().await)
		}
		.instrument(self.span.clone())
		.await
	}
}
