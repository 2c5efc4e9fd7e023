use async_trait::async_trait;
use lsp_types::{LogMessageParams, PublishDiagnosticsParams, ShowMessageParams};

use crate::Result;

/// Calls a language server makes back to the editor.
///
/// Like [`Server`](crate::Server), decorators implement this trait by
/// forwarding to an inner `Client`. [`Logging`](crate::layer::Logging)
/// decorates both directions.
#[async_trait]
pub trait Client: Send + Sync {
	/// Sends `textDocument/publishDiagnostics`.
	async fn publish_diagnostics(&self, params: PublishDiagnosticsParams) -> Result<()>;

	/// Sends `window/logMessage`.
	async fn log_message(&self, params: LogMessageParams) -> Result<()>;

	/// Sends `window/showMessage`.
	async fn show_message(&self, params: ShowMessageParams) -> Result<()>;

	/// Requests `workspace/diagnostic/refresh`.
	async fn diagnostic_refresh(&self) -> Result<()>;

	/// Requests `workspace/inlayHint/refresh`.
	async fn inlay_hint_refresh(&self) -> Result<()>;

	/// Requests `workspace/inlineValue/refresh`.
	async fn inline_value_refresh(&self) -> Result<()>;

	/// Requests `workspace/semanticTokens/refresh`.
	async fn semantic_tokens_refresh(&self) -> Result<()>;

	/// Requests `workspace/codeLens/refresh`.
	async fn code_lens_refresh(&self) -> Result<()>;
}
