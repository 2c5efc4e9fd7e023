//! End-to-end session through the full decorator stack.

use std::fs;

use async_trait::async_trait;
use quire_server::cache::lsp_types::{
	DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
	DidSaveTextDocumentParams, InitializeParams, InitializeResult, InitializedParams, Position,
	Range, TextDocumentContentChangeEvent, TextDocumentIdentifier, TextDocumentItem,
	VersionedTextDocumentIdentifier,
};
use quire_server::{Config, Context, ErrorCode, Result, Server, wrap};

/// A language server that does nothing on its own.
struct Noop;

#[async_trait]
impl Server for Noop {
	async fn initialize(&self, _params: InitializeParams) -> Result<InitializeResult> {
		Ok(InitializeResult::default())
	}

	async fn initialized(&self, _params: InitializedParams) -> Result<()> {
		Ok(())
	}

	async fn shutdown(&self) -> Result<()> {
		Ok(())
	}

	async fn exit(&self) -> Result<()> {
		Ok(())
	}

	async fn did_open(&self, _params: DidOpenTextDocumentParams) -> Result<()> {
		Ok(())
	}

	async fn did_change(&self, _params: DidChangeTextDocumentParams) -> Result<()> {
		Ok(())
	}

	async fn did_close(&self, _params: DidCloseTextDocumentParams) -> Result<()> {
		Ok(())
	}

	async fn did_save(&self, _params: DidSaveTextDocumentParams) -> Result<()> {
		Ok(())
	}
}

#[tokio::test]
async fn test_session_through_wrapped_server() {
	let dir = tempfile::tempdir().unwrap();
	fs::create_dir_all(dir.path().join(".git")).unwrap();
	fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
	fs::write(dir.path().join("notes.txt"), "hello\n").unwrap();

	let root = quire_server::cache::uri_from_path(dir.path()).unwrap();
	let file = quire_server::cache::uri_from_path(&dir.path().join("notes.txt")).unwrap();

	let wrapped = wrap(Noop, &Context::new(Config::default()));
	let server = wrapped.server;
	let cache = wrapped.cache.unwrap();

	let err = server
		.did_open(DidOpenTextDocumentParams {
			text_document: TextDocumentItem {
				uri: file.clone(),
				language_id: "plaintext".into(),
				version: 1,
				text: "hello\n".into(),
			},
		})
		.await
		.unwrap_err();
	assert_eq!(err.code, ErrorCode::ServerNotInitialized);

	#[allow(deprecated)]
	let params = InitializeParams {
		root_uri: Some(root),
		..Default::default()
	};
	let result = server.initialize(params).await.unwrap();
	assert!(result.capabilities.text_document_sync.is_some());
	server.initialized(InitializedParams {}).await.unwrap();

	assert_eq!(cache.list_files().len(), 1);

	server
		.did_open(DidOpenTextDocumentParams {
			text_document: TextDocumentItem {
				uri: file.clone(),
				language_id: "plaintext".into(),
				version: 1,
				text: "hello\n".into(),
			},
		})
		.await
		.unwrap();
	server
		.did_change(DidChangeTextDocumentParams {
			text_document: VersionedTextDocumentIdentifier {
				uri: file.clone(),
				version: 2,
			},
			content_changes: vec![TextDocumentContentChangeEvent {
				range: Some(Range {
					start: Position { line: 0, character: 0 },
					end: Position { line: 0, character: 5 },
				}),
				range_length: None,
				text: "goodbye".into(),
			}],
		})
		.await
		.unwrap();

	let snapshot = cache.get_detached_file(&file).unwrap();
	assert_eq!(snapshot.content(), b"goodbye\n");
	assert_eq!(snapshot.saved_content(false).unwrap(), b"hello\n");

	fs::write(dir.path().join("notes.txt"), "goodbye\n").unwrap();
	server
		.did_save(DidSaveTextDocumentParams {
			text_document: TextDocumentIdentifier { uri: file.clone() },
			text: None,
		})
		.await
		.unwrap();
	assert_eq!(cache.get_saved_content(&file, false).unwrap(), b"goodbye\n");

	server
		.did_close(DidCloseTextDocumentParams {
			text_document: TextDocumentIdentifier { uri: file.clone() },
		})
		.await
		.unwrap();
	assert!(!cache.get_file(&file).unwrap().is_opened());
	assert!(!snapshot.is_stale());

	server.shutdown().await.unwrap();
	server.exit().await.unwrap();
}

#[tokio::test]
async fn test_caching_disabled() {
	let config = Config::from_json_str(r#"{"caching": false}"#).unwrap();
	let wrapped = wrap(Noop, &Context::new(config));
	assert!(wrapped.cache.is_none());

	wrapped.server.initialize(InitializeParams::default()).await.unwrap();
	wrapped.server.initialized(InitializedParams {}).await.unwrap();
	wrapped.server.shutdown().await.unwrap();
}
