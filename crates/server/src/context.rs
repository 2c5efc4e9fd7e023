use tracing::{Span, info_span};

use crate::Config;

/// Shared settings handed to every decorator at construction.
#[derive(Debug, Clone)]
pub struct Context {
	config: Config,
	span: Span,
}

impl Default for Context {
	fn default() -> Self {
		Self::new(Config::default())
	}
}

impl Context {
	/// Creates a context whose spans are rooted at a `quire` span.
	pub fn new(config: Config) -> Self {
		Self {
			config,
			span: info_span!("quire"),
		}
	}

	/// Replaces the root span.
	pub fn with_span(mut self, span: Span) -> Self {
		self.span = span;
		self
	}

	/// Returns the configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Returns the root span.
	pub fn span(&self) -> &Span {
		&self.span
	}

	/// Returns a child span of the root, tagged with `component`.
	pub fn span_for(&self, component: &'static str) -> Span {
		info_span!(parent: &self.span, "component", name = component)
	}
}
