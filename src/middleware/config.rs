//! Request ID middleware configuration.

use super::context::RequestContext;
use super::service::{Interceptor, RequestIdLayer};
use crate::request_id::{random_id, RequestId, X_REQUEST_ID};
use hyper::header::HeaderName;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Predicate deciding whether the middleware is bypassed for a request.
pub type Skipper = Arc<dyn Fn(&RequestContext<'_>) -> bool + Send + Sync>;

/// Argumentless ID factory.
pub type FixedFn = Arc<dyn Fn() -> String + Send + Sync>;

/// ID factory that can look at the request.
pub type ContextFn = Arc<dyn Fn(&RequestContext<'_>) -> String + Send + Sync>;

/// Callback invoked with every resolved request ID.
pub type RequestIdHook = Arc<dyn Fn(&RequestContext<'_>, &RequestId) + Send + Sync>;

/// Errors detected while building the middleware.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("context-aware strategy selected but no context generator is configured")]
    MissingContextGenerator,

    #[error("both a generator and a context generator are configured; select a strategy")]
    ConflictingGenerators,
}

/// Which generator a built middleware uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeneratorStrategy {
    /// Pick whichever generator is configured, or the default one.
    #[default]
    Auto,
    /// Use the argumentless generator (or the default one).
    Fixed,
    /// Use the context generator. It must be configured.
    ContextAware,
}

/// The generation strategy of a built middleware.
#[derive(Clone)]
pub enum Generator {
    Fixed(FixedFn),
    ContextAware(ContextFn),
}

impl Generator {
    /// Produce an ID for a request that did not bring one.
    pub fn generate(&self, ctx: &RequestContext<'_>) -> String {
        match self {
            Generator::Fixed(f) => f(),
            Generator::ContextAware(f) => f(ctx),
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Generator::Fixed(Arc::new(random_id))
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generator::Fixed(_) => f.write_str("Generator::Fixed"),
            Generator::ContextAware(_) => f.write_str("Generator::ContextAware"),
        }
    }
}

/// Configuration for the request ID middleware.
///
/// Every call to [`RequestIdConfig::default`] yields an independent value;
/// nothing is shared between separately built layers.
///
/// ```
/// use rustrid::middleware::RequestIdConfig;
///
/// let layer = RequestIdConfig::default()
///     .skip(|ctx| ctx.path() == "/healthz")
///     .generator(|| "fixed-id".to_string())
///     .build()
///     .unwrap();
/// # let _ = layer;
/// ```
#[derive(Clone)]
pub struct RequestIdConfig {
    /// Bypass the middleware entirely when this returns true. Default: never.
    pub skip: Option<Skipper>,

    /// Argumentless ID factory. Default: 32 character random string.
    pub generator: Option<FixedFn>,

    /// ID factory receiving the request, e.g. to reuse a platform-assigned
    /// invocation ID.
    pub context_generator: Option<ContextFn>,

    /// Which of the two generators to use.
    pub strategy: GeneratorStrategy,

    /// Header read from the request and written to the response.
    pub header: HeaderName,

    /// Called with the resolved ID before the inner service runs.
    pub on_request_id: Option<RequestIdHook>,
}

impl Default for RequestIdConfig {
    fn default() -> Self {
        Self {
            skip: None,
            generator: None,
            context_generator: None,
            strategy: GeneratorStrategy::Auto,
            header: X_REQUEST_ID,
            on_request_id: None,
        }
    }
}

impl RequestIdConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.skip = Some(Arc::new(f));
        self
    }

    pub fn generator<F>(mut self, f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.generator = Some(Arc::new(f));
        self
    }

    pub fn context_generator<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestContext<'_>) -> String + Send + Sync + 'static,
    {
        self.context_generator = Some(Arc::new(f));
        self
    }

    pub fn strategy(mut self, strategy: GeneratorStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn header(mut self, header: HeaderName) -> Self {
        self.header = header;
        self
    }

    pub fn on_request_id<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestContext<'_>, &RequestId) + Send + Sync + 'static,
    {
        self.on_request_id = Some(Arc::new(f));
        self
    }

    /// Resolve the generation strategy.
    pub fn resolve_generator(&self) -> Result<Generator, ConfigurationError> {
        match self.strategy {
            GeneratorStrategy::Auto => match (&self.generator, &self.context_generator) {
                (Some(_), Some(_)) => Err(ConfigurationError::ConflictingGenerators),
                (Some(f), None) => Ok(Generator::Fixed(Arc::clone(f))),
                (None, Some(f)) => Ok(Generator::ContextAware(Arc::clone(f))),
                (None, None) => Ok(Generator::default()),
            },
            GeneratorStrategy::Fixed => {
                if self.context_generator.is_some() {
                    debug!("fixed strategy selected, ignoring context generator");
                }
                Ok(self
                    .generator
                    .as_ref()
                    .map(|f| Generator::Fixed(Arc::clone(f)))
                    .unwrap_or_default())
            }
            GeneratorStrategy::ContextAware => {
                if self.generator.is_some() {
                    debug!("context-aware strategy selected, ignoring generator");
                }
                self.context_generator
                    .as_ref()
                    .map(|f| Generator::ContextAware(Arc::clone(f)))
                    .ok_or(ConfigurationError::MissingContextGenerator)
            }
        }
    }

    /// Validate the configuration and build the middleware layer.
    pub fn build(self) -> Result<RequestIdLayer, ConfigurationError> {
        let generator = self.resolve_generator()?;

        debug!(
            header = %self.header,
            generator = ?generator,
            skip = self.skip.is_some(),
            "request id middleware configured"
        );

        Ok(RequestIdLayer::from_interceptor(Interceptor {
            skip: self.skip,
            generator,
            header: self.header,
            on_request_id: self.on_request_id,
        }))
    }
}

impl fmt::Debug for RequestIdConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestIdConfig")
            .field("skip", &self.skip.is_some())
            .field("generator", &self.generator.is_some())
            .field("context_generator", &self.context_generator.is_some())
            .field("strategy", &self.strategy)
            .field("header", &self.header)
            .field("on_request_id", &self.on_request_id.is_some())
            .finish()
    }
}

/// Skip requests whose path exactly matches one of `paths`.
pub fn skip_paths(
    paths: Vec<String>,
) -> impl Fn(&RequestContext<'_>) -> bool + Send + Sync + 'static {
    move |ctx: &RequestContext<'_>| paths.iter().any(|p| p == ctx.path())
}

/// Reuse the value of another inbound header as the request ID, falling
/// back to a random ID when it is missing or empty.
///
/// Useful behind platforms that assign their own invocation ID.
pub fn from_header_or_random(
    name: HeaderName,
) -> impl Fn(&RequestContext<'_>) -> String + Send + Sync + 'static {
    move |ctx: &RequestContext<'_>| {
        ctx.header_str(&name)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(random_id)
    }
}
