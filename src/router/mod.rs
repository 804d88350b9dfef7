//! Client-side router: route table, loaders, and suspense-style mounting.
//!
//! SYSTEM CONTEXT
//! ==============
//! A `RouteTable` is built once at startup from `RouteDefinition`s and never
//! changes. `Router::navigate` resolves a path, runs the route's loader
//! against the shared `QueryClient`, and only then asks the route for its
//! view. Everything the router shows goes through an `Outlet`, so the mount
//! sequence (fallback, page, error, not-found) is observable.
//!
//! ERROR HANDLING
//! ==============
//! Loaders do not recover. The first query failure becomes
//! `RouteError::DataUnavailable`, the router mounts an error view in place of
//! the page (the error boundary), and the page is never rendered for that
//! navigation.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::ErrorCode;
use crate::query::{QueryClient, QueryError};

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

pub const DEFAULT_PENDING_TEXT: &str = "Loading...";

// =============================================================================
// ERRORS
// =============================================================================

/// Failure of a route's loader.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RouteError {
    /// A query the route depends on could not be loaded.
    #[error("data unavailable for {path}: {source}")]
    DataUnavailable { path: String, source: QueryError },
}

impl ErrorCode for RouteError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DataUnavailable { .. } => "E_DATA_UNAVAILABLE",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::DataUnavailable { source, .. } => source.retryable(),
        }
    }
}

/// Invalid route table construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteTableError {
    #[error("route path must start with '/': {0}")]
    InvalidPath(String),
    #[error("route path registered twice: {0}")]
    DuplicatePath(String),
}

// =============================================================================
// VIEWS
// =============================================================================

/// What the router mounts into an outlet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Placeholder shown while a suspense-wrapped loader is pending.
    Fallback(String),
    /// A route's page.
    Page { title: String, body: Vec<String> },
    /// Error boundary output for a failed loader.
    Error { code: &'static str, message: String },
    /// No route matched the path.
    NotFound(String),
}

impl View {
    #[must_use]
    pub fn is_page(&self) -> bool {
        matches!(self, Self::Page { .. })
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fallback(text) => write!(f, "{text}"),
            Self::Page { title, body } => {
                write!(f, "{title}")?;
                for line in body {
                    write!(f, "\n{line}")?;
                }
                Ok(())
            }
            Self::Error { code, message } => write!(f, "error [{code}]: {message}"),
            Self::NotFound(path) => write!(f, "page not found: {path}"),
        }
    }
}

/// Receives every view the router mounts, in order.
pub trait Outlet {
    fn mount(&mut self, view: View);
}

impl Outlet for Vec<View> {
    fn mount(&mut self, view: View) {
        self.push(view);
    }
}

// =============================================================================
// ROUTE DEFINITION
// =============================================================================

/// Context handed to loaders and views. Carries the shared query cache.
#[derive(Clone, Default)]
pub struct RouterContext {
    pub query_client: QueryClient,
}

pub type LoaderFn = Arc<dyn Fn(RouterContext) -> BoxFuture<'static, Result<(), QueryError>> + Send + Sync>;
pub type ViewFn = Arc<dyn Fn(&RouterContext) -> View + Send + Sync>;

/// Static binding of a path to a loader, a view, and a suspense policy.
#[derive(Clone)]
pub struct RouteDefinition {
    path: String,
    view: ViewFn,
    loader: Option<LoaderFn>,
    pending: Option<ViewFn>,
    wrap_in_suspense: bool,
}

impl RouteDefinition {
    pub fn new<V>(path: impl Into<String>, view: V) -> Self
    where
        V: Fn(&RouterContext) -> View + Send + Sync + 'static,
    {
        Self { path: path.into(), view: Arc::new(view), loader: None, pending: None, wrap_in_suspense: false }
    }

    /// Attach a loader. Its value is discarded; only success or failure
    /// matters to the router.
    #[must_use]
    pub fn loader<L, Fut, T>(mut self, loader: L) -> Self
    where
        L: Fn(RouterContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
        T: Send + 'static,
    {
        self.loader = Some(Arc::new(move |ctx: RouterContext| loader(ctx).map(|r| r.map(drop)).boxed()));
        self
    }

    /// Show a fallback view while the loader is pending.
    #[must_use]
    pub fn wrap_in_suspense(mut self, wrap: bool) -> Self {
        self.wrap_in_suspense = wrap;
        self
    }

    /// Custom fallback view for this route.
    #[must_use]
    pub fn pending_view<V>(mut self, view: V) -> Self
    where
        V: Fn(&RouterContext) -> View + Send + Sync + 'static,
    {
        self.pending = Some(Arc::new(view));
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }

    #[must_use]
    pub fn wraps_in_suspense(&self) -> bool {
        self.wrap_in_suspense
    }
}

impl fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("path", &self.path)
            .field("has_loader", &self.loader.is_some())
            .field("wrap_in_suspense", &self.wrap_in_suspense)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// ROUTE TABLE
// =============================================================================

/// Immutable path -> route mapping.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteDefinition>,
}

#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    routes: Vec<RouteDefinition>,
}

impl RouteTable {
    #[must_use]
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// Look up the route for a navigation path.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&RouteDefinition> {
        self.routes.get(normalize_path(path))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RouteTableBuilder {
    #[must_use]
    pub fn route(mut self, route: RouteDefinition) -> Self {
        self.routes.push(route);
        self
    }

    /// Freeze the table.
    ///
    /// # Errors
    ///
    /// Returns [`RouteTableError`] for a path without a leading `/` or a path
    /// registered twice.
    pub fn build(self) -> Result<RouteTable, RouteTableError> {
        let mut routes = HashMap::with_capacity(self.routes.len());
        for mut route in self.routes {
            if !route.path.starts_with('/') {
                return Err(RouteTableError::InvalidPath(route.path));
            }
            let normalized = normalize_path(&route.path).to_owned();
            if routes.contains_key(&normalized) {
                return Err(RouteTableError::DuplicatePath(normalized));
            }
            route.path.clone_from(&normalized);
            routes.insert(normalized, route);
        }
        Ok(RouteTable { routes })
    }
}

/// Drop query string, fragment, and trailing slashes (`/` stays `/`).
fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Result of one navigation.
#[derive(Debug, Clone)]
pub enum NavigationOutcome {
    /// The route's page was mounted.
    Rendered(View),
    /// The loader failed; the error view was mounted instead of the page.
    Failed(RouteError),
    /// No route matched.
    NotFound(String),
}

#[derive(Clone)]
pub struct Router {
    table: Arc<RouteTable>,
    context: RouterContext,
}

impl Router {
    #[must_use]
    pub fn new(table: RouteTable, context: RouterContext) -> Self {
        Self { table: Arc::new(table), context }
    }

    /// Navigate to `path`: run the loader, then mount the page.
    ///
    /// The page view is produced only after the loader succeeds. Dropping the
    /// returned future abandons the navigation and any fetch it alone was
    /// waiting on.
    pub async fn navigate<O>(&self, path: &str, outlet: &mut O) -> NavigationOutcome
    where
        O: Outlet + Send + ?Sized,
    {
        let Some(route) = self.table.resolve(path) else {
            tracing::info!(%path, "no route matched");
            outlet.mount(View::NotFound(path.to_owned()));
            return NavigationOutcome::NotFound(path.to_owned());
        };
        tracing::info!(path = route.path(), "navigating");

        if let Some(loader) = &route.loader {
            if route.wrap_in_suspense {
                let pending = route.pending.as_ref().map_or_else(
                    || View::Fallback(DEFAULT_PENDING_TEXT.to_owned()),
                    |view| view(&self.context),
                );
                outlet.mount(pending);
            }

            if let Err(source) = loader(self.context.clone()).await {
                let err = RouteError::DataUnavailable { path: route.path().to_owned(), source };
                tracing::warn!(path = route.path(), code = err.error_code(), error = %err, "route loader failed");
                outlet.mount(View::Error { code: err.error_code(), message: err.to_string() });
                return NavigationOutcome::Failed(err);
            }
        }

        let view = (route.view)(&self.context);
        outlet.mount(view.clone());
        NavigationOutcome::Rendered(view)
    }
}
