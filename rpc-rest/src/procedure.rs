//! The procedure definitions this adapter dispatches to: the shape the
//! external procedure router's namespace is walked into.

use crate::error::ProcedureFailure;
use crate::schema::Schema;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;

/// Whether a procedure is a read (`Query`, mapped to `GET`/`HEAD` unless an
/// explicit method is given) or a write (`Mutation`, mapped to `POST` by
/// default). Purely informational once an explicit [`OpenApiMeta::method`]
/// is set; retained because the external router still distinguishes the two
/// for its own purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    Query,
    Mutation,
}

/// The REST-facing metadata a procedure carries: which HTTP method and path
/// template it's bound to, and which request content-types it accepts.
#[derive(Debug, Clone)]
pub struct OpenApiMeta {
    pub(crate) method: http::Method,
    pub(crate) path: String,
    pub(crate) content_types: Vec<String>,
}

impl OpenApiMeta {
    /// A new binding at `method`/`path`, accepting `application/json` bodies
    /// by default.
    pub fn new(method: http::Method, path: impl Into<String>) -> OpenApiMeta {
        OpenApiMeta {
            method,
            path: path.into(),
            content_types: vec!["application/json".to_owned()],
        }
    }

    /// Override the set of content-types this binding accepts on its
    /// request body. Must be non-empty; panics otherwise, since a binding
    /// that accepts nothing can never be reached.
    pub fn with_content_types(mut self, content_types: Vec<String>) -> OpenApiMeta {
        assert!(
            !content_types.is_empty(),
            "a procedure binding must accept at least one content-type"
        );
        self.content_types = content_types;
        self
    }

    pub fn method(&self) -> &http::Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content_types(&self) -> &[String] {
        &self.content_types
    }
}

/// The invocation closure a procedure binds: given the validated input and
/// the caller-created context, resolve to the raw (not yet validated)
/// output value or a [`ProcedureFailure`].
pub type Invoke<Ctx> = Arc<
    dyn Fn(Value, Ctx) -> BoxFuture<'static, Result<Value, ProcedureFailure>> + Send + Sync,
>;

/// One procedure pulled from the external router's namespace, with enough
/// metadata for this adapter to compile a route-table binding for it ( "Construct(router)").
#[derive(Clone)]
pub struct ProcedureDef<Ctx> {
    pub name: String,
    pub kind: ProcedureKind,
    pub meta: OpenApiMeta,
    pub input_schema: Arc<dyn Schema>,
    pub output_schema: Arc<dyn Schema>,
    pub invoke: Invoke<Ctx>,
}

impl<Ctx> std::fmt::Debug for ProcedureDef<Ctx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcedureDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("meta", &self.meta)
            .finish()
    }
}
