//! The route table: compiles the external router's procedure
//! namespace into method-keyed, path-matched bindings, rejecting at
//! construction time any procedure whose output schema isn't object-shaped.

use crate::path::{PathMatcher, PathTemplateError};
use crate::procedure::ProcedureDef;
use std::collections::HashMap;
use std::fmt;

/// A source of procedures to bind: the external router's namespace walk.
/// Implemented for `Vec<ProcedureDef<Ctx>>` directly; a real router
/// integration implements this itself over however it enumerates its own
/// procedures.
pub trait ProcedureSource<Ctx> {
    fn procedures(self) -> Vec<ProcedureDef<Ctx>>;
}

impl<Ctx> ProcedureSource<Ctx> for Vec<ProcedureDef<Ctx>> {
    fn procedures(self) -> Vec<ProcedureDef<Ctx>> {
        self
    }
}

/// A single compiled binding: a procedure plus its compiled path matcher.
pub struct Binding<Ctx> {
    pub def: ProcedureDef<Ctx>,
    pub matcher: PathMatcher,
}

/// Raised when the route table can't be built from the supplied procedures.
#[derive(Debug)]
pub enum RouteTableError {
    /// A path template failed to compile.
    Path {
        procedure: String,
        source: PathTemplateError,
    },
    /// A procedure's output schema doesn't declare an object shape.
    NonObjectOutputSchema { procedure: String },
}

impl fmt::Display for RouteTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteTableError::Path { procedure, source } => {
                write!(f, "procedure {:?}: {}", procedure, source)
            }
            RouteTableError::NonObjectOutputSchema { procedure } => write!(
                f,
                "procedure {:?} declares an output schema that is not object-shaped \
                 (void, scalar, or array outputs cannot be served over this adapter)",
                procedure
            ),
        }
    }
}
impl std::error::Error for RouteTableError {}

/// Introspection summary of one bound route, returned by [`RouteTable::info`].
#[derive(Debug, Clone)]
pub struct RouteInfo {
    pub name: String,
    pub method: http::Method,
    pub path: String,
}

/// The compiled set of bindings this adapter dispatches against, grouped by
/// HTTP method for lookup.
pub struct RouteTable<Ctx> {
    by_method: HashMap<http::Method, Vec<Binding<Ctx>>>,
}

impl<Ctx> RouteTable<Ctx> {
    /// Build a route table from the procedures `source` yields. Fails fast
    /// (naming the offending procedure) on the first invalid path template
    /// or non-object output schema encountered.
    pub fn construct<S: ProcedureSource<Ctx>>(source: S) -> Result<RouteTable<Ctx>, RouteTableError> {
        let mut by_method: HashMap<http::Method, Vec<Binding<Ctx>>> = HashMap::new();

        for def in source.procedures() {
            if !def.output_schema.declares_object_shape() {
                return Err(RouteTableError::NonObjectOutputSchema { procedure: def.name });
            }
            let matcher = PathMatcher::compile(&def.meta.path).map_err(|source| RouteTableError::Path {
                procedure: def.name.clone(),
                source,
            })?;
            let method = def.meta.method.clone();
            by_method
                .entry(method)
                .or_insert_with(Vec::new)
                .push(Binding { def, matcher });
        }

        Ok(RouteTable { by_method })
    }

    /// Find the first binding (in declaration order) whose method matches
    /// and whose path template matches `path`, along with the decoded path
    /// parameters. No precedence ordering beyond declaration order is
    /// needed or attempted.
    pub fn resolve(&self, method: &http::Method, path: &str) -> Option<(&Binding<Ctx>, HashMap<String, String>)> {
        let bindings = self.by_method.get(method)?;
        for binding in bindings {
            if let Some(params) = binding.matcher.matches(path) {
                return Some((binding, params));
            }
        }
        None
    }

    /// A flat introspection summary of every bound route, for callers that
    /// want to generate documentation or diagnostics without walking the
    /// method map themselves. Sorted by procedure name so two calls against
    /// the same table always produce the same order, regardless of the
    /// method map's iteration order.
    pub fn info(&self) -> Vec<RouteInfo> {
        let mut out = Vec::new();
        for (method, bindings) in &self.by_method {
            for binding in bindings {
                out.push(RouteInfo {
                    name: binding.def.name.clone(),
                    method: method.clone(),
                    path: binding.matcher.template().to_owned(),
                });
            }
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}
