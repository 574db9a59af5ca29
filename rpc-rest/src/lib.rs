#![warn(missing_docs)]
/*!
This crate adapts a type-safe, procedure-based RPC router (the kind you'd
build with a library that lets clients call `sayHello({ name: "Lily" })` and
get back a typed result) onto a conventional REST-style HTTP surface: each
procedure is bound to a `GET`/`POST`/`PUT`/`PATCH`/`DELETE` method and a path
template, and this crate takes care of routing, decoding request bodies and
query strings into the procedure's input shape, invoking it, and mapping the
result (or any failure) back onto an `http::Response`.

The procedure router itself -- how procedures are declared, how their input
and output types are composed, how your app's own context type is built --
stays entirely external to this crate. What this crate owns is the strip of
plumbing between an `http::Request<Vec<u8>>` arriving and a procedure being
invoked with a validated JSON value:

- [`path`] compiles `{placeholder}` path templates into matchers.
- [`schema`] defines the narrow [`schema::Schema`] trait this crate needs
  from whatever validator library backs your procedures' input/output types,
  plus the primitive-coercion wrapper for string-only transports (query
  strings, path segments).
- [`procedure`] describes one bound procedure: its HTTP method, path, accepted
  content-types, input/output schemas, and its invocation closure.
- [`route`] compiles a namespace of procedures into a [`route::RouteTable`].
- [`decode`] turns a matched request into the single candidate JSON value a
  procedure's input schema validates.
- [`error`] is this crate's error taxonomy and the code-to-status mapping
  every failure (routing, decoding, validation, or procedure-raised) is
  funnelled through.
- [`dispatch`] ties all of the above into the single [`dispatch::Dispatcher`]
  entry point.

# A basic example

```rust
# tokio::runtime::Runtime::new().unwrap().block_on(async {
use rpc_rest::{
    http::{ Request, Method },
    procedure::{ ProcedureDef, ProcedureKind, OpenApiMeta },
    route::RouteTable,
    dispatch::{ Dispatcher, DispatcherOptions },
    schema::{ Schema, Issue },
};
use serde_json::{ json, Value };
use std::sync::Arc;

// A minimal hand-rolled `Schema` standing in for a real validator library.
struct AnyObject;
impl Schema for AnyObject {
    fn validate(&self, value: Value) -> Result<Value, Vec<Issue>> {
        if value.is_object() { Ok(value) } else { Err(vec![Issue::invalid_type(vec![], "object", "other")]) }
    }
    fn declares_object_shape(&self) -> bool { true }
}

let procedures = vec![ProcedureDef {
    name: "sayHello".to_owned(),
    kind: ProcedureKind::Query,
    meta: OpenApiMeta::new(Method::GET, "/say-hello/{name}"),
    input_schema: Arc::new(AnyObject),
    output_schema: Arc::new(AnyObject),
    invoke: Arc::new(|input: Value, _ctx: ()| Box::pin(async move {
        let name = input["name"].as_str().unwrap_or_default().to_owned();
        Ok(json!({ "greeting": format!("Hello, {}!", name) }))
    })),
}];

let routes = RouteTable::construct(procedures).unwrap();
let dispatcher = Dispatcher::new(routes, DispatcherOptions::<()>::defaults());

let req = Request::get("/say-hello/Lily")
    .body(futures::io::Cursor::new(Vec::new()))
    .unwrap();
let response = dispatcher.handle(req).await;
assert_eq!(response.status(), 200);
# });
```

# Error handling

Every failure -- an unmatched route, a rejected content-type, an oversized
body, a schema validation failure, or a typed error a procedure itself
raises -- is normalized to an [`error::AdapterError`] with a stable `code`
and HTTP status. See the [`error`] module for the full taxonomy and the
[`ProcedureError`] derive for the common case of deriving
`Into<error::ProcedureFailure>` for your own error enum. Combine it with
`thiserror` for the `Display` impl the derive reads its `message` from:

```rust
use rpc_rest::{ProcedureError, error::ProcedureFailure};

#[derive(Debug, thiserror::Error, ProcedureError)]
#[error("cannot divide {dividend} by zero")]
#[procedure_error(code = "DIVIDE_BY_ZERO", status = 400)]
struct DivideByZero { dividend: i64 }

let failure: ProcedureFailure = DivideByZero { dividend: 7 }.into();
assert_eq!(failure.code, "DIVIDE_BY_ZERO");
assert_eq!(failure.status, 400);
assert_eq!(failure.message, "cannot divide 7 by zero");
```

# Limitations

This crate deliberately does not implement an HTTP server, a procedure
router, or schema composition: it only adapts an already-built router (of
whatever shape) onto raw `http::Request`/`http::Response` values, which you
then wire into `hyper`, `warp`, or whatever serves HTTP in your app. See
`demos/` for a sketch of that wiring.
*/

pub mod decode;
pub mod dispatch;
pub mod error;
pub mod path;
pub mod procedure;
pub mod route;
pub mod schema;
pub mod stream;

pub use rpc_rest_macros::*;

pub use async_trait::async_trait;

/// A re-export of types from the `http` crate that are useful here.
pub mod http {
    pub use http::{HeaderName, HeaderValue, Method, Request, Response};
}

pub use dispatch::{
    CreateContext, Dispatcher, DispatcherOptions, OnError, OnErrorInfo, ResponseMeta,
    ResponseMetaInfo, ResponseMetaOverride, ResponseOutcome, ResponsePatch,
};
pub use error::{AdapterError, ErrorFormatter, ProcedureFailure};
pub use path::PathMatcher;
pub use procedure::{OpenApiMeta, ProcedureDef, ProcedureKind};
pub use route::{RouteInfo, RouteTable};
pub use schema::{Issue, LeafKind, Schema};
pub use stream::CappedAsyncRead;
