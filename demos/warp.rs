//! A sketch of wiring a [`rpc_rest::Dispatcher`] up to `warp`.
//!
//! Run this with `cargo run --example warp` and then try:
//!
//! curl 'localhost:8000/say-hello?name=Lily'
//! curl -XPOST localhost:8000/echo -H 'content-type: application/json' -d '{"payload":"hi"}'
//!
//! to see the adapter in action.
use bytes::{Buf, Bytes};
use futures::io::Cursor;
use rpc_rest::http::{Method, Request};
use rpc_rest::procedure::{OpenApiMeta, ProcedureDef, ProcedureKind};
use rpc_rest::route::RouteTable;
use rpc_rest::schema::{Issue, Schema};
use rpc_rest::{Dispatcher, DispatcherOptions};
use serde_json::{json, Value};
use std::io::Read;
use std::sync::Arc;
use warp::Filter;

/// A minimal hand-rolled [`Schema`] standing in for a real validator
/// library (`serde_valid`, `garde`, or whatever backs your procedures'
/// input/output types in practice).
struct AnyObject;
impl Schema for AnyObject {
    fn validate(&self, value: Value) -> Result<Value, Vec<Issue>> {
        if value.is_object() {
            Ok(value)
        } else {
            Err(vec![Issue::invalid_type(vec![], "object", "other")])
        }
    }
    fn declares_object_shape(&self) -> bool {
        true
    }
}

fn procedures() -> Vec<ProcedureDef<()>> {
    vec![
        ProcedureDef {
            name: "sayHello".to_owned(),
            kind: ProcedureKind::Query,
            meta: OpenApiMeta::new(Method::GET, "/say-hello"),
            input_schema: Arc::new(AnyObject),
            output_schema: Arc::new(AnyObject),
            invoke: Arc::new(|input: Value, _ctx: ()| {
                Box::pin(async move {
                    let name = input["name"].as_str().unwrap_or("world").to_owned();
                    Ok(json!({ "greeting": format!("Hello, {}!", name) }))
                })
            }),
        },
        ProcedureDef {
            name: "echo".to_owned(),
            kind: ProcedureKind::Mutation,
            meta: OpenApiMeta::new(Method::POST, "/echo"),
            input_schema: Arc::new(AnyObject),
            output_schema: Arc::new(AnyObject),
            invoke: Arc::new(|input: Value, _ctx: ()| Box::pin(async move { Ok(input) })),
        },
    ]
}

#[tokio::main]
async fn main() {
    let routes = RouteTable::construct(procedures()).expect("valid route table");
    let dispatcher = Arc::new(Dispatcher::new(routes, DispatcherOptions::<()>::defaults()));

    let filter = extract_request().and_then(move |req: Request<Vec<u8>>| {
        let dispatcher = dispatcher.clone();
        async move {
            let (parts, body) = req.into_parts();
            let req = Request::from_parts(parts, Cursor::new(body));
            let response = dispatcher.handle(req).await;
            Ok::<_, std::convert::Infallible>(to_warp_reply(response))
        }
    });

    warp::serve(filter)
        .bind("127.0.0.1:8000".parse::<std::net::SocketAddr>().unwrap())
        .await;
}

/// A warp filter that reassembles an incoming request into the plain
/// `http::Request<Vec<u8>>` the dispatcher expects. Not streaming -- warp's
/// `body::bytes()` already buffers the whole body into a `Bytes` before this
/// filter ever sees it, so by the time the dispatcher wraps it in a capped
/// reader there's nothing left to abort early; the cap still rejects
/// oversized bodies, just after the fact rather than mid-read.
fn extract_request(
) -> impl Filter<Extract = (Request<Vec<u8>>,), Error = warp::Rejection> + Clone {
    let raw_query = warp::query::raw()
        .map(Some)
        .or(warp::any().map(|| None))
        .unify();

    warp::method()
        .and(warp::path::full())
        .and(raw_query)
        .and(warp::header::headers_cloned())
        .and(warp::body::bytes())
        .map(
            |method: Method,
             path: warp::path::FullPath,
             query: Option<String>,
             headers: http::HeaderMap,
             body: Bytes| {
                let mut bytes: Vec<u8> = Vec::new();
                body.reader().read_to_end(&mut bytes).unwrap();

                let uri = match query {
                    Some(q) => format!("{}?{}", path.as_str(), q),
                    None => path.as_str().to_owned(),
                };

                let mut req = Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(bytes)
                    .expect("request builder");
                *req.headers_mut() = headers;
                req
            },
        )
}

fn to_warp_reply(response: http::Response<Vec<u8>>) -> impl warp::Reply {
    let (parts, body) = response.into_parts();
    let mut reply = warp::reply::Response::new(body.into());
    *reply.status_mut() = parts.status;
    *reply.headers_mut() = parts.headers;
    reply
}
