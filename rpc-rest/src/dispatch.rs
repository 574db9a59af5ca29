//! The dispatcher: ties the route table, the request decoder, and a
//! caller's context/hook functions together into a single `handle()` entry
//! point that turns an incoming request into an `http::Response<Vec<u8>>`.

use crate::decode;
use crate::error::{AdapterError, ErrorFormatter, NoopErrorFormatter};
use crate::procedure::ProcedureKind;
use crate::route::RouteTable;
use crate::schema::Schema;
use async_trait::async_trait;
use futures::io::AsyncRead;
use serde_json::Value;
use std::sync::Arc;

/// A mutable sink for response-side effects a hook can apply before the
/// response body and status are known -- the Rust analogue of the mutable
/// `res` object a `createContext(req, res)` hook is handed in a JS/TS RPC
/// framework. Headers queued here are applied to the final response ahead
/// of whatever `responseMeta` later returns.
#[derive(Default)]
pub struct ResponsePatch {
    pub headers: Vec<(http::HeaderName, http::HeaderValue)>,
}

impl ResponsePatch {
    /// Queue a header to be present on the eventual response, whatever it
    /// turns out to be (success or error).
    pub fn header(&mut self, name: http::HeaderName, value: http::HeaderValue) {
        self.headers.push((name, value));
    }
}

/// Creates a request-scoped context of type `Ctx` from the incoming
/// request's method/URI/headers (the body has already been consumed by the
/// time this runs) and a [`ResponsePatch`] it may queue headers onto.
/// May itself fail (e.g. an auth header is missing); failures here are
/// reported through `onError` exactly like any other dispatch failure, and
/// prevent every later stage (input validation, invocation) from running.
#[async_trait]
pub trait CreateContext<Ctx>: Send + Sync {
    async fn create_context(
        &self,
        req: &http::request::Parts,
        res: &mut ResponsePatch,
    ) -> Result<Ctx, AdapterError>;
}

#[async_trait]
impl<Ctx, F> CreateContext<Ctx> for F
where
    Ctx: Send + 'static,
    F: Fn(&http::request::Parts) -> Result<Ctx, AdapterError> + Send + Sync,
{
    async fn create_context(&self, req: &http::request::Parts, _res: &mut ResponsePatch) -> Result<Ctx, AdapterError> {
        self(req)
    }
}

/// What a dispatch resolved to by the time `responseMeta` is consulted: the
/// serialized output of a successful invocation, or the error that ended it.
pub enum ResponseOutcome<'a> {
    Success { data: &'a Value },
    Error { error: &'a AdapterError },
}

/// Everything `responseMeta` is handed: as much of the request's resolved
/// identity as made it through before the outcome was decided. `kind` and
/// `ctx` are `None` for failures that occurred before routing resolved a
/// binding or before `createContext` ran, respectively.
pub struct ResponseMetaInfo<'a, Ctx> {
    pub path: &'a str,
    pub kind: Option<ProcedureKind>,
    pub ctx: Option<&'a Ctx>,
    pub outcome: ResponseOutcome<'a>,
}

/// The `{status?, headers?}` a `responseMeta` hook may return, merged over
/// the adapter's own defaults.
#[derive(Default)]
pub struct ResponseMetaOverride {
    pub status: Option<u16>,
    pub headers: Vec<(http::HeaderName, http::HeaderValue)>,
}

/// Called once for every response that actually writes a body -- both
/// successes and failures -- to let the caller add response metadata (extra
/// headers, a status override). Never called for the `HEAD` warmup.
pub trait ResponseMeta<Ctx>: Send + Sync {
    fn response_meta(&self, info: ResponseMetaInfo<'_, Ctx>) -> ResponseMetaOverride {
        let _ = info;
        ResponseMetaOverride::default()
    }
}

pub struct NoopResponseMeta;
impl<Ctx> ResponseMeta<Ctx> for NoopResponseMeta {}

/// Everything `onError` is handed: the request's resolved identity at the
/// point of failure (`kind`, `input`, and `ctx` are `None` for whichever of
/// routing/decoding/context-creation never got that far), the raw request
/// parts, and the error itself.
pub struct OnErrorInfo<'a, Ctx> {
    pub path: &'a str,
    pub kind: Option<ProcedureKind>,
    pub input: Option<&'a Value>,
    pub ctx: Option<&'a Ctx>,
    pub req: &'a http::request::Parts,
    pub error: &'a AdapterError,
}

/// Called exactly once per failed dispatch, after the error has been fully
/// resolved to its final `AdapterError`. Never called on success, never
/// called for the `HEAD` warmup.
#[async_trait]
pub trait OnError<Ctx>: Send + Sync {
    async fn on_error(&self, info: OnErrorInfo<'_, Ctx>);
}

pub struct NoopOnError;
#[async_trait]
impl<Ctx: Send + Sync> OnError<Ctx> for NoopOnError {
    async fn on_error(&self, _info: OnErrorInfo<'_, Ctx>) {}
}

/// Construction options for a [`Dispatcher`] ( "Construct(router, createContext, responseMeta, onError, maxBodySize)").
pub struct DispatcherOptions<Ctx> {
    pub create_context: Arc<dyn CreateContext<Ctx>>,
    pub response_meta: Arc<dyn ResponseMeta<Ctx>>,
    pub on_error: Arc<dyn OnError<Ctx>>,
    pub error_formatter: Arc<dyn ErrorFormatter>,
    /// Caps the number of request-body bytes the decoder will read before
    /// aborting ingestion with `PAYLOAD_TOO_LARGE`. `None` means unlimited.
    pub max_body_size: Option<usize>,
}

impl<Ctx> DispatcherOptions<Ctx>
where
    Ctx: Default + Send + Sync + 'static,
{
    /// Sensible defaults: a context constructed via `Ctx::default()`, no
    /// response metadata, no error hook, a 1 MiB body cap, and no error
    /// formatter.
    pub fn defaults() -> DispatcherOptions<Ctx> {
        DispatcherOptions {
            create_context: Arc::new(|_req: &http::request::Parts| Ok(Ctx::default())),
            response_meta: Arc::new(NoopResponseMeta),
            on_error: Arc::new(NoopOnError),
            error_formatter: Arc::new(NoopErrorFormatter),
            max_body_size: Some(1024 * 1024),
        }
    }
}

/// How far a dispatch got before its outcome was decided -- the bits
/// `responseMeta` and `onError` need that aren't carried by the
/// `AdapterError`/output value itself.
struct DispatchState<Ctx> {
    path: String,
    kind: Option<ProcedureKind>,
    input: Option<Value>,
    ctx: Option<Ctx>,
}

/// The adapter's single entry point: wraps a [`RouteTable`] plus its
/// dispatch options, and turns raw HTTP requests into raw HTTP responses.
pub struct Dispatcher<Ctx> {
    routes: RouteTable<Ctx>,
    options: DispatcherOptions<Ctx>,
}

impl<Ctx: Clone + Send + Sync + 'static> Dispatcher<Ctx> {
    pub fn new(routes: RouteTable<Ctx>, options: DispatcherOptions<Ctx>) -> Dispatcher<Ctx> {
        Dispatcher { routes, options }
    }

    /// Introspect the bound routes ( supplemented feature, mirrors the /// external router's own `info()`-style surface).
    pub fn info(&self) -> Vec<crate::route::RouteInfo> {
        self.routes.info()
    }

    /// Handle one request end-to-end. `body` is read incrementally and
    /// capped per `max_body_size` rather than expected to already be a
    /// buffered `Vec<u8>` -- pass a `futures::io::Cursor` around an
    /// in-memory buffer if that's all your transport integration can give
    /// you (see `demos/warp.rs`).
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<Vec<u8>>
    where
        B: AsyncRead + Send + Unpin + 'static,
    {
        // Stage A: HEAD is answered from the method alone, unconditionally --
        // no routing lookup, no context creation, no body read, and no
        // hooks firing at all. This is the pre-warming contract.
        if req.method() == http::Method::HEAD {
            return http::Response::builder().status(204).body(Vec::new()).unwrap();
        }

        let (parts, body) = req.into_parts();
        let mut state = DispatchState {
            path: parts.uri.path().to_owned(),
            kind: None,
            input: None,
            ctx: None,
        };
        let mut response_patch = ResponsePatch::default();

        match self.try_handle(&parts, body, &mut state, &mut response_patch).await {
            Ok(output) => {
                let info = ResponseMetaInfo {
                    path: &state.path,
                    kind: state.kind,
                    ctx: state.ctx.as_ref(),
                    outcome: ResponseOutcome::Success { data: &output },
                };
                let overrides = self.options.response_meta.response_meta(info);
                self.render_success(&output, response_patch, overrides)
            }
            Err(error) => {
                let info = OnErrorInfo {
                    path: &state.path,
                    kind: state.kind,
                    input: state.input.as_ref(),
                    ctx: state.ctx.as_ref(),
                    req: &parts,
                    error: &error,
                };
                self.options.on_error.on_error(info).await;
                let info = ResponseMetaInfo {
                    path: &state.path,
                    kind: state.kind,
                    ctx: state.ctx.as_ref(),
                    outcome: ResponseOutcome::Error { error: &error },
                };
                let overrides = self.options.response_meta.response_meta(info);
                self.render_error(&error, response_patch, overrides)
            }
        }
    }

    async fn try_handle<B>(
        &self,
        parts: &http::request::Parts,
        body: B,
        state: &mut DispatchState<Ctx>,
        response_patch: &mut ResponsePatch,
    ) -> Result<Value, AdapterError>
    where
        B: AsyncRead + Send + Unpin + 'static,
    {
        let (binding, path_params) = self
            .routes
            .resolve(&parts.method, parts.uri.path())
            .ok_or_else(AdapterError::not_found)?;
        state.kind = Some(binding.def.kind);

        let decoded = decode::decode(binding, path_params, parts, body, self.options.max_body_size).await?;
        state.input = Some(decoded.candidate_input.clone());

        // Context creation precedes input validation: a `BAD_REQUEST` from a
        // rejected input still means `createContext` ran (see the error
        // table's "Context created?" column).
        let ctx = self.options.create_context.create_context(parts, response_patch).await?;
        state.ctx = Some(ctx.clone());

        let input = binding
            .def
            .input_schema
            .validate(decoded.candidate_input)
            .map_err(AdapterError::bad_request)?;

        let output = (binding.def.invoke)(input, ctx)
            .await
            .map_err(AdapterError::from_procedure_failure)?;

        binding
            .def
            .output_schema
            .validate(output)
            .map_err(|_issues| AdapterError::output_validation_failed())
    }

    fn render_success(&self, output: &Value, patch: ResponsePatch, overrides: ResponseMetaOverride) -> http::Response<Vec<u8>> {
        let bytes = match serde_json::to_vec(output) {
            Ok(bytes) => bytes,
            Err(e) => {
                return self.render_error(
                    &AdapterError::internal(format!("failed to serialize output: {}", e)),
                    ResponsePatch::default(),
                    ResponseMetaOverride::default(),
                )
            }
        };
        let status = overrides.status.unwrap_or(200);
        let mut builder = http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json");
        for (name, value) in patch.headers {
            builder = builder.header(name, value);
        }
        for (name, value) in overrides.headers {
            builder = builder.header(name, value);
        }
        builder.body(bytes).unwrap()
    }

    fn render_error(&self, error: &AdapterError, patch: ResponsePatch, overrides: ResponseMetaOverride) -> http::Response<Vec<u8>> {
        let mut body = self.options.error_formatter.format(error, error.to_body());
        // The formatter may enrich `message`/extra fields, but `code` (and
        // the status, below) stay authoritative from the adapter.
        body.code = error.code().to_owned();
        let bytes = serde_json::to_vec(&body).unwrap_or_else(|_| b"{}".to_vec());
        let status = overrides.status.unwrap_or_else(|| error.status());
        let mut builder = http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json");
        for (name, value) in patch.headers {
            builder = builder.header(name, value);
        }
        for (name, value) in overrides.headers {
            builder = builder.header(name, value);
        }
        builder.body(bytes).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedure::{OpenApiMeta, ProcedureDef, ProcedureKind};
    use crate::route::RouteTable;
    use crate::schema::{Issue, Schema};
    use futures::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ObjectSchema;
    impl Schema for ObjectSchema {
        fn validate(&self, value: Value) -> Result<Value, Vec<Issue>> {
            match value.as_object() {
                Some(_) => Ok(value),
                None => Err(vec![Issue::invalid_type(vec![], "object", "other")]),
            }
        }
        fn declares_object_shape(&self) -> bool {
            true
        }
    }

    fn say_hello_table() -> RouteTable<()> {
        RouteTable::construct(vec![ProcedureDef {
            name: "sayHello".to_owned(),
            kind: ProcedureKind::Query,
            meta: OpenApiMeta::new(http::Method::GET, "/say-hello/{name}"),
            input_schema: Arc::new(ObjectSchema),
            output_schema: Arc::new(ObjectSchema),
            invoke: Arc::new(|input, _ctx| {
                Box::pin(async move {
                    let name = input["name"].as_str().unwrap_or_default().to_owned();
                    Ok(serde_json::json!({ "greeting": format!("Hello, {}!", name) }))
                })
            }),
        }])
        .unwrap()
    }

    fn get(path: &str) -> http::Request<Cursor<Vec<u8>>> {
        http::Request::builder()
            .method(http::Method::GET)
            .uri(path)
            .body(Cursor::new(Vec::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn successful_dispatch_returns_200_with_json_body() {
        let dispatcher = Dispatcher::new(say_hello_table(), DispatcherOptions::defaults());
        let response = dispatcher.handle(get("/say-hello/Lily")).await;
        assert_eq!(response.status(), 200);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["greeting"], "Hello, Lily!");
    }

    #[tokio::test]
    async fn unmatched_route_yields_404() {
        let dispatcher = Dispatcher::new(say_hello_table(), DispatcherOptions::defaults());
        let response = dispatcher.handle(get("/nope")).await;
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn head_request_is_always_204_and_fires_no_hooks_even_when_unmatched() {
        let on_error_calls = Arc::new(AtomicUsize::new(0));
        struct CountingOnError(Arc<AtomicUsize>);
        #[async_trait]
        impl OnError<()> for CountingOnError {
            async fn on_error(&self, _info: OnErrorInfo<'_, ()>) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let mut options = DispatcherOptions::<()>::defaults();
        options.on_error = Arc::new(CountingOnError(on_error_calls.clone()));
        let dispatcher = Dispatcher::new(say_hello_table(), options);

        for path in ["/say-hello/Lily", "/totally/unmatched/path"] {
            let head = http::Request::builder()
                .method(http::Method::HEAD)
                .uri(path)
                .body(Cursor::new(Vec::new()))
                .unwrap();
            let response = dispatcher.handle(head).await;
            assert_eq!(response.status(), 204);
            assert!(response.body().is_empty());
        }
        assert_eq!(on_error_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn on_error_fires_exactly_once_on_failure_and_never_on_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        struct CountingOnError(Arc<AtomicUsize>);
        #[async_trait]
        impl OnError<()> for CountingOnError {
            async fn on_error(&self, _info: OnErrorInfo<'_, ()>) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let mut options = DispatcherOptions::<()>::defaults();
        options.on_error = Arc::new(CountingOnError(calls.clone()));
        let dispatcher = Dispatcher::new(say_hello_table(), options);

        dispatcher.handle(get("/say-hello/Lily")).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        dispatcher.handle(get("/nope")).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn on_error_carries_path_and_request_even_for_routing_failures() {
        struct RecordingOnError(Arc<std::sync::Mutex<Vec<String>>>);
        #[async_trait]
        impl OnError<()> for RecordingOnError {
            async fn on_error(&self, info: OnErrorInfo<'_, ()>) {
                self.0.lock().unwrap().push(format!("{} {}", info.req.method, info.path));
            }
        }

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut options = DispatcherOptions::<()>::defaults();
        options.on_error = Arc::new(RecordingOnError(seen.clone()));
        let dispatcher = Dispatcher::new(say_hello_table(), options);

        dispatcher.handle(get("/nope")).await;
        assert_eq!(seen.lock().unwrap()[0], "GET /nope");
    }

    #[tokio::test]
    async fn response_meta_fires_on_both_success_and_error_with_status_override() {
        struct StatusBumper;
        impl ResponseMeta<()> for StatusBumper {
            fn response_meta(&self, info: ResponseMetaInfo<'_, ()>) -> ResponseMetaOverride {
                let status = match info.outcome {
                    ResponseOutcome::Success { .. } => Some(201),
                    ResponseOutcome::Error { .. } => Some(499),
                };
                ResponseMetaOverride { status, headers: Vec::new() }
            }
        }

        let mut options = DispatcherOptions::<()>::defaults();
        options.response_meta = Arc::new(StatusBumper);
        let dispatcher = Dispatcher::new(say_hello_table(), options);

        let ok = dispatcher.handle(get("/say-hello/Lily")).await;
        assert_eq!(ok.status(), 201);

        let err = dispatcher.handle(get("/nope")).await;
        assert_eq!(err.status(), 499);
    }

    #[tokio::test]
    async fn response_meta_sees_kind_and_ctx_only_once_resolved() {
        struct RecordingMeta(Arc<std::sync::Mutex<Vec<(bool, bool)>>>);
        impl ResponseMeta<()> for RecordingMeta {
            fn response_meta(&self, info: ResponseMetaInfo<'_, ()>) -> ResponseMetaOverride {
                self.0.lock().unwrap().push((info.kind.is_some(), info.ctx.is_some()));
                ResponseMetaOverride::default()
            }
        }

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut options = DispatcherOptions::<()>::defaults();
        options.response_meta = Arc::new(RecordingMeta(seen.clone()));
        let dispatcher = Dispatcher::new(say_hello_table(), options);

        dispatcher.handle(get("/nope")).await; // routing failure: neither resolved
        dispatcher.handle(get("/say-hello/Lily")).await; // success: both resolved

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], (false, false));
        assert_eq!(seen[1], (true, true));
    }

    #[tokio::test]
    async fn create_context_can_queue_response_headers_via_the_patch() {
        struct HeaderStampingContext;
        #[async_trait]
        impl CreateContext<()> for HeaderStampingContext {
            async fn create_context(&self, _req: &http::request::Parts, res: &mut ResponsePatch) -> Result<(), AdapterError> {
                res.header(
                    http::HeaderName::from_static("x-request-context"),
                    http::HeaderValue::from_static("stamped"),
                );
                Ok(())
            }
        }

        let mut options = DispatcherOptions::<()>::defaults();
        options.create_context = Arc::new(HeaderStampingContext);
        let dispatcher = Dispatcher::new(say_hello_table(), options);

        let response = dispatcher.handle(get("/say-hello/Lily")).await;
        assert_eq!(response.headers().get("x-request-context").unwrap(), "stamped");
    }
}
