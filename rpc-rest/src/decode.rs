//! The request decoder: turns an incoming request's path params, query
//! string, and (for methods that carry one) streamed body into the single
//! JSON value a procedure's input schema validates, or a terminal
//! [`AdapterError`] before the procedure or its context is ever touched.

use crate::error::AdapterError;
use crate::route::Binding;
use crate::schema::coerce_url_leaves;
use crate::stream::{CappedAsyncRead, LIMIT_EXCEEDED};
use futures::io::{AsyncRead, AsyncReadExt};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// The decoded candidate input for one request, plus the bookkeeping the
/// dispatcher needs to finish the job (coercion keys).
pub struct DecodedRequest<'a, Ctx> {
    pub binding: &'a Binding<Ctx>,
    pub candidate_input: Value,
    pub url_keys: HashSet<String>,
}

/// Decode `body` against `binding`'s path params, query string, and (for
/// methods that carry one) request body, composing the candidate input
/// object per stage E: query keys first, then path params, then body keys,
/// each later source overriding an earlier one at the same key.
///
/// `parts` supplies the method, URI, and headers; `body` is read
/// incrementally through a [`CappedAsyncRead`] so that a body exceeding
/// `max_body_size` aborts ingestion mid-stream rather than after it has
/// already been buffered in full. `max_body_size = None` means unlimited.
pub async fn decode<'a, Ctx, B>(
    binding: &'a Binding<Ctx>,
    path_params: HashMap<String, String>,
    parts: &http::request::Parts,
    body: B,
    max_body_size: Option<usize>,
) -> Result<DecodedRequest<'a, Ctx>, AdapterError>
where
    B: AsyncRead + Unpin,
{
    // A "void" input schema skips composition entirely (stage E): the
    // candidate input it sees is the absence-of-value, no matter what the
    // caller put on the query string or path. Stages C and D -- the
    // content-type gate, the payload-size cap, and JSON parsing -- still
    // run unconditionally, since those failure modes don't depend on
    // whether the body ends up merged anywhere.
    let is_void = binding.def.input_schema.is_void();

    let mut url_keys: HashSet<String> = HashSet::new();
    let mut object = Map::new();

    // Query string first (lowest priority): multi-value keys become arrays.
    if let Some(query) = parts.uri.query() {
        for (key, value) in parse_query_multi(query) {
            url_keys.insert(key.clone());
            if !is_void {
                object.insert(key, value);
            }
        }
    }

    // Path params next: always override a same-named query key.
    for (key, value) in path_params {
        url_keys.insert(key.clone());
        if !is_void {
            object.insert(key, Value::String(value));
        }
    }

    // Body last (highest priority), only for methods that carry one. The
    // content-type gate runs before a single byte of the body is read, and
    // bodies on GET/DELETE are never touched at all.
    if method_expects_body(&parts.method) {
        let content_type = content_type_header(parts);
        let accepted = &binding.def.meta.content_types;
        let normalized = content_type
            .as_deref()
            .map(normalize_content_type)
            .unwrap_or_default();
        // `application/json` is the only content-type this decoder actually
        // understands: a binding declaring some other accepted type still
        // gets rejected here, since the adapter has nothing to decode that
        // body with.
        let accepted_and_understood =
            normalized == "application/json" && accepted.iter().any(|c| c == &normalized);
        if !accepted_and_understood {
            return Err(AdapterError::unsupported_media_type(
                content_type.as_deref().unwrap_or(""),
            ));
        }

        let bytes = read_capped(body, max_body_size).await?;
        if !bytes.is_empty() {
            let body_value: Value = serde_json::from_slice(&bytes)
                .map_err(|e| AdapterError::internal(format!("invalid JSON body: {}", e)))?;
            if !is_void {
                if let Value::Object(body_map) = body_value {
                    for (key, value) in body_map {
                        object.insert(key, value);
                    }
                } else {
                    // A non-object JSON body (e.g. a bare array or scalar) can't
                    // be merged into the candidate input object; let the input
                    // schema reject it on its own terms instead of merging.
                    object.insert("__body".to_owned(), body_value);
                }
            }
        }
    }

    let mut candidate_input = if is_void { Value::Null } else { Value::Object(object) };
    if !is_void {
        coerce_url_leaves(binding.def.input_schema.as_ref(), &mut candidate_input, &url_keys);
    }

    Ok(DecodedRequest {
        binding,
        candidate_input,
        url_keys,
    })
}

/// Read `body` to completion through a byte-capped reader, aborting
/// ingestion as soon as the cap is crossed (`PAYLOAD_TOO_LARGE`) rather than
/// buffering the rest of the stream first. Any other I/O failure is an
/// `INTERNAL_SERVER_ERROR`.
async fn read_capped<B: AsyncRead + Unpin>(body: B, max_body_size: Option<usize>) -> Result<Vec<u8>, AdapterError> {
    let mut capped = CappedAsyncRead::new(body, max_body_size);
    let mut bytes = Vec::new();
    match capped.read_to_end(&mut bytes).await {
        Ok(_) => Ok(bytes),
        Err(e) if e.to_string() == LIMIT_EXCEEDED => Err(AdapterError::payload_too_large()),
        Err(e) => Err(AdapterError::internal(format!("failed to read request body: {}", e))),
    }
}

fn method_expects_body(method: &http::Method) -> bool {
    matches!(*method, http::Method::POST | http::Method::PUT | http::Method::PATCH)
}

fn content_type_header(parts: &http::request::Parts) -> Option<String> {
    parts
        .headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_owned())
}

/// The raw `Content-Type` value, trimmed and lowercased, with any `;
/// charset=...` parameters dropped.
fn normalize_content_type(raw: &str) -> String {
    raw.split(';').next().unwrap_or("").trim().to_lowercase()
}

/// Parse a query string into key/value pairs, folding repeated keys into a
/// JSON array in encounter order.
fn parse_query_multi(query: &str) -> Vec<(String, Value)> {
    let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query) {
        Ok(pairs) => pairs,
        Err(_) => return Vec::new(),
    };

    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in pairs {
        if !grouped.contains_key(&key) {
            order.push(key.clone());
        }
        grouped.entry(key).or_insert_with(Vec::new).push(value);
    }

    order
        .into_iter()
        .map(|key| {
            let mut values = grouped.remove(&key).unwrap();
            let value = if values.len() == 1 {
                Value::String(values.pop().unwrap())
            } else {
                Value::Array(values.into_iter().map(Value::String).collect())
            };
            (key, value)
        })
        .collect()
}
