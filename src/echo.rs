use crate::request::CanonicalRequest;
use crate::response::ResponseWriter;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use serde_json::{json, Map, Value};
use std::io::Read;

/// Example handler: echoes the canonical request back as JSON.
///
/// Used by the CLI to show what a handler would see for a given payload.
pub fn echo_handler(mut req: CanonicalRequest, w: &mut dyn ResponseWriter) {
    let mut raw = Vec::new();
    let body = match req.body.read_to_end(&mut raw) {
        Ok(_) => Value::String(String::from_utf8_lossy(&raw).into_owned()),
        Err(e) => {
            w.write_status(StatusCode::BAD_REQUEST);
            json!({ "error": format!("failed to read request body: {e}") })
        }
    };

    let mut headers = Map::new();
    for name in req.headers.keys() {
        let values: Vec<Value> = req
            .headers
            .get_all(name)
            .iter()
            .map(|v| Value::String(String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        headers.insert(name.as_str().to_string(), Value::Array(values));
    }

    let host = req.host().map(str::to_string);
    let response = json!({
        "method": req.method.as_str(),
        "path": &req.path,
        "query": &req.raw_query,
        "host": host,
        "remote_addr": &req.remote_addr,
        "headers": headers,
        "body": body,
        "invocation_id": req.context.invocation_id,
        "upstream_request_id": &req.context.upstream_request_id,
    });

    w.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    w.write(response.to_string().as_bytes());
}
