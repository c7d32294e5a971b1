use crate::envelope::events::{MultiStringMap, StringMap};
use crate::envelope::{GatewayV1Request, GatewayV2Request, LambdaRequest, LoadBalancerRequest};
use crate::error::BridgeError;
use crate::request::canonical::{Body, CanonicalRequest, InvocationContext};
use crate::request::escape::unescape_path;
use http::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use http::Method;
use std::collections::BTreeMap;
use tracing::debug;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

fn header_name(name: &str) -> Result<HeaderName, BridgeError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| BridgeError::MalformedRequest(format!("invalid header name {name:?}: {e}")))
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, BridgeError> {
    HeaderValue::from_str(value).map_err(|e| {
        BridgeError::MalformedRequest(format!("invalid value for header {name:?}: {e}"))
    })
}

/// Merge single- and multi-value header maps.
///
/// For a key present in both, the multi-value entry replaces the single value.
pub(crate) fn merge_headers(
    single: &StringMap,
    multi: &MultiStringMap,
) -> Result<HeaderMap, BridgeError> {
    let mut headers = HeaderMap::with_capacity(single.len() + multi.len());
    for (name, value) in single {
        headers.append(header_name(name)?, header_value(name, value)?);
    }
    for (name, values) in multi {
        let key = header_name(name)?;
        headers.remove(&key);
        for value in values {
            headers.append(key.clone(), header_value(name, value)?);
        }
    }
    Ok(headers)
}

/// Form-encode the union of single- and multi-value query parameters.
///
/// Keys are emitted in sorted order; a key in both maps contributes only its
/// multi-value entries.
pub(crate) fn encode_query(single: &StringMap, multi: &MultiStringMap) -> String {
    let mut params: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (key, value) in single {
        if !multi.contains_key(key) {
            params.entry(key.as_str()).or_default().push(value.as_str());
        }
    }
    for (key, values) in multi {
        params
            .entry(key.as_str())
            .or_default()
            .extend(values.iter().map(String::as_str));
    }

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, values) in params {
        for value in values {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}

fn parse_method(method: &str) -> Result<Method, BridgeError> {
    if method.is_empty() {
        return Ok(Method::GET);
    }
    Method::from_bytes(method.as_bytes())
        .map_err(|e| BridgeError::MalformedRequest(format!("invalid HTTP method {method:?}: {e}")))
}

fn canonical_path(raw: &str) -> Result<String, BridgeError> {
    let path = unescape_path(raw)?;
    if path.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(path)
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// First address of the first `X-Forwarded-For` value.
fn forwarded_for(headers: &HeaderMap) -> String {
    headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .unwrap_or_default()
}

impl LambdaRequest {
    /// Convert the classified envelope into a [`CanonicalRequest`].
    pub fn canonicalize(self, ctx: InvocationContext) -> Result<CanonicalRequest, BridgeError> {
        let req = match self {
            LambdaRequest::GatewayV1(r) => canonicalize_gateway_v1(r, ctx),
            LambdaRequest::GatewayV2(r) => canonicalize_gateway_v2(r, ctx),
            LambdaRequest::LoadBalancer(r) => canonicalize_load_balancer(r, ctx),
        }?;

        debug!(
            method = %req.method,
            path = %req.path,
            query = %req.raw_query,
            header_count = req.headers.len(),
            remote_addr = %req.remote_addr,
            base64_body = req.body.is_base64(),
            "Request canonicalized"
        );
        Ok(req)
    }
}

fn canonicalize_gateway_v1(
    r: GatewayV1Request,
    mut ctx: InvocationContext,
) -> Result<CanonicalRequest, BridgeError> {
    let raw_query = encode_query(
        &r.query_string_parameters,
        &r.multi_value_query_string_parameters,
    );
    let headers = merge_headers(&r.headers, &r.multi_value_headers)?;
    let path = canonical_path(&r.path)?;
    ctx.upstream_request_id = non_empty(r.request_context.request_id);

    Ok(CanonicalRequest {
        method: parse_method(&r.http_method)?,
        path,
        raw_query,
        headers,
        remote_addr: r.request_context.identity.source_ip,
        body: Body::from_envelope(r.body, r.is_base64_encoded),
        context: ctx,
    })
}

fn canonicalize_gateway_v2(
    r: GatewayV2Request,
    mut ctx: InvocationContext,
) -> Result<CanonicalRequest, BridgeError> {
    let raw_query = if r.raw_query_string.is_empty() {
        encode_query(&r.query_string_parameters, &MultiStringMap::new())
    } else {
        r.raw_query_string
    };

    let mut headers = merge_headers(&r.headers, &MultiStringMap::new())?;
    // HTTP API strips the Cookie header into a separate array.
    if !r.cookies.is_empty() && !headers.contains_key(COOKIE) {
        let joined = r.cookies.join("; ");
        headers.insert(COOKIE, header_value("cookie", &joined)?);
    }

    let path = canonical_path(&r.raw_path)?;
    ctx.upstream_request_id = non_empty(r.request_context.request_id);
    let http_ctx = r.request_context.http;

    Ok(CanonicalRequest {
        method: parse_method(&http_ctx.method)?,
        path,
        raw_query,
        headers,
        remote_addr: http_ctx.source_ip,
        body: Body::from_envelope(r.body, r.is_base64_encoded),
        context: ctx,
    })
}

fn canonicalize_load_balancer(
    r: LoadBalancerRequest,
    ctx: InvocationContext,
) -> Result<CanonicalRequest, BridgeError> {
    let raw_query = encode_query(
        &r.query_string_parameters,
        &r.multi_value_query_string_parameters,
    );
    let headers = merge_headers(&r.headers, &r.multi_value_headers)?;
    let path = canonical_path(&r.path)?;
    let remote_addr = forwarded_for(&headers);

    Ok(CanonicalRequest {
        method: parse_method(&r.http_method)?,
        path,
        raw_query,
        headers,
        remote_addr,
        body: Body::from_envelope(r.body, r.is_base64_encoded),
        context: ctx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> StringMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn multi(pairs: &[(&str, &[&str])]) -> MultiStringMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_multi_value_headers_replace_single() {
        let headers = merge_headers(
            &map(&[("Accept", "text/html"), ("Host", "example.com")]),
            &multi(&[("Accept", &["application/json", "text/plain"])]),
        )
        .unwrap();
        let accept: Vec<_> = headers.get_all("accept").iter().collect();
        assert_eq!(accept, vec!["application/json", "text/plain"]);
        assert_eq!(headers.get("host").unwrap(), "example.com");
    }

    #[test]
    fn test_invalid_header_name_is_malformed() {
        let err = merge_headers(&map(&[("bad header", "x")]), &MultiStringMap::new()).unwrap_err();
        assert!(matches!(err, BridgeError::MalformedRequest(_)));
    }

    #[test]
    fn test_encode_query_union_sorted() {
        let q = encode_query(
            &map(&[("b", "2"), ("a", "x y"), ("c", "single")]),
            &multi(&[("c", &["1", "2"])]),
        );
        assert_eq!(q, "a=x+y&b=2&c=1&c=2");
    }

    #[test]
    fn test_forwarded_for_first_address() {
        let headers = merge_headers(
            &StringMap::new(),
            &multi(&[("x-forwarded-for", &["203.0.113.7, 10.0.0.1", "10.0.0.2"])]),
        )
        .unwrap();
        assert_eq!(forwarded_for(&headers), "203.0.113.7");
        assert_eq!(forwarded_for(&HeaderMap::new()), "");
    }

    #[test]
    fn test_empty_method_defaults_to_get() {
        assert_eq!(parse_method("").unwrap(), Method::GET);
        assert_eq!(parse_method("PATCH").unwrap(), Method::PATCH);
        assert!(parse_method("BAD METHOD").is_err());
    }

    #[test]
    fn test_v2_cookies_become_cookie_header() {
        let req = GatewayV2Request {
            version: "2.0".to_string(),
            raw_path: "/".to_string(),
            cookies: vec!["a=1".to_string(), "b=2".to_string()],
            ..Default::default()
        };
        let canonical = LambdaRequest::GatewayV2(req)
            .canonicalize(InvocationContext::new())
            .unwrap();
        assert_eq!(canonical.header("cookie"), Some("a=1; b=2"));
    }
}
