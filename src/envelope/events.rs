//! Wire shapes of the three inbound Lambda event envelopes.
//!
//! Only the fields the canonicalizer reads (plus a few used for log correlation) are
//! modelled. Unknown fields are ignored; map and string fields tolerate explicit `null`,
//! which API Gateway emits for absent query strings and headers.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Single-value string map (`headers`, `queryStringParameters`)
pub type StringMap = HashMap<String, String>;
/// Multi-value string map (`multiValueHeaders`, `multiValueQueryStringParameters`)
pub type MultiStringMap = HashMap<String, Vec<String>>;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// API Gateway REST API proxy integration event (payload format 1.0).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayV1Request {
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub http_method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: StringMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub multi_value_headers: MultiStringMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub query_string_parameters: StringMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub multi_value_query_string_parameters: MultiStringMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path_parameters: StringMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage_variables: StringMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_context: GatewayV1RequestContext,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayV1RequestContext {
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub identity: GatewayV1Identity,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayV1Identity {
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_ip: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_agent: String,
}

/// API Gateway HTTP API event (payload format 2.0).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayV2Request {
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub route_key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub raw_path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub raw_query_string: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cookies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: StringMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub query_string_parameters: StringMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path_parameters: StringMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage_variables: StringMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_context: GatewayV2RequestContext,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayV2RequestContext {
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub http: GatewayV2HttpDescription,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayV2HttpDescription {
    #[serde(default, deserialize_with = "null_as_default")]
    pub method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub protocol: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_ip: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_agent: String,
}

/// Application Load Balancer target-group event.
///
/// ALB sends either `headers`/`queryStringParameters` or their multi-value
/// counterparts depending on the target group's multi-value setting.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub http_method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub query_string_parameters: StringMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub multi_value_query_string_parameters: MultiStringMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: StringMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub multi_value_headers: MultiStringMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_context: LoadBalancerRequestContext,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadBalancerRequestContext {
    #[serde(default, deserialize_with = "null_as_default")]
    pub elb: LoadBalancerElbContext,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerElbContext {
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_group_arn: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_maps_deserialize_as_empty() {
        let req: GatewayV1Request = serde_json::from_value(json!({
            "path": "/x",
            "headers": null,
            "multiValueQueryStringParameters": null,
            "body": null,
            "isBase64Encoded": false
        }))
        .unwrap();
        assert!(req.headers.is_empty());
        assert!(req.multi_value_query_string_parameters.is_empty());
        assert_eq!(req.body, "");
    }

    #[test]
    fn test_v2_http_description() {
        let req: GatewayV2Request = serde_json::from_value(json!({
            "version": "2.0",
            "rawPath": "/a",
            "requestContext": {"http": {"method": "POST", "sourceIp": "10.0.0.1"}}
        }))
        .unwrap();
        assert_eq!(req.request_context.http.method, "POST");
        assert_eq!(req.request_context.http.source_ip, "10.0.0.1");
    }

    #[test]
    fn test_null_request_context_deserializes_as_default() {
        let req: LoadBalancerRequest = serde_json::from_value(json!({
            "path": "/lb",
            "requestContext": null
        }))
        .unwrap();
        assert_eq!(req.request_context.elb.target_group_arn, "");

        let req: GatewayV1Request = serde_json::from_value(json!({
            "path": "/v1",
            "requestContext": {"accountId": "123456789012", "identity": null}
        }))
        .unwrap();
        assert_eq!(req.request_context.identity.source_ip, "");
    }
}
