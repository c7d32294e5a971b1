use serde::Serialize;
use std::collections::BTreeMap;

/// API Gateway REST API proxy integration response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayV1Response {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub multi_value_headers: BTreeMap<String, Vec<String>>,
    pub body: String,
    pub is_base64_encoded: bool,
}

/// API Gateway HTTP API (payload format 2.0) response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayV2Response {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub cookies: Vec<String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

/// ALB target-group response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerResponse {
    pub status_code: u16,
    pub status_description: String,
    pub headers: BTreeMap<String, String>,
    pub multi_value_headers: BTreeMap<String, Vec<String>>,
    pub body: String,
    pub is_base64_encoded: bool,
}

/// Minimal shape every front end accepts; used when the format is unknown or a
/// stage failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeastCommonDenominatorResponse {
    pub status_code: u16,
    pub body: String,
    pub is_base64_encoded: bool,
}
