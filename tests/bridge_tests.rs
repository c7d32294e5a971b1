//! End-to-end invocation tests: payload in, reply envelope out.

mod common;

use common::bridge::{invoke, invoke_as};
use common::payloads::{self, ALB_TARGET_GROUP, APIGATEWAY_REST, APIGATEWAY_V2, UNKNOWN};
use http::header::{HeaderValue, CONTENT_TYPE, SET_COOKIE};
use http::StatusCode;
use httpbridge::{CanonicalRequest, Format, ResponseWriter};
use serde_json::{json, Value};
use std::io::Read;

fn write_ok(_req: CanonicalRequest, w: &mut dyn ResponseWriter) {
    w.write_status(StatusCode::OK);
}

fn write_goodbye(_req: CanonicalRequest, w: &mut dyn ResponseWriter) {
    w.write(br#"{"goodbye":"world"}"#);
}

#[test]
fn test_v2_status_only_scenario() {
    let reply = invoke(write_ok, &payloads::parse(APIGATEWAY_V2));
    assert_eq!(
        reply,
        json!({
            "statusCode": 200,
            "headers": {},
            "cookies": [],
            "body": "",
            "isBase64Encoded": false
        })
    );
}

#[test]
fn test_alb_body_without_status_scenario() {
    let reply = invoke(write_goodbye, &payloads::parse(ALB_TARGET_GROUP));
    assert_eq!(reply["statusCode"], json!(200));
    assert_eq!(reply["statusDescription"], json!("200 OK"));
    assert_eq!(reply["body"], json!(r#"{"goodbye":"world"}"#));
    assert_eq!(reply["isBase64Encoded"], json!(false));
    assert_eq!(
        reply["headers"]["Content-Type"],
        json!("text/plain; charset=utf-8")
    );
}

#[test]
fn test_rest_api_status_only() {
    let reply = invoke(write_ok, &payloads::parse(APIGATEWAY_REST));
    assert_eq!(
        reply,
        json!({
            "statusCode": 200,
            "headers": {},
            "multiValueHeaders": {},
            "body": "",
            "isBase64Encoded": false
        })
    );
}

#[test]
fn test_malformed_path_returns_lcd_500() {
    let payload = payloads::with(APIGATEWAY_REST, "/path", json!("/bad%zzpath"));
    let reply = invoke(write_goodbye, &payload);
    let body = reply["body"].as_str().unwrap();
    assert_eq!(reply["statusCode"], json!(500));
    assert_eq!(reply["isBase64Encoded"], json!(false));
    assert!(body.contains("invalid URL escape \"%zz\""), "{body}");
    assert_eq!(reply.as_object().unwrap().len(), 3);
}

#[test]
fn test_unknown_payload_returns_lcd_500() {
    let reply = invoke(write_goodbye, &payloads::parse(UNKNOWN));
    assert_eq!(reply["statusCode"], json!(500));
    assert_eq!(reply.as_object().unwrap().len(), 3);
}

#[test]
fn test_round_trip_preserves_status_and_body() {
    let statuses = [
        StatusCode::OK,
        StatusCode::CREATED,
        StatusCode::NOT_FOUND,
        StatusCode::SERVICE_UNAVAILABLE,
    ];
    for (label, payload) in payloads::ALL {
        for status in statuses {
            let body = format!("status {} from {label}", status.as_u16());
            let expected_body = body.clone();
            let reply = invoke(
                move |_req: CanonicalRequest, w: &mut dyn ResponseWriter| {
                    w.write_status(status);
                    w.write(body.as_bytes());
                },
                &payloads::parse(payload),
            );
            assert_eq!(reply["statusCode"], json!(status.as_u16()), "{label}");
            assert_eq!(reply["body"], json!(expected_body), "{label}");
        }
    }
}

#[test]
fn test_round_trip_binary_body() {
    let bytes: Vec<u8> = (0..=255u8).collect();
    for (label, payload) in payloads::ALL {
        let body = bytes.clone();
        let reply = invoke(
            move |_req: CanonicalRequest, w: &mut dyn ResponseWriter| {
                w.headers_mut().insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/octet-stream"),
                );
                w.write(&body);
            },
            &payloads::parse(payload),
        );
        assert_eq!(reply["isBase64Encoded"], json!(true), "{label}");
        use base64::Engine as _;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(reply["body"].as_str().unwrap())
            .unwrap();
        assert_eq!(decoded, bytes, "{label}");
    }
}

#[test]
fn test_base64_flag_iff_octet_stream() {
    let cases = [
        (Some("application/octet-stream"), true),
        (Some("application/octet-stream; charset=binary"), false),
        (Some("image/png"), false),
        (Some("application/json"), false),
        (None, false),
    ];
    for (label, payload) in payloads::ALL {
        for (content_type, expected) in cases {
            let reply = invoke(
                move |_req: CanonicalRequest, w: &mut dyn ResponseWriter| {
                    if let Some(ct) = content_type {
                        w.headers_mut()
                            .insert(CONTENT_TYPE, HeaderValue::from_static(ct));
                    }
                    w.write(b"payload");
                },
                &payloads::parse(payload),
            );
            assert_eq!(
                reply["isBase64Encoded"],
                json!(expected),
                "{label} {content_type:?}"
            );
        }
    }
}

#[test]
fn test_sniffed_octet_stream_is_base64() {
    // Unrecognized binary bytes sniff as application/octet-stream.
    let reply = invoke(
        |_req: CanonicalRequest, w: &mut dyn ResponseWriter| {
            w.write(&[0x01, 0x02, 0x03]);
        },
        &payloads::parse(APIGATEWAY_REST),
    );
    assert_eq!(reply["headers"]["Content-Type"], json!("application/octet-stream"));
    assert_eq!(reply["isBase64Encoded"], json!(true));
    assert_eq!(reply["body"], json!("AQID"));
}

fn assert_header_placement(reply: &Value, label: &str) {
    let single = reply["headers"].as_object().unwrap();
    let multi = reply["multiValueHeaders"].as_object().unwrap();
    for (key, values) in multi {
        assert!(!single.contains_key(key), "{label}: {key} in both maps");
        assert!(
            values.as_array().unwrap().len() > 1,
            "{label}: {key} single value in multiValueHeaders"
        );
    }
}

#[test]
fn test_header_placement_invariant() {
    for (label, payload) in [
        ("apigateway_rest", APIGATEWAY_REST),
        ("alb_target_group", ALB_TARGET_GROUP),
    ] {
        for n in 1..=4usize {
            let reply = invoke(
                move |_req: CanonicalRequest, w: &mut dyn ResponseWriter| {
                    for i in 0..n {
                        w.headers_mut()
                            .append("x-count", HeaderValue::from(i as u64));
                    }
                    w.headers_mut()
                        .insert("x-single", HeaderValue::from_static("one"));
                    w.write_status(StatusCode::OK);
                },
                &payloads::parse(payload),
            );
            assert_header_placement(&reply, label);
            if n == 1 {
                assert_eq!(reply["headers"]["X-Count"], json!("0"));
                assert!(reply["multiValueHeaders"].get("X-Count").is_none());
            } else {
                assert_eq!(
                    reply["multiValueHeaders"]["X-Count"].as_array().unwrap().len(),
                    n
                );
                assert!(reply["headers"].get("X-Count").is_none());
            }
            assert_eq!(reply["headers"]["X-Single"], json!("one"));
        }
    }
}

fn set_cookies(_req: CanonicalRequest, w: &mut dyn ResponseWriter) {
    w.headers_mut()
        .append(SET_COOKIE, HeaderValue::from_static("session=abc; HttpOnly"));
    w.headers_mut()
        .append(SET_COOKIE, HeaderValue::from_static("theme=dark"));
    w.write_status(StatusCode::OK);
}

#[test]
fn test_v2_moves_set_cookie_to_cookies() {
    let reply = invoke(set_cookies, &payloads::parse(APIGATEWAY_V2));
    assert_eq!(
        reply["cookies"],
        json!(["session=abc; HttpOnly", "theme=dark"])
    );
    assert!(reply["headers"].get("Set-Cookie").is_none());
}

#[test]
fn test_v1_and_alb_keep_set_cookie_in_multi_value_headers() {
    for payload in [APIGATEWAY_REST, ALB_TARGET_GROUP] {
        let reply = invoke(set_cookies, &payloads::parse(payload));
        assert_eq!(
            reply["multiValueHeaders"]["Set-Cookie"],
            json!(["session=abc; HttpOnly", "theme=dark"])
        );
        assert!(reply.get("cookies").is_none());
    }
}

#[test]
fn test_status_is_write_once_through_bridge() {
    let reply = invoke(
        |_req: CanonicalRequest, w: &mut dyn ResponseWriter| {
            w.write(b"first");
            w.write_status(StatusCode::INTERNAL_SERVER_ERROR);
            w.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
            w.write(b" second");
        },
        &payloads::parse(APIGATEWAY_V2),
    );
    assert_eq!(reply["statusCode"], json!(200));
    assert_eq!(reply["body"], json!("first second"));
    // Headers stay mutable; only the sniffed decision is one-shot.
    assert_eq!(reply["headers"]["Content-Type"], json!("text/html"));
}

#[test]
fn test_handler_reads_decoded_body() {
    let reply = invoke(
        |mut req: CanonicalRequest, w: &mut dyn ResponseWriter| {
            let mut body = String::new();
            req.body.read_to_string(&mut body).unwrap();
            w.write(body.to_uppercase().as_bytes());
        },
        &payloads::parse(APIGATEWAY_V2),
    );
    assert_eq!(reply["body"], json!(r#"{"TEST":"BODY"}"#));
}

const FIXED_FORMATS: [(Format, &str); 3] = [
    (Format::GatewayV1, APIGATEWAY_REST),
    (Format::GatewayV2, APIGATEWAY_V2),
    (Format::LoadBalancer, ALB_TARGET_GROUP),
];

#[test]
fn test_invoke_as_serves_each_format() {
    for (format, payload) in FIXED_FORMATS {
        let reply = invoke_as(write_goodbye, format, payload.as_bytes());
        assert_eq!(reply["statusCode"], json!(200), "{format}");
        assert_eq!(reply["body"], json!(r#"{"goodbye":"world"}"#), "{format}");
        assert_eq!(
            reply.get("cookies").is_some(),
            format == Format::GatewayV2,
            "{format}"
        );
        assert_eq!(
            reply.get("statusDescription").is_some(),
            format == Format::LoadBalancer,
            "{format}"
        );
    }
}

#[test]
fn test_invoke_as_skips_detection() {
    // No markers at all: detection would reject this payload.
    let reply = invoke_as(
        |req: CanonicalRequest, w: &mut dyn ResponseWriter| {
            w.write(req.path.as_bytes());
        },
        Format::LoadBalancer,
        UNKNOWN.as_bytes(),
    );
    assert_eq!(reply["statusCode"], json!(200));
    assert_eq!(reply["statusDescription"], json!("200 OK"));
}

#[test]
fn test_invoke_as_failures_use_format_envelope() {
    for (format, payload) in FIXED_FORMATS {
        let pointer = if format == Format::GatewayV2 { "/rawPath" } else { "/path" };
        let bad = payloads::with(payload, pointer, json!("/bad%zzpath"));
        let reply = invoke_as(write_goodbye, format, &serde_json::to_vec(&bad).unwrap());
        assert_eq!(reply["statusCode"], json!(500), "{format}");
        assert_eq!(reply["isBase64Encoded"], json!(false), "{format}");
        assert_eq!(reply["headers"], json!({}), "{format}");
        assert!(
            reply["body"].as_str().unwrap().contains("%zz"),
            "{format}: {reply}"
        );
        match format {
            Format::GatewayV1 => assert_eq!(reply["multiValueHeaders"], json!({})),
            Format::GatewayV2 => assert_eq!(reply["cookies"], json!([])),
            Format::LoadBalancer => {
                assert_eq!(reply["statusDescription"], json!("500 Internal Server Error"))
            }
        }
    }
}
