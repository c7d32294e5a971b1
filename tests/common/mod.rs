#![allow(dead_code)]

pub mod payloads {
    use serde_json::Value;

    pub const APIGATEWAY_REST: &str = include_str!("../testpayloads/apigateway_rest.json");
    pub const APIGATEWAY_V2: &str = include_str!("../testpayloads/apigateway_v2.json");
    pub const ALB_TARGET_GROUP: &str = include_str!("../testpayloads/alb_target_group.json");
    pub const UNKNOWN: &str = include_str!("../testpayloads/unknown.json");

    /// All known-format fixtures with a label for assertion messages.
    pub const ALL: [(&str, &str); 3] = [
        ("apigateway_rest", APIGATEWAY_REST),
        ("apigateway_v2", APIGATEWAY_V2),
        ("alb_target_group", ALB_TARGET_GROUP),
    ];

    pub fn parse(payload: &str) -> Value {
        serde_json::from_str(payload).unwrap()
    }

    /// Fixture with a JSON pointer replaced, for building edge cases.
    pub fn with(payload: &str, pointer: &str, value: Value) -> Value {
        let mut parsed = parse(payload);
        *parsed.pointer_mut(pointer).unwrap() = value;
        parsed
    }
}

pub mod bridge {
    use httpbridge::runtime_config::BridgeConfig;
    use httpbridge::{Bridge, Format, Handler};
    use serde_json::Value;

    pub fn invoke<H: Handler>(handler: H, payload: &Value) -> Value {
        let bridge = Bridge::with_config(handler, BridgeConfig::default());
        let reply = bridge.invoke(&serde_json::to_vec(payload).unwrap());
        serde_json::from_slice(&reply).unwrap()
    }

    /// Invoke with the format fixed up front, skipping detection.
    pub fn invoke_as<H: Handler>(handler: H, format: Format, payload: &[u8]) -> Value {
        let bridge = Bridge::with_config(handler, BridgeConfig::default());
        serde_json::from_slice(&bridge.invoke_as(format, payload)).unwrap()
    }
}
