//! # CLI Module
//!
//! Local tooling for trying payloads against the bridge without deploying.
//!
//! ## Commands
//!
//! ### `invoke`
//!
//! Run a payload through the bridge with the built-in echo handler and print the
//! reply envelope:
//!
//! ```bash
//! httpbridge invoke --payload tests/testpayloads/alb_target_group.json --pretty
//! ```
//!
//! ### `classify`
//!
//! Print the detected envelope format (`apigateway_v1`, `apigateway_v2`, `alb`):
//!
//! ```bash
//! cat event.json | httpbridge classify
//! ```
//!
//! Logging follows the `HTTPBRIDGE_LOG_*` variables; `--log-level` overrides the level.

mod commands;


pub use commands::{run_cli, run_command, Cli, Commands};
