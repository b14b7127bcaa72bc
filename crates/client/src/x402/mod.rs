//! x402 payment challenges.
//!
//! The scraping API answers with a "payment required" body instead of content
//! when a resource has to be paid for first:
//!
//! ```json
//! { "x402Version": 1, "accepts": [{ "resource": "https://api.example.com/links?url=..." }] }
//! ```
//!
//! ### Detection
//! - A body is a challenge iff it is a JSON object whose `x402Version` and
//!   `accepts` fields are both truthy.
//! - Truthiness follows the wire protocol's JavaScript heritage: `null`,
//!   `false`, `0` and `""` are falsy, every array and object is truthy.
//!
//! ### Payment
//! - The first accepted option's `resource` is the chargeable URL.
//! - [`PaymentExecutor`] settles it through the API's payment side-channel.

pub mod error;
pub mod payment;

pub use error::PaymentError;
pub use payment::PaymentExecutor;

use serde::Serialize;
use serde_json::Value;

/// Field carrying the protocol version marker.
const VERSION_FIELD: &str = "x402Version";

/// Field carrying the acceptable payment options.
const ACCEPTS_FIELD: &str = "accepts";

/// Returns true iff `value` is shaped like a payment challenge.
///
/// Never fails: missing fields and non-object values are simply not challenges.
pub fn is_payment_required(value: &Value) -> bool {
    value.as_object().is_some_and(|obj| {
        obj.get(VERSION_FIELD).is_some_and(is_truthy) && obj.get(ACCEPTS_FIELD).is_some_and(is_truthy)
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A response body that demands payment before content is served.
///
/// Only constructible from a value that passes [`is_payment_required`], and
/// serializes back to exactly that value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PaymentChallenge(Value);

impl PaymentChallenge {
    /// Classify a response body, handing it back unchanged when it is not a challenge.
    pub fn from_value(value: Value) -> Result<Self, Value> {
        if is_payment_required(&value) { Ok(Self(value)) } else { Err(value) }
    }

    /// Protocol version marker.
    pub fn version(&self) -> &Value {
        &self.0[VERSION_FIELD]
    }

    /// Acceptable payment options, in the order the API listed them.
    pub fn accepts(&self) -> &Value {
        &self.0[ACCEPTS_FIELD]
    }

    /// Chargeable resource URL of the first accepted option, if present and non-empty.
    pub fn resource(&self) -> Option<&str> {
        self.accepts()
            .get(0)?
            .get("resource")?
            .as_str()
            .filter(|resource| !resource.is_empty())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}
