/*
[INPUT]:  JSON control-plane frames (requests, acknowledgements, pings)
[OUTPUT]: Typed request/ack structs and correlation routing
[POS]:    Wire layer - control frame codec
[UPDATE]: When the venue changes the control-plane shape
*/

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Control-plane verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ControlMethod {
    Subscription,
    Unsubscription,
    Ping,
}

/// Outbound control request: `{"id", "method", "params": [topic...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlRequest {
    pub id: u64,
    pub method: ControlMethod,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
}

impl ControlRequest {
    pub fn new(id: u64, method: ControlMethod, params: Vec<String>) -> Self {
        Self { id, method, params }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Inbound acknowledgement: `{"id", "code", "msg"?}`; code 0 is success.
/// `code` is required: an ack without it is malformed, not a success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlAck {
    pub id: u64,
    pub code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl ControlAck {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Routing decision for one JSON control frame
#[derive(Debug, Clone)]
pub enum ControlRoute {
    /// Carries an integer correlation id, belongs to the correlator
    Ack(ControlAck),
    /// Valid JSON without a correlation id; surfaced as an unhandled event
    Unrouted,
}

/// Classify a JSON control frame. A frame is routable to the correlator
/// iff it carries an integer `id` field.
pub fn route_control(bytes: &[u8]) -> Result<ControlRoute> {
    let value: Value = serde_json::from_slice(bytes)?;
    if value.get("id").and_then(Value::as_u64).is_none() {
        return Ok(ControlRoute::Unrouted);
    }
    let ack: ControlAck = serde_json::from_value(value)?;
    Ok(ControlRoute::Ack(ack))
}
