/*
[INPUT]:  Raw transport frames, mixed JSON and binary
[OUTPUT]: Classified, decoded control and push frames
[POS]:    Wire layer - codecs for both frame families
[UPDATE]: When the venue wire format changes
*/

pub mod control;
pub mod frame;
pub mod push;

pub use control::{route_control, ControlAck, ControlMethod, ControlRequest, ControlRoute};
pub use frame::{classify, peek_topic, RawFrame};
pub use push::{push_envelope, PushEnvelope};
