/*
[INPUT]:  Venue schema definitions and serde requirements
[OUTPUT]: Typed Rust structs/enums with serialization support
[POS]:    Data layer - type definitions for the feed client
[UPDATE]: When the venue schema changes or new types are added
*/

pub mod enums;
pub mod events;
pub mod subscription;

pub use enums::*;
pub use events::*;
pub use subscription::*;
