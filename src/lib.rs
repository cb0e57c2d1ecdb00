mod context;
mod error;
mod handler;
mod method;
mod pattern;
mod radix;
mod router;
mod staged;

pub use context::Context;
pub use error::{RouterError, RouterResult};
pub use handler::{Handler, HandlerRef, Next};
pub use method::{CompactMethod, MethodKey};
pub use pattern::{parse, ParameterSegment, PatternError, Segment};
pub use router::{Router, RouterOptions, RouterOptionsBuilder, RouterOptionsError};
pub use staged::StagedArray;
