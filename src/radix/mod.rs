mod node;
mod payload;

pub use node::{PayloadFactory, RadixNode, Walk};
pub use payload::{MethodBuckets, NodePayload, ParameterBranch};
