mod dispatch;
mod options;
mod param_guard;
mod service;

pub use options::{RouterOptions, RouterOptionsBuilder, RouterOptionsError};
pub use service::Router;
