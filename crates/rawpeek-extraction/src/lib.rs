//! RAW preview extraction: an ordered list of strategies, each wrapping an
//! external tool, tried one at a time until one leaves a non-empty image.

pub mod capabilities;
pub mod pipeline;
pub mod process;
pub mod strategies;
pub mod validator;

pub use capabilities::probe_tools;
pub use pipeline::FallbackPipeline;
pub use strategies::default_strategies;
pub use validator::validate;
