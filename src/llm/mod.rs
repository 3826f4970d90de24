//! Language model adapters and response normalization.

pub mod anthropic;
pub mod google;
mod http;
pub mod json;
pub mod normalize;
pub mod openai;
pub mod provider;

pub use json::{extract_json_object, strip_code_fences};
pub use normalize::normalize_summary;
pub use provider::{LanguageModel, Provider, ProviderConfig, RawReply, build_model};
