#![doc = include_str!("../README.md")]

pub mod backend;
pub mod config;
mod http;
pub mod mock;
pub mod openai;

#[cfg(test)]
mod testing;

pub use backend::BackendResponder;
pub use config::{
    DEFAULT_BACKEND_URL, DEFAULT_MODEL, DEFAULT_OPENAI_URL, DEFAULT_TIMEOUT, ResponderConfig,
    ResponderKind, api_key_from_env, api_key_var,
};
pub use convotree::{Responder, ResponderError};
pub use mock::{MOCK_RESPONSES, MockResponder};
pub use openai::OpenAiResponder;

pub type Result<T> = std::result::Result<T, ResponderError>;

/// Build the responder described by `config`.
///
/// Fails only when an HTTP client cannot be constructed. A missing API key
/// surfaces later, on the first request.
pub fn build(config: &ResponderConfig) -> Result<Box<dyn Responder>> {
    tracing::info!(kind = %config.kind, "building responder");
    let responder: Box<dyn Responder> = match config.kind {
        ResponderKind::Mock => match config.seed {
            Some(seed) => Box::new(MockResponder::with_seed(seed)),
            None => Box::new(MockResponder::new()),
        },
        ResponderKind::Backend => {
            Box::new(BackendResponder::new(&config.backend_url, config.timeout)?)
        }
        ResponderKind::OpenAi => Box::new(OpenAiResponder::new(
            config.openai_url.clone(),
            config.model.clone(),
            config.resolve_api_key(),
            config.timeout,
        )?),
    };
    Ok(responder)
}
