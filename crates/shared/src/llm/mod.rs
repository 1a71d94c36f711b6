pub mod gateway;
pub mod gemini;
pub mod prompts;

pub use gateway::{
    ChatGateway, ChatGatewayError, ChatGatewayFuture, ChatGatewayRequest, ChatReply,
    FALLBACK_REPLY, UpstreamRole, UpstreamTurn,
};
pub use gemini::{GeminiGateway, GeminiGatewayConfig};
pub use prompts::{DEFAULT_PERSONA_TEMPLATE, PersonaTemplate};
