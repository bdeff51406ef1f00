mod provider;
mod serde_api;
mod transport;
mod types;

pub use provider::OpenAiCompatProvider;
pub use transport::{OpenAiCompatChunkStream, OpenAiCompatHttpTransport, OpenAiCompatTransport};
pub use types::{
    OpenAiCompatAuth, OpenAiCompatChunk, OpenAiCompatMessage, OpenAiCompatRequest,
    OpenAiCompatTool,
};
