// Tailoring pipeline: prompt construction, model call, response sanitation,
// parsing with fallback, and the flow orchestration on top.
//
// All model calls go through llm_client behind the TextGenerator trait; no
// module here talks to the API directly.

pub mod handlers;
pub mod parse;
pub mod pipeline;
pub mod prompts;
pub mod sanitize;
