use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::prompts::RenderedPrompt;

/// Instructions sent to a text-completion service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

impl From<&RenderedPrompt> for CompletionRequest {
    fn from(rendered: &RenderedPrompt) -> Self {
        Self {
            system: rendered.system.clone(),
            user: rendered.user.clone(),
        }
    }
}

/// Opaque text-completion seam: instructions in, unstructured text out.
///
/// Implementations make exactly one upstream call per invocation and do not
/// retry.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
