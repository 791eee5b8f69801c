use super::{Collaborator, CollaboratorError, CollaboratorInfo};
use crate::operation::GenerationOptions;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

enum Script {
    Responses(Vec<String>),
    Fail(CollaboratorError),
    /// Never answers; only cancellation ends the call.
    Hang,
}

/// Scripted collaborator for tests and demos.
///
/// Responses are served round-robin. Every call is recorded together with
/// the generation options it carried.
pub struct MockCollaborator {
    script: Script,
    response_idx: AtomicUsize,
    calls: Mutex<Vec<(String, GenerationOptions)>>,
}

impl MockCollaborator {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            response_idx: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn new(responses: Vec<String>) -> Self {
        Self::with_script(Script::Responses(responses))
    }

    pub fn always(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }

    pub fn failing(error: CollaboratorError) -> Self {
        Self::with_script(Script::Fail(error))
    }

    pub fn hanging() -> Self {
        Self::with_script(Script::Hang)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(prompt, _)| prompt.clone()).collect()
    }

    pub fn options(&self) -> Vec<GenerationOptions> {
        self.calls.lock().iter().map(|(_, options)| *options).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Collaborator for MockCollaborator {
    async fn execute(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, CollaboratorError> {
        self.calls.lock().push((prompt.to_string(), *options));
        match &self.script {
            Script::Responses(responses) => {
                let idx = self.response_idx.fetch_add(1, Ordering::SeqCst);
                if responses.is_empty() {
                    return Err(CollaboratorError::InvalidResponse(
                        "mock has no scripted responses".to_string(),
                    ));
                }
                Ok(responses[idx % responses.len()].clone())
            }
            Script::Fail(error) => Err(error.clone()),
            Script::Hang => std::future::pending().await,
        }
    }

    fn info(&self) -> CollaboratorInfo {
        CollaboratorInfo {
            provider: "mock".to_string(),
            model: "scripted".to_string(),
        }
    }
}
