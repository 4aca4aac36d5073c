use packplan_stack::ProviderError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Project path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Project path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A provider claimed the project but could not build a plan for it
    #[error("Provider {provider} failed: {source}")]
    Provider {
        provider: &'static str,
        #[source]
        source: ProviderError,
    },
}

impl DetectError {
    /// Returns a user-facing message with troubleshooting hints
    pub fn help_message(&self) -> String {
        match self {
            DetectError::PathNotFound(path) => format!(
                "Error: Project path not found\nPath: {}\n\n\
                Help: The specified path does not exist. Please check:\n\
                - Is the path correct?\n\
                - Do you have permission to access it?",
                path.display()
            ),
            DetectError::NotADirectory(path) => format!(
                "Error: Project path is not a directory\nPath: {}\n\n\
                Help: Pass the project root directory, not a file inside it.",
                path.display()
            ),
            DetectError::Provider {
                provider,
                source: ProviderError::Manifest { path, source },
            } => format!(
                "Error: The {} manifest could not be parsed\nFile: {}\nDetails: {}\n\n\
                Help: Fix the syntax error in {} and run detection again.",
                provider, path, source, path
            ),
            DetectError::Provider { provider, source } => {
                format!("Error: The {} provider failed\nDetails: {}", provider, source)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packplan_core::EvidenceError;

    #[test]
    fn test_help_messages_name_the_problem() {
        let err = DetectError::PathNotFound(PathBuf::from("/nope"));
        assert!(err.help_message().contains("/nope"));

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = DetectError::Provider {
            provider: "node",
            source: ProviderError::Manifest {
                path: "package.json".to_string(),
                source,
            },
        };
        assert!(err.help_message().contains("package.json"));
        assert!(err.to_string().starts_with("Provider node failed"));

        let err = DetectError::Provider {
            provider: "node",
            source: ProviderError::Evidence(EvidenceError::NotFound {
                path: "package.json".to_string(),
            }),
        };
        assert!(err.help_message().contains("node provider failed"));
    }
}
