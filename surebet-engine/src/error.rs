//! Errors that abort a whole discovery cycle.

use crate::collaborator::CollaboratorError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Execution hand-off failed for {match_id}: {source}")]
    Execution {
        match_id: String,
        #[source]
        source: CollaboratorError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_names_pair() {
        let error = EngineError::Execution {
            match_id: "azuro:1|overtime:2".to_string(),
            source: CollaboratorError::Execution("nonce too low".to_string()),
        };
        assert_eq!(
            error.to_string(),
            "Execution hand-off failed for azuro:1|overtime:2: Execution failed: nonce too low"
        );
    }
}
