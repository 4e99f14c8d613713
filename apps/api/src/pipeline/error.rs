use thiserror::Error;

use super::stage::Stage;

/// Failure of a single pipeline stage. The orchestrator turns these into a
/// uniform failure outcome; they never reach the HTTP layer as errors.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("Failed to upload file to storage: {0}")]
    Storage(String),

    #[error("Failed to parse CV: {0}")]
    Parse(String),

    #[error("Failed to generate summary: {0}")]
    Summarize(String),

    #[error("Failed to classify locations: {0}")]
    Geo(String),

    #[error("Failed to extract projects: {0}")]
    Projects(String),

    #[error("Failed to save enriched JSON: {0}")]
    Persist(String),

    #[error("Failed to generate CV document: {0}")]
    Render(String),
}

impl StageError {
    /// Builds the error variant belonging to `stage`.
    pub fn at(stage: Stage, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        match stage {
            Stage::Upload => StageError::Storage(reason),
            Stage::Parse => StageError::Parse(reason),
            Stage::Summarize => StageError::Summarize(reason),
            Stage::GeoEnrich => StageError::Geo(reason),
            Stage::ExtractProjects => StageError::Projects(reason),
            Stage::Persist => StageError::Persist(reason),
            Stage::Render => StageError::Render(reason),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            StageError::Storage(_) => Stage::Upload,
            StageError::Parse(_) => Stage::Parse,
            StageError::Summarize(_) => Stage::Summarize,
            StageError::Geo(_) => Stage::GeoEnrich,
            StageError::Projects(_) => Stage::ExtractProjects,
            StageError::Persist(_) => Stage::Persist,
            StageError::Render(_) => Stage::Render,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_and_stage_round_trip_every_stage() {
        for stage in Stage::ALL {
            assert_eq!(StageError::at(stage, "x").stage(), stage);
        }
    }

    #[test]
    fn test_message_names_the_stage() {
        let err = StageError::at(Stage::Parse, "parser returned no path");
        assert_eq!(
            err.to_string(),
            "Failed to parse CV: parser returned no path"
        );
    }
}
