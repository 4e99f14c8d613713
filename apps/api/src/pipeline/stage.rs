use std::fmt;

use serde::{Deserialize, Serialize};

/// One ordered step of the pipeline. Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Upload,
    Parse,
    Summarize,
    GeoEnrich,
    /// Optional; only scheduled when project extraction is enabled.
    ExtractProjects,
    Persist,
    Render,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Upload,
        Stage::Parse,
        Stage::Summarize,
        Stage::GeoEnrich,
        Stage::ExtractProjects,
        Stage::Persist,
        Stage::Render,
    ];

    /// The stage list for a run.
    pub fn schedule(extract_projects: bool) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|s| extract_projects || *s != Stage::ExtractProjects)
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Upload => "upload",
            Stage::Parse => "parse",
            Stage::Summarize => "summarize",
            Stage::GeoEnrich => "geo_enrich",
            Stage::ExtractProjects => "extract_projects",
            Stage::Persist => "persist",
            Stage::Render => "render",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
