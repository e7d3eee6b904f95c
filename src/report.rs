// Deep-Research: Report Writer
// Persists the final report as a timestamped markdown file

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render the document for `report` on `requirements`
    pub fn render(report: &str, requirements: &str, generated: DateTime<Local>) -> String {
        format!(
            "# Business Research Report\n\n\
             **Generated:** {}  \n\
             **Research Topic:** {}\n\n\
             ---\n\n\
             ## Executive Summary\n\n\
             {}\n\n\
             ---\n\n\
             *This report was generated by the Deep Research AI system using comprehensive web research, market analysis, and competitive intelligence.*\n",
            generated.format("%B %d, %Y at %I:%M %p"),
            requirements,
            report
        )
    }

    /// Write the report. Failures are logged and yield `None`.
    pub async fn save(&self, report: &str, requirements: &str) -> Option<PathBuf> {
        let now = Local::now();

        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            log::error!("Failed to create {}: {}", self.dir.display(), e);
            return None;
        }

        let path = self.free_path(&now.format("research_%Y%m%d_%H%M%S").to_string());
        match tokio::fs::write(&path, Self::render(report, requirements, now)).await {
            Ok(()) => {
                log::info!("Research saved to {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::error!("Error saving research file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// `<stem>.md`, or `<stem>_<n>.md` when that name is taken
    fn free_path(&self, stem: &str) -> PathBuf {
        let mut path = self.dir.join(format!("{}.md", stem));
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("{}_{}.md", stem, n));
            n += 1;
        }
        path
    }
}
