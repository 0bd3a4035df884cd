use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only CSV log of episode scores (`Episode,Score` rows).
///
/// The header row is written once when the file is first created; reopening
/// an existing log keeps appending below it.
pub struct ScoreLog {
    path: PathBuf,
    episodes_logged: u32,
}

impl ScoreLog {
    /// Open (or create) a score log at `path`.
    ///
    /// Reopening an existing log continues its episode numbering.
    pub fn open(path: &Path) -> Result<Self> {
        let episodes_logged = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read score log at {:?}", path))?;
            // Rows below the header
            contents.lines().count().saturating_sub(1) as u32
        } else {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create directory: {:?}", parent))?;
                }
            }
            std::fs::write(path, "Episode,Score\n")
                .with_context(|| format!("Failed to create score log at {:?}", path))?;
            0
        };

        Ok(Self {
            path: path.to_path_buf(),
            episodes_logged,
        })
    }

    /// Append one finished episode's score
    pub fn record(&mut self, score: u32) -> Result<()> {
        self.episodes_logged += 1;

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open score log at {:?}", self.path))?;
        writeln!(file, "{},{}", self.episodes_logged, score)
            .with_context(|| format!("Failed to append to score log at {:?}", self.path))?;

        Ok(())
    }

    pub fn episodes_logged(&self) -> u32 {
        self.episodes_logged
    }
}
