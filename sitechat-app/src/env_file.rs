use std::path::{Path, PathBuf};

/// Outcome of loading a `.env` file into the process environment.
#[derive(Debug)]
pub enum EnvFile {
    Loaded(PathBuf),
    Absent,
    Invalid(dotenvy::Error),
}

impl EnvFile {
    /// `.env` from the working directory or any parent.
    pub fn load() -> Self {
        Self::classify(dotenvy::dotenv())
    }

    pub fn load_from(path: &Path) -> Self {
        Self::classify(dotenvy::from_path(path).map(|()| path.to_path_buf()))
    }

    fn classify(result: Result<PathBuf, dotenvy::Error>) -> Self {
        match result {
            Ok(path) => EnvFile::Loaded(path),
            Err(e) if e.not_found() => EnvFile::Absent,
            Err(e) => EnvFile::Invalid(e),
        }
    }

    /// Emit the outcome; only a malformed file is worth a warning.
    pub fn log(&self) {
        match self {
            EnvFile::Loaded(path) => tracing::debug!(path = %path.display(), "env_file.loaded"),
            EnvFile::Absent => tracing::debug!("env_file.absent"),
            EnvFile::Invalid(e) => tracing::warn!(error = %e, "env_file.invalid"),
        }
    }
}
