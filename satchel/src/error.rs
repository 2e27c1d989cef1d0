use std::path::PathBuf;

use thiserror::Error;

/// The primary error type that can be produced by Satchel.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to traverse template root {0}: {1}")]
    Traversal(PathBuf, walkdir::Error),
    #[error("invalid template file pattern \"{0}\": {1}")]
    Pattern(String, glob::PatternError),
    #[error("failed to get file info for {0}: {1}")]
    Stat(PathBuf, std::io::Error),
    #[error("failed to read template file {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to parse template \"{0}\": {1}")]
    Parse(String, handlebars::TemplateError),
    #[error("no templates found under {0} with patterns {1:?}")]
    NoTemplates(PathBuf, Vec<String>),
    #[error("template \"{0}\" not found in collection under {1} with patterns {2:?}")]
    NotFound(String, PathBuf, Vec<String>),
    #[error("failed to refresh collection for template \"{0}\": {1}")]
    Refresh(String, Box<Error>),
    #[error("failed to render template \"{0}\": {1}")]
    Render(String, handlebars::RenderError),
}
