//! Asset copy action
//!
//! Copies files matched by glob patterns into a destination directory, keeping each
//! file's path relative to the non-glob prefix of its pattern.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::try_join_all;
use globset::GlobBuilder;

use crate::tasks::TaskAction;
use crate::types::{PipelineError, PipelineResult};

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Source patterns (relative to `base`) and the directory they are copied into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySpec {
    pub base: PathBuf,
    pub patterns: Vec<String>,
    pub destination: PathBuf,
    /// A glob matching zero files is an error instead of a no-op
    pub strict: bool,
}

impl CopySpec {
    pub fn new(
        base: impl Into<PathBuf>,
        patterns: &[&str],
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            base: base.into(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            destination: destination.into(),
            strict: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// A file to copy: absolute source and path relative to the destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySource {
    pub path: PathBuf,
    pub relative: PathBuf,
}

pub struct CopyAction {
    spec: CopySpec,
}

impl CopyAction {
    pub fn new(spec: CopySpec) -> Self {
        Self { spec }
    }

    /// Resolve every pattern to concrete files, sorted by relative path per pattern
    pub async fn resolve_sources(&self) -> PipelineResult<Vec<CopySource>> {
        let mut sources = Vec::new();

        for pattern in &self.spec.patterns {
            let (prefix, glob) = split_pattern(pattern);

            let Some(glob) = glob else {
                let path = self.spec.base.join(pattern);
                if !tokio::fs::metadata(&path)
                    .await
                    .map(|m| m.is_file())
                    .unwrap_or(false)
                {
                    return Err(PipelineError::SourceNotFound(path));
                }
                let relative = path
                    .file_name()
                    .map(PathBuf::from)
                    .ok_or_else(|| PipelineError::SourceNotFound(path.clone()))?;
                sources.push(CopySource { path, relative });
                continue;
            };

            let root = self.spec.base.join(prefix);
            let mut matched = match_files(&root, glob).await?;

            if matched.is_empty() {
                if self.spec.strict {
                    return Err(PipelineError::SourceNotFound(self.spec.base.join(pattern)));
                }
                log::warn!(
                    "Pattern '{}' matched no files under {}",
                    pattern,
                    self.spec.base.display()
                );
            }

            matched.sort_by(|a, b| a.relative.cmp(&b.relative));
            sources.extend(matched);
        }

        Ok(sources)
    }
}

#[async_trait]
impl TaskAction for CopyAction {
    fn describe(&self) -> String {
        format!(
            "copy {} -> {}",
            self.spec.patterns.join(", "),
            self.spec.destination.display()
        )
    }

    async fn run(&self) -> PipelineResult<()> {
        let sources = self.resolve_sources().await?;

        let destination = &self.spec.destination;
        tokio::fs::create_dir_all(destination)
            .await
            .map_err(|e| PipelineError::io(destination, e))?;

        try_join_all(sources.iter().map(|source| copy_file(source, destination))).await?;

        log::info!(
            "Copied {} file(s) into {}",
            sources.len(),
            destination.display()
        );
        Ok(())
    }
}

async fn copy_file(source: &CopySource, destination: &Path) -> PipelineResult<()> {
    let target = destination.join(&source.relative);
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PipelineError::io(parent, e))?;
    }
    log::debug!("{} -> {}", source.path.display(), target.display());
    tokio::fs::copy(&source.path, &target)
        .await
        .map_err(|e| PipelineError::io(&source.path, e))?;
    Ok(())
}

/// Split a pattern into its literal directory prefix and the glob remainder.
///
/// `fonts/*.*` becomes (`fonts`, `*.*`); a pattern without glob characters has no
/// remainder and names a single file.
fn split_pattern(pattern: &str) -> (PathBuf, Option<&str>) {
    if !pattern.contains(GLOB_META) {
        return (PathBuf::from(pattern), None);
    }

    let mut prefix = PathBuf::new();
    let mut offset = 0;
    for component in pattern.split('/') {
        if component.contains(GLOB_META) {
            break;
        }
        prefix.push(component);
        offset += component.len() + 1;
    }

    (prefix, Some(&pattern[offset..]))
}

async fn match_files(root: &Path, glob: &str) -> PipelineResult<Vec<CopySource>> {
    let matcher = GlobBuilder::new(glob)
        .literal_separator(true)
        .build()
        .map_err(|e| PipelineError::Config(format!("Invalid copy pattern '{}': {}", glob, e)))?
        .compile_matcher();

    let mut matched = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back(root.to_path_buf());

    while let Some(current_dir) = queue.pop_front() {
        let mut entries = match tokio::fs::read_dir(&current_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(PipelineError::io(&current_dir, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PipelineError::io(&current_dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| PipelineError::io(&path, e))?;

            if file_type.is_dir() {
                queue.push_back(path);
            } else if file_type.is_file() {
                let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                if matcher.is_match(&relative) && !is_hidden_from(glob, &relative) {
                    matched.push(CopySource { path, relative });
                }
            }
        }
    }

    Ok(matched)
}

/// Dotfiles only match a pattern segment that itself starts with `.`.
///
/// Segments are compared by position; a `**` segment never admits a dotfile.
fn is_hidden_from(glob: &str, relative: &Path) -> bool {
    let segments: Vec<&str> = glob.split('/').collect();
    relative.components().enumerate().any(|(i, component)| {
        let hidden = component.as_os_str().to_string_lossy().starts_with('.');
        let explicit = segments
            .get(i)
            .is_some_and(|segment| !segment.contains("**") && segment.starts_with('.'));
        hidden && !explicit
    })
}
