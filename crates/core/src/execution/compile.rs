//! Compile action
//!
//! Runs a compiler on one source file and installs the emitted script into a
//! destination directory. Output is produced in a scratch directory first, so a
//! failing compile never touches what is already in the destination.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use crate::configs::CompilerConfig;
use crate::tasks::TaskAction;
use crate::types::{PipelineError, PipelineResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub warn: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileSpec {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub options: CompileOptions,
}

impl CompileSpec {
    pub fn new(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        options: CompileOptions,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            options,
        }
    }

    /// `tictactoe.elm` compiles to `tictactoe.js`
    pub fn output_file_name(&self) -> PathBuf {
        let stem = self
            .source
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| "out".into());
        PathBuf::from(stem).with_extension("js")
    }

    pub fn output_path(&self) -> PathBuf {
        self.destination.join(self.output_file_name())
    }
}

/// Something that turns a source file into a browser script
#[async_trait]
pub trait Compiler: Send + Sync {
    fn name(&self) -> &str;

    /// Compile `source`, writing the script to `output`
    async fn compile(
        &self,
        source: &Path,
        output: &Path,
        options: CompileOptions,
    ) -> PipelineResult<()>;
}

/// Compiler run as a child process: `program args... <source> --output <file> [--warn]`
#[derive(Debug, Clone)]
pub struct ExternalCompiler {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl ExternalCompiler {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: working_dir.into(),
        }
    }

    pub fn from_config(config: &CompilerConfig, working_dir: &Path) -> Self {
        Self::new(config.program.clone(), config.args.clone(), working_dir)
    }
}

#[async_trait]
impl Compiler for ExternalCompiler {
    fn name(&self) -> &str {
        &self.program
    }

    async fn compile(
        &self,
        source: &Path,
        output: &Path,
        options: CompileOptions,
    ) -> PipelineResult<()> {
        // Paths go to the child absolute; it runs in `working_dir`, not our cwd
        let source_arg =
            std::path::absolute(source).map_err(|e| PipelineError::io(source, e))?;
        let output_arg =
            std::path::absolute(output).map_err(|e| PipelineError::io(output, e))?;

        let mut command = Command::new(&self.program);
        command
            .current_dir(&self.working_dir)
            .args(&self.args)
            .arg(&source_arg)
            .arg("--output")
            .arg(&output_arg);
        if options.warn {
            command.arg("--warn");
        }

        log::debug!("Running {:?}", command);
        let result = command.output().await.map_err(|e| PipelineError::Compiler {
            file: source.to_path_buf(),
            diagnostic: format!("Failed to execute '{}': {}", self.program, e),
        })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            let stdout = String::from_utf8_lossy(&result.stdout).trim().to_string();
            let diagnostic = if !stderr.is_empty() {
                stderr
            } else if !stdout.is_empty() {
                stdout
            } else {
                format!(
                    "'{}' failed with exit code {}",
                    self.program,
                    result.status.code().unwrap_or(-1)
                )
            };
            return Err(PipelineError::Compiler {
                file: source.to_path_buf(),
                diagnostic,
            });
        }

        Ok(())
    }
}

pub struct CompileAction {
    spec: CompileSpec,
    compiler: Arc<dyn Compiler>,
}

impl CompileAction {
    pub fn new(spec: CompileSpec, compiler: Arc<dyn Compiler>) -> Self {
        Self { spec, compiler }
    }
}

#[async_trait]
impl TaskAction for CompileAction {
    fn describe(&self) -> String {
        format!(
            "{} {} -> {}",
            self.compiler.name(),
            self.spec.source.display(),
            self.spec.output_path().display()
        )
    }

    async fn run(&self) -> PipelineResult<()> {
        let source = &self.spec.source;
        if !tokio::fs::metadata(source)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            return Err(PipelineError::SourceNotFound(source.clone()));
        }

        let scratch =
            tempfile::tempdir().map_err(|e| PipelineError::io(std::env::temp_dir(), e))?;
        let file_name = self.spec.output_file_name();
        let scratch_output = scratch.path().join(&file_name);

        self.compiler
            .compile(source, &scratch_output, self.spec.options)
            .await?;

        if !tokio::fs::try_exists(&scratch_output).await.unwrap_or(false) {
            return Err(PipelineError::Compiler {
                file: source.clone(),
                diagnostic: format!(
                    "'{}' reported success but wrote no output",
                    self.compiler.name()
                ),
            });
        }

        let destination = &self.spec.destination;
        tokio::fs::create_dir_all(destination)
            .await
            .map_err(|e| PipelineError::io(destination, e))?;

        // Stage next to the target so the final rename replaces it in one step
        let target = destination.join(&file_name);
        let staged = destination.join(format!(".{}.partial", file_name.display()));
        tokio::fs::copy(&scratch_output, &staged)
            .await
            .map_err(|e| PipelineError::io(&staged, e))?;
        tokio::fs::rename(&staged, &target)
            .await
            .map_err(|e| PipelineError::io(&target, e))?;

        log::info!("Compiled {} -> {}", source.display(), target.display());
        Ok(())
    }
}
