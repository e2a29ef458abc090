//! The fixed build graph
//!
//! Bootstrap's css, js and glyphicon fonts are copied from the vendored
//! distribution into the web root, and the tic-tac-toe Elm program is compiled
//! next to the other scripts. `default` does both.

use std::path::Path;
use std::sync::Arc;

use crate::configs::BuildConfig;
use crate::execution::{CompileAction, CompileOptions, CompileSpec, Compiler, CopyAction, CopySpec};
use crate::registry::TaskRegistry;
use crate::types::PipelineResult;

pub const COPY_BOOTSTRAP_CSS: &str = "copy-bootstrap-css";
pub const COPY_BOOTSTRAP_JS: &str = "copy-bootstrap-js";
pub const COPY_GLYPHICONS: &str = "copy-glyphicons";
pub const COPY_BOOTSTRAP: &str = "copy-bootstrap";
pub const COMPILE_TIC_TAC_TOE: &str = "compile-tic-tac-toe";
pub const DEFAULT_TASK: &str = "default";

pub const STYLES_DIR: &str = "styles";
pub const SCRIPTS_DIR: &str = "scripts";
pub const FONTS_DIR: &str = "fonts";

/// Register the six build tasks against `project_root`
pub fn build_registry(
    config: &BuildConfig,
    project_root: &Path,
    compiler: Arc<dyn Compiler>,
) -> PipelineResult<TaskRegistry> {
    let dist = config.dist_dir(project_root);
    let web = config.web_dir(project_root);
    let copy = |pattern: &str, destination: &str| {
        Arc::new(CopyAction::new(
            CopySpec::new(&dist, &[pattern], web.join(destination)).strict(config.strict_copy),
        ))
    };

    let mut registry = TaskRegistry::new();

    registry.register_task(
        COPY_BOOTSTRAP_CSS,
        &[],
        Some(copy("css/bootstrap.min.css", STYLES_DIR)),
    )?;
    registry.register_task(
        COPY_BOOTSTRAP_JS,
        &[],
        Some(copy("js/bootstrap.min.js", SCRIPTS_DIR)),
    )?;
    registry.register_task(COPY_GLYPHICONS, &[], Some(copy("fonts/*.*", FONTS_DIR)))?;
    registry.register_task(
        COPY_BOOTSTRAP,
        &[COPY_BOOTSTRAP_CSS, COPY_BOOTSTRAP_JS, COPY_GLYPHICONS],
        None,
    )?;

    let compile = CompileSpec::new(
        web.join(&config.tic_tac_toe_source),
        web.join(SCRIPTS_DIR),
        CompileOptions {
            warn: config.compiler.warn,
        },
    );
    registry.register_task(
        COMPILE_TIC_TAC_TOE,
        &[],
        Some(Arc::new(CompileAction::new(compile, compiler))),
    )?;

    registry.register_task(DEFAULT_TASK, &[COMPILE_TIC_TAC_TOE, COPY_BOOTSTRAP], None)?;

    Ok(registry)
}
