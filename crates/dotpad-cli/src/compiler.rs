use dotpad::host::{CompileError, GraphCompiler};
use dotpad::{EngineId, FormatId};
use futures::future::{FutureExt, LocalBoxFuture};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Runs a Graphviz executable (`dot` by default) as `<program> -K<engine> -T<format>`, with the
/// source on stdin.
#[derive(Debug, Clone)]
pub struct DotCommand {
    program: PathBuf,
}

impl DotCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, source: &str, engine: EngineId, format: FormatId) -> Result<String, CompileError> {
        let spawn_error =
            |err: std::io::Error| CompileError::new(format!("failed to run {}: {err}", self.program.display()));

        let mut child = Command::new(&self.program)
            .arg(format!("-K{engine}"))
            .arg(format!("-T{format}"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(source.as_bytes()).map_err(spawn_error)?;
        }
        let output = child.wait_with_output().map_err(spawn_error)?;
        tracing::debug!(
            program = %self.program.display(),
            %engine,
            %format,
            status = %output.status,
            "graphviz finished"
        );

        if !output.status.success() {
            return Err(CompileError::new(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        String::from_utf8(output.stdout)
            .map_err(|_| CompileError::new("Graphviz output is not valid UTF-8"))
    }
}

impl Default for DotCommand {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl GraphCompiler for DotCommand {
    fn compile<'a>(
        &'a self,
        source: &'a str,
        engine: EngineId,
        format: FormatId,
    ) -> LocalBoxFuture<'a, Result<String, CompileError>> {
        futures::future::ready(self.run(source, engine, format)).boxed_local()
    }
}
