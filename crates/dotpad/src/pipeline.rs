use crate::host::GraphCompiler;
use dotpad_core::{ErrorKind, RenderRequest, SvgDocument};
use std::cell::Cell;

/// Panel text used when a failure carries no message of its own.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred while processing the graph input.";

/// A user-visible failure: its class and the text shown in the error panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind,
            message: if message.trim().is_empty() {
                DEFAULT_ERROR_MESSAGE.to_string()
            } else {
                message
            },
        }
    }
}

impl From<&dotpad_core::Error> for Failure {
    fn from(err: &dotpad_core::Error) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    VectorImage(SvgDocument),
    TextPayload(String),
    Failure(Failure),
}

/// Submission order of a render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

/// Sequence-number bookkeeping for last-submitted-wins.
///
/// In-flight compiles are never cancelled; an outcome is applied only while its ticket is still
/// the newest one handed out.
#[derive(Debug, Default)]
pub struct RenderPipeline {
    submitted: Cell<u64>,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&self) -> Ticket {
        let next = self.submitted.get() + 1;
        self.submitted.set(next);
        Ticket(next)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.submitted.get()
    }

    /// Runs the compiler for `request`. `svg`/`png` ask for SVG markup and parse it into a
    /// document; every other format is returned as the compiler's text payload.
    pub async fn compile(compiler: &dyn GraphCompiler, request: &RenderRequest) -> RenderOutcome {
        let format = request.format.compiler_format();
        let output = match compiler
            .compile(&request.source_text, request.engine, format)
            .await
        {
            Ok(output) => output,
            Err(err) => return RenderOutcome::Failure(Failure::new(ErrorKind::Compile, err.message)),
        };

        if !request.format.is_vector_source() {
            return RenderOutcome::TextPayload(output);
        }
        match SvgDocument::parse(&output) {
            Ok(doc) => RenderOutcome::VectorImage(doc),
            Err(err) => RenderOutcome::Failure(Failure::from(&err)),
        }
    }
}
