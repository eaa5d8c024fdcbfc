//! The closed union of everything a builder may produce.

use crate::edge_function::EdgeFunction;
use crate::file::File;
use crate::lambda::Lambda;
use crate::prerender::Prerender;

/// One deployable artifact in a build result.
///
/// A closed tagged union: new artifact kinds are a breaking change to the
/// contract, and matching is exhaustive at compile time.
#[derive(Debug, Clone)]
pub enum Output {
    /// Static passthrough asset.
    File(File),
    /// Packaged serverless function.
    Lambda(Lambda),
    /// Function targeted at an edge runtime.
    EdgeFunction(EdgeFunction),
    /// Precomputed page plus its regenerating function.
    Prerender(Prerender),
}

impl Output {
    /// Stable tag for logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Output::File(_) => "file",
            Output::Lambda(_) => "lambda",
            Output::EdgeFunction(_) => "edge-function",
            Output::Prerender(_) => "prerender",
        }
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Output::File(file) => Some(file),
            _ => None,
        }
    }

    pub fn as_lambda(&self) -> Option<&Lambda> {
        match self {
            Output::Lambda(lambda) => Some(lambda),
            _ => None,
        }
    }

    pub fn as_edge_function(&self) -> Option<&EdgeFunction> {
        match self {
            Output::EdgeFunction(edge) => Some(edge),
            _ => None,
        }
    }

    pub fn as_prerender(&self) -> Option<&Prerender> {
        match self {
            Output::Prerender(prerender) => Some(prerender),
            _ => None,
        }
    }

    pub fn is_lambda(&self) -> bool {
        matches!(self, Output::Lambda(_))
    }
}

impl From<File> for Output {
    fn from(value: File) -> Self {
        Output::File(value)
    }
}

impl From<Lambda> for Output {
    fn from(value: Lambda) -> Self {
        Output::Lambda(value)
    }
}

impl From<EdgeFunction> for Output {
    fn from(value: EdgeFunction) -> Self {
        Output::EdgeFunction(value)
    }
}

impl From<Prerender> for Output {
    fn from(value: Prerender) -> Self {
        Output::Prerender(value)
    }
}
