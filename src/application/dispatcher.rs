//! Mode dispatch: raw input in, finished build result out.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use tracing::{debug, error, info, instrument};

use crate::domain::validator;
use crate::domain::{
    BstBuilder, BuildMode, BuildOptions, BuildResult, DomainError, DomainResult, GraphBuilder,
    LevelOrderBuilder, TokenClassifier,
};

thread_local! {
    /// Set while this thread runs a builder inside [`guarded`]
    static IN_BUILDER: Cell<bool> = const { Cell::new(false) };
}

static PANIC_HOOK: Once = Once::new();

/// Route panics raised inside a builder to the log instead of stderr.
/// Panics anywhere else still reach the previous hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let default_hook = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if IN_BUILDER.with(Cell::get) {
                error!("builder panicked: {}", info);
            } else {
                default_hook(info);
            }
        }));
    });
}

/// Run `f`, turning a panic into [`DomainError::Internal`].
fn guarded<T>(mode: BuildMode, f: impl FnOnce() -> DomainResult<T>) -> DomainResult<T> {
    install_panic_hook();
    IN_BUILDER.with(|flag| flag.set(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    IN_BUILDER.with(|flag| flag.set(false));

    outcome.unwrap_or_else(|_| {
        Err(DomainError::Internal(format!(
            "unexpected failure while building {mode} input"
        )))
    })
}

/// Classify, validate and build `input` according to `options`.
///
/// Validation runs before any node is allocated, so a failure never yields
/// a partial model. A panic inside a builder is logged and reported as
/// [`DomainError::Internal`] instead of unwinding into the caller.
#[instrument(level = "debug", skip(input))]
pub fn build(input: &str, options: &BuildOptions) -> DomainResult<BuildResult> {
    let classifier = TokenClassifier::new(&options.null_marker);
    let tokens = classifier.classify(input, options.mode);

    validator::validate(&tokens, options)?;

    let outcome = guarded(options.mode, || match options.mode {
        BuildMode::Bst => BstBuilder::new().build(&tokens),
        BuildMode::Bt => LevelOrderBuilder::new().build(&tokens),
        BuildMode::Graph => GraphBuilder::new(options.weighted, options.directed).build(&tokens),
    });

    match outcome {
        Ok(result) => {
            info!(
                mode = %result.mode,
                nodes = result.nodes.len(),
                warnings = result.warnings.len(),
                "build complete"
            );
            Ok(result)
        }
        Err(e) => {
            error!("build failed: {}", e);
            Err(e)
        }
    }
}

/// Outcome of the most recent build of a [`Session`].
#[derive(Debug, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Built(BuildResult),
    Failed(DomainError),
}

/// Holds the raw input and the selectors; every change discards the
/// previous output and rebuilds from scratch.
#[derive(Debug, Default)]
pub struct Session {
    options: BuildOptions,
    input: String,
    state: SessionState,
}

impl Session {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            input: String::new(),
            state: SessionState::Idle,
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn result(&self) -> Option<&BuildResult> {
        match &self.state {
            SessionState::Built(result) => Some(result),
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&DomainError> {
        match &self.state {
            SessionState::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn set_input(&mut self, input: impl Into<String>) -> DomainResult<&BuildResult> {
        self.input = input.into();
        self.rebuild()
    }

    pub fn set_mode(&mut self, mode: BuildMode) -> DomainResult<&BuildResult> {
        debug!(from = %self.options.mode, to = %mode, "switching mode");
        self.options.mode = mode;
        self.rebuild()
    }

    pub fn set_weighted(&mut self, weighted: bool) -> DomainResult<&BuildResult> {
        self.options.weighted = weighted;
        self.rebuild()
    }

    pub fn set_directed(&mut self, directed: bool) -> DomainResult<&BuildResult> {
        self.options.directed = directed;
        self.rebuild()
    }

    pub fn set_null_marker(&mut self, marker: impl Into<String>) -> DomainResult<&BuildResult> {
        self.options.null_marker = marker.into();
        self.rebuild()
    }

    /// Drop input and output.
    pub fn clear(&mut self) {
        self.input.clear();
        self.state = SessionState::Idle;
    }

    /// Build the stored input again with the current options.
    pub fn rebuild(&mut self) -> DomainResult<&BuildResult> {
        self.state = SessionState::Idle;
        self.state = match build(&self.input, &self.options) {
            Ok(result) => SessionState::Built(result),
            Err(e) => SessionState::Failed(e),
        };
        match &self.state {
            SessionState::Built(result) => Ok(result),
            SessionState::Failed(e) => Err(e.clone()),
            SessionState::Idle => Err(DomainError::Internal(
                "session has no build outcome".to_string(),
            )),
        }
    }
}
