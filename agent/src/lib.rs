//! Goal-driven agent orchestration runtime.
//!
//! A run starts from a goal and loops: the coordinator maps the current
//! workflow stage to one decision, the decision invokes a skill (inference)
//! or a tool, and a pure handler folds the result into the next state. The
//! run ends on `complete`, on a stage without a transition, or when the step
//! budget is spent.
//!
//! - **[`core`]**: Pure, deterministic logic (stage policy, decisions, state
//!   handlers, retry arithmetic, schema checks). No I/O.
//! - **[`io`]**: Side-effecting collaborators (configuration files, prompt
//!   rendering, the inference backend and its child process).
//!
//! [`looping::Agent`] wires both together with the [`skills`] and [`tools`]
//! catalogs.

pub mod core;
pub mod error;
pub mod executor;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod looping;
pub mod skills;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod tools;

pub use error::AgentError;
pub use looping::{Agent, AgentParts, AgentResult, RunOutcome, StepRecord};
pub use state::{AgentState, InitialState, create_initial_state};
