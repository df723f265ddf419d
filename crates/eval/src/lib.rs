//! Dependency-expression readiness evaluation.
//!
//! The postfix stack machine that decides, per discovered module, whether all
//! prerequisites encoded in its dependency expression are currently satisfied
//! against a live [`ServiceRegistry`]. The external dispatcher re-invokes the
//! [`Evaluator`] every time the set of available services changes, until each
//! module is scheduled or permanently stalled.
//!
//! The machine operates on untrusted, variable-length byte streams: every
//! operand read is bounds-checked and every failure path (malformed grammar,
//! truncated buffer, stack underflow, allocator exhaustion) collapses to the
//! same "not ready" verdict. Nothing here panics on input.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod stack;
pub use stack::{EvalStack, StackError};

mod registry;
pub use registry::{GuidSetRegistry, ServiceRegistry};

mod eval;
pub use eval::{Evaluator, Readiness};

// Convenience re-export.
pub use depex_bytecode as bytecode;
