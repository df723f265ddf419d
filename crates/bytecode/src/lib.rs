//! Dependency-expression ("depex") bytecode definitions.
//!
//! A depex is a flat byte stream: zero or one leading marker opcode
//! (before/after/one-shot), followed by a postfix boolean expression over
//! service presence, terminated by [`Opcode::End`]. This crate defines the
//! opcode grammar, the 16-byte service identifiers the operands carry, and
//! the per-module descriptor the classification pre-pass writes into.
//!
//! Evaluation lives in `depex-eval`; this crate never looks at a registry.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod opcode;
pub use opcode::{GUID_LEN, Opcode};

mod descriptor;
pub use descriptor::{ModuleDescriptor, ModuleFlags, ResolvedOffsets};

/// A 16-byte service/module identifier.
pub type Guid = alloy_primitives::B128;
