//! Postfix evaluation of dependency expressions and the scheduler gate.

use crate::{EvalStack, ServiceRegistry, StackError};
use depex_bytecode::{GUID_LEN, Guid, ModuleDescriptor, Opcode, ResolvedOffsets};
use thiserror::Error;
use tracing::debug;

/// Outcome of a readiness check, for hosts that want more than a boolean.
///
/// The scheduler contract itself is boolean ("schedulable now or retry next
/// pass"); this type exists behind that facade so a host can tell a module
/// that is merely waiting for services apart from one whose expression can
/// never evaluate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// All prerequisites are currently satisfied.
    Ready,
    /// Not all prerequisites are satisfied yet; a later pass may succeed.
    NotReadyYet,
    /// The expression violates the grammar and will never evaluate.
    Malformed,
}

impl Readiness {
    /// Returns `true` for [`Ready`](Self::Ready).
    #[inline]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Internal evaluation errors. All of them collapse to "not ready" at the
/// public boundary; none abort the boot flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
enum EvalError {
    /// An operand read would cross the end of the expression.
    #[error("operand of {opcode} at offset {offset} is truncated")]
    TruncatedOperand { opcode: Opcode, offset: usize },
    /// A leading-only opcode appeared past byte 0.
    #[error("leading-only opcode {opcode} at offset {offset}")]
    MisplacedLeadingOpcode { opcode: Opcode, offset: usize },
    /// An unrecognized opcode byte.
    #[error("unknown opcode {byte:#04x} at offset {offset}")]
    UnknownOpcode { byte: u8, offset: usize },
    /// The buffer ended without an `END` opcode.
    #[error("expression ended without END")]
    MissingEnd,
    /// Stack underflow or allocation failure.
    #[error(transparent)]
    Stack(#[from] StackError),
}

impl EvalError {
    /// Allocator exhaustion is the one transient failure; everything else
    /// means the expression itself is bad.
    fn readiness(self) -> Readiness {
        match self {
            Self::Stack(StackError::OutOfMemory) => Readiness::NotReadyYet,
            _ => Readiness::Malformed,
        }
    }
}

/// The dependency-expression evaluator.
///
/// Borrows the host's [`ServiceRegistry`]; per-module mutable state (the push
/// memo table) lives in the [`ModuleDescriptor`], and the scratch
/// [`EvalStack`] is threaded in by the caller, so exclusive access is
/// enforced by the borrow checker rather than by convention.
pub struct Evaluator<'r, R: ?Sized> {
    registry: &'r R,
}

impl<'r, R: ServiceRegistry + ?Sized> Evaluator<'r, R> {
    /// Creates an evaluator over the given registry.
    pub fn new(registry: &'r R) -> Self {
        Self { registry }
    }

    /// The per-dispatch-pass scheduler gate.
    ///
    /// Ordering-constrained (`BEFORE`/`AFTER`) modules are never schedulable
    /// through the boolean path; the dispatcher places them via its own
    /// before/after resolution. Everything else resets the stack and
    /// evaluates the predicate, failing closed.
    pub fn is_schedulable(&self, module: &mut ModuleDescriptor<'_>, stack: &mut EvalStack) -> bool {
        if module.is_ordering_constrained() {
            return false;
        }
        self.evaluate(module, stack)
    }

    /// Evaluates the module's dependency expression against the registry.
    ///
    /// Every failure path reports "not ready"; the caller must treat `false`
    /// as "retry on a later pass" and apply its own give-up policy.
    pub fn evaluate(&self, module: &mut ModuleDescriptor<'_>, stack: &mut EvalStack) -> bool {
        self.check(module, stack).is_ready()
    }

    /// Like [`evaluate`](Self::evaluate), but distinguishes "waiting for
    /// services" from "malformed expression".
    pub fn check(&self, module: &mut ModuleDescriptor<'_>, stack: &mut EvalStack) -> Readiness {
        let Some(expr) = module.expression else {
            // No expression: ready once the basic platform services exist.
            return if self.registry.base_services_present() {
                Readiness::Ready
            } else {
                Readiness::NotReadyYet
            };
        };
        stack.clear();
        match self.run(expr, &mut module.memo, stack) {
            Ok(true) => Readiness::Ready,
            Ok(false) => Readiness::NotReadyYet,
            Err(e) => {
                debug!(len = expr.len(), error = %e, "dependency expression failed to evaluate");
                e.readiness()
            }
        }
    }

    /// The core loop: a single bounds-checked left-to-right pass.
    fn run(
        &self,
        expr: &[u8],
        memo: &mut ResolvedOffsets,
        stack: &mut EvalStack,
    ) -> Result<bool, EvalError> {
        let mut offset = 0usize;
        while let Some(&byte) = expr.get(offset) {
            let Some(op) = Opcode::from_u8(byte) else {
                return Err(EvalError::UnknownOpcode { byte, offset });
            };
            match op {
                Opcode::Before | Opcode::After | Opcode::Sor => {
                    if offset != 0 {
                        return Err(EvalError::MisplacedLeadingOpcode { opcode: op, offset });
                    }
                    // Valid only as the head marker, where it is a no-op for
                    // evaluation. The classifier already consumed its
                    // meaning; the cursor resumes right after the opcode
                    // byte.
                    offset += 1;
                }
                Opcode::Push => {
                    let guid = read_guid(expr, op, offset)?;
                    let value = if memo.contains(offset) {
                        true
                    } else {
                        let present = self.registry.is_present(&guid);
                        if present {
                            // One-way cache; sound because service presence
                            // never decreases during a boot sequence.
                            memo.insert(offset);
                        }
                        present
                    };
                    stack.push(value)?;
                    offset += 1 + GUID_LEN;
                }
                Opcode::ReplaceTrue => {
                    // A pre-resolved push: the operand bytes are skipped, not
                    // read, but they must exist for the cursor arithmetic to
                    // match the original PUSH.
                    read_guid(expr, op, offset)?;
                    stack.push(true)?;
                    offset += 1 + GUID_LEN;
                }
                Opcode::And => {
                    let rhs = stack.pop()?;
                    let lhs = stack.pop()?;
                    stack.push(lhs & rhs)?;
                    offset += 1;
                }
                Opcode::Or => {
                    let rhs = stack.pop()?;
                    let lhs = stack.pop()?;
                    stack.push(lhs | rhs)?;
                    offset += 1;
                }
                Opcode::Not => {
                    let value = stack.pop()?;
                    stack.push(!value)?;
                    offset += 1;
                }
                Opcode::True => {
                    stack.push(true)?;
                    offset += 1;
                }
                Opcode::False => {
                    stack.push(false)?;
                    offset += 1;
                }
                // The only result-producing opcode; trailing bytes are never
                // examined.
                Opcode::End => return stack.pop().map_err(Into::into),
            }
        }
        Err(EvalError::MissingEnd)
    }
}

/// Reads the 16-byte operand following the opcode at `offset`.
fn read_guid(expr: &[u8], opcode: Opcode, offset: usize) -> Result<Guid, EvalError> {
    let start = offset + 1;
    expr.get(start..start + GUID_LEN)
        .map(Guid::from_slice)
        .ok_or(EvalError::TruncatedOperand { opcode, offset })
}
