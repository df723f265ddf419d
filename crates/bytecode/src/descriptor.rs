//! Per-module descriptors and the classification pre-pass.

use crate::{GUID_LEN, Guid, Opcode};
use rustc_hash::FxHashSet;

bitflags::bitflags! {
    /// Classification flags extracted from a module's dependency expression.
    ///
    /// Sticky for the module's lifetime: the engine only ever sets them, in
    /// [`ModuleDescriptor::classify`]. The external dispatcher clears
    /// `ONE_SHOT` at the moment it decides to force-schedule the module, and
    /// `BEFORE`/`AFTER` once ordering has been resolved.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ModuleFlags: u8 {
        /// Must run strictly before the peer named by `before_after_guid`.
        const BEFORE   = 1 << 0;
        /// Must run strictly after the peer named by `before_after_guid`.
        const AFTER    = 1 << 1;
        /// Schedule-on-request: never auto-scheduled by predicate.
        const ONE_SHOT = 1 << 2;
        /// Evaluated by the ordinary boolean predicate.
        const ORDINARY = 1 << 3;
    }
}

/// Insert-only set of expression byte offsets whose push instruction has
/// already resolved to "present".
///
/// This is the side-table replacement for evaluators that rewrite a resolved
/// `PUSH` to [`Opcode::ReplaceTrue`] in place: same intent (skip redundant
/// registry lookups across dispatch passes), but the expression bytes stay
/// immutable. Entries are never removed; the design assumes service presence
/// is monotonically non-decreasing over a boot sequence.
#[derive(Clone, Debug, Default)]
pub struct ResolvedOffsets(FxHashSet<usize>);

impl ResolvedOffsets {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the push instruction at `offset` is known to be
    /// "present".
    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        self.0.contains(&offset)
    }

    /// Records that the push instruction at `offset` resolved to "present".
    #[inline]
    pub fn insert(&mut self, offset: usize) {
        self.0.insert(offset);
    }

    /// Number of resolved offsets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no offset has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-module state shared between the external dispatcher and the engine.
///
/// The dispatcher constructs one descriptor per discovered module, calls
/// [`classify`](Self::classify) exactly once, and then offers the module to
/// the scheduler gate zero or more times per dispatch pass.
#[derive(Clone, Debug, Default)]
pub struct ModuleDescriptor<'a> {
    /// The raw dependency expression. `None` means the module carries no
    /// predicate and is ready as soon as the basic platform services exist.
    pub expression: Option<&'a [u8]>,
    /// Classification flags; see [`ModuleFlags`].
    pub flags: ModuleFlags,
    /// The named peer, when `BEFORE` or `AFTER` is set and the operand was
    /// fully present in the stream.
    pub before_after_guid: Option<Guid>,
    /// Memoized push results for this module's expression.
    pub memo: ResolvedOffsets,
}

impl Default for ModuleFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a> ModuleDescriptor<'a> {
    /// Creates a descriptor for a module with the given expression bytes.
    pub fn new(expression: Option<&'a [u8]>) -> Self {
        Self {
            expression,
            flags: ModuleFlags::empty(),
            before_after_guid: None,
            memo: ResolvedOffsets::new(),
        }
    }

    /// Classification pre-pass.
    ///
    /// Runs exactly once per module, before the first scheduler-gate call.
    /// Inspects only the first opcode byte: `SOR` marks the module one-shot,
    /// anything else marks it an ordinary dependent, and `BEFORE`/`AFTER`
    /// additionally record the ordering constraint and its peer identifier.
    /// Never reads past the expression slice, never mutates its bytes.
    pub fn classify(&mut self) {
        let Some(expr) = self.expression else { return };
        let Some(&first) = expr.first() else {
            // Present but empty: there is no leading opcode to inspect, so
            // the module is an ordinary dependent (evaluation of the empty
            // stream then fails closed on the missing END).
            self.flags |= ModuleFlags::ORDINARY;
            return;
        };
        match Opcode::from_u8(first) {
            Some(Opcode::Sor) => self.flags |= ModuleFlags::ONE_SHOT,
            op => {
                self.flags |= ModuleFlags::ORDINARY;
                match op {
                    Some(Opcode::Before) => self.flags |= ModuleFlags::BEFORE,
                    Some(Opcode::After) => self.flags |= ModuleFlags::AFTER,
                    _ => {}
                }
            }
        }
        // A truncated operand leaves the peer unset; the gate rejects
        // ordering-constrained modules unconditionally either way.
        if self.is_ordering_constrained()
            && let Some(guid) = expr.get(1..1 + GUID_LEN)
        {
            self.before_after_guid = Some(Guid::from_slice(guid));
        }
    }

    /// Returns `true` if the module is scheduled through the external
    /// before/after resolution mechanism rather than the boolean predicate.
    #[inline]
    pub fn is_ordering_constrained(&self) -> bool {
        self.flags.intersects(ModuleFlags::BEFORE | ModuleFlags::AFTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::{Expect, expect};

    fn check(expression: Option<&[u8]>, expect: Expect) {
        let mut module = ModuleDescriptor::new(expression);
        module.classify();
        let actual = format!(
            "flags: {:?}\nbefore_after_guid: {:?}\n",
            module.flags, module.before_after_guid
        );
        expect.assert_eq(&actual);
    }

    #[test]
    fn absent_expression() {
        check(
            None,
            expect![[r#"
                flags: ModuleFlags(0x0)
                before_after_guid: None
            "#]],
        );
    }

    #[test]
    fn empty_expression() {
        check(
            Some(&[]),
            expect![[r#"
                flags: ModuleFlags(ORDINARY)
                before_after_guid: None
            "#]],
        );
    }

    #[test]
    fn one_shot() {
        check(
            Some(&[Opcode::Sor as u8, Opcode::True as u8, Opcode::End as u8]),
            expect![[r#"
                flags: ModuleFlags(ONE_SHOT)
                before_after_guid: None
            "#]],
        );
    }

    #[test]
    fn ordinary_predicate() {
        check(
            Some(&[Opcode::True as u8, Opcode::End as u8]),
            expect![[r#"
                flags: ModuleFlags(ORDINARY)
                before_after_guid: None
            "#]],
        );
    }

    #[test]
    fn before_with_peer() {
        let mut expr = vec![Opcode::Before as u8];
        expr.extend_from_slice(&[0xAB; GUID_LEN]);
        check(
            Some(&expr),
            expect![[r#"
                flags: ModuleFlags(BEFORE | ORDINARY)
                before_after_guid: Some(0xabababababababababababababababab)
            "#]],
        );
    }

    #[test]
    fn after_with_truncated_peer() {
        check(
            Some(&[Opcode::After as u8, 0x01, 0x02]),
            expect![[r#"
                flags: ModuleFlags(AFTER | ORDINARY)
                before_after_guid: None
            "#]],
        );
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn memo_offsets_do_not_alias() {
        // Offsets are keyed by the full cursor width; an offset past 4 GiB
        // must not collide with its low 32 bits.
        let far = u32::MAX as usize + 1;
        let mut memo = ResolvedOffsets::new();
        memo.insert(far);
        assert!(memo.contains(far));
        assert!(!memo.contains(0));
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn classification_is_exclusive() {
        let sor = [Opcode::Sor as u8, Opcode::True as u8, Opcode::End as u8];
        let mut module = ModuleDescriptor::new(Some(&sor));
        module.classify();
        assert!(module.flags.contains(ModuleFlags::ONE_SHOT));
        assert!(!module.flags.contains(ModuleFlags::ORDINARY));

        let plain = [Opcode::True as u8, Opcode::End as u8];
        let mut module = ModuleDescriptor::new(Some(&plain));
        module.classify();
        assert!(!module.flags.contains(ModuleFlags::ONE_SHOT));
        assert!(module.flags.contains(ModuleFlags::ORDINARY));
    }
}
