//! Dependency-expression opcodes.

use std::fmt;

/// Byte length of a service/module identifier operand.
pub const GUID_LEN: usize = 16;

/// A single dependency-expression opcode.
///
/// Numeric values are fixed by the hosting platform's depex encoding and must
/// match the byte stream exactly. Instructions are one opcode byte optionally
/// followed by a fixed-size operand; there is no length prefix, so consumers
/// must bounds-check every operand read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// `BEFORE <guid>`: the module must run strictly before the named peer.
    /// Valid only as the first opcode of a stream.
    Before = 0x00,
    /// `AFTER <guid>`: the module must run strictly after the named peer.
    /// Valid only as the first opcode of a stream.
    After = 0x01,
    /// `PUSH <guid>`: push whether the named service is currently present.
    Push = 0x02,
    /// Pop two values, push their conjunction.
    And = 0x03,
    /// Pop two values, push their disjunction.
    Or = 0x04,
    /// Pop one value, push its negation.
    Not = 0x05,
    /// Push the literal `true`.
    True = 0x06,
    /// Push the literal `false`.
    False = 0x07,
    /// Pop one value and yield it as the final verdict. The only
    /// result-producing opcode; bytes past it are never examined.
    End = 0x08,
    /// Schedule-on-request marker: the module is never auto-scheduled and
    /// must be force-run by the dispatcher. Valid only as the first opcode.
    Sor = 0x09,
    /// Memoized replacement for a [`Push`](Self::Push) that already resolved
    /// to "present": pushes `true` without a registry query.
    ///
    /// Never emitted by this implementation (memoization is kept in a side
    /// table instead); accepted on input for buffers pre-processed by an
    /// in-place-mutating evaluator. The 16 operand bytes are retained in the
    /// stream purely so cursor arithmetic matches the original `PUSH`.
    ReplaceTrue = 0xFF,
}

impl Opcode {
    /// Decodes a raw opcode byte.
    #[inline]
    pub const fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0x00 => Self::Before,
            0x01 => Self::After,
            0x02 => Self::Push,
            0x03 => Self::And,
            0x04 => Self::Or,
            0x05 => Self::Not,
            0x06 => Self::True,
            0x07 => Self::False,
            0x08 => Self::End,
            0x09 => Self::Sor,
            0xFF => Self::ReplaceTrue,
            _ => return None,
        })
    }

    /// Returns the number of operand bytes following the opcode byte in the
    /// stream grammar.
    #[inline]
    pub const fn operand_len(self) -> usize {
        match self {
            Self::Before | Self::After | Self::Push | Self::ReplaceTrue => GUID_LEN,
            _ => 0,
        }
    }

    /// Returns `true` if this opcode is valid only as the first byte of a
    /// stream (`BEFORE`, `AFTER`, `SOR`).
    #[inline]
    pub const fn is_leading_only(self) -> bool {
        matches!(self, Self::Before | Self::After | Self::Sor)
    }

    /// Returns the mnemonic of the opcode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Before => "BEFORE",
            Self::After => "AFTER",
            Self::Push => "PUSH",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::End => "END",
            Self::Sor => "SOR",
            Self::ReplaceTrue => "REPLACE_TRUE",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
