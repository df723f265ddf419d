#![doc = include_str!("../../../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[doc(inline)]
pub use depex_bytecode as bytecode;
#[doc(inline)]
pub use depex_eval as eval;

pub use depex_bytecode::{GUID_LEN, Guid, ModuleDescriptor, ModuleFlags, Opcode, ResolvedOffsets};
pub use depex_eval::{EvalStack, Evaluator, GuidSetRegistry, Readiness, ServiceRegistry, StackError};
