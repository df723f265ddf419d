#![no_main]

use libfuzzer_sys::fuzz_target;

use depex_bytecode::{Guid, ModuleDescriptor};
use depex_eval::{EvalStack, Evaluator, GuidSetRegistry};

fuzz_target!(|data: &[u8]| {
    let mut registry = GuidSetRegistry::new();
    registry.register(Guid::repeat_byte(0x11));

    let mut module = ModuleDescriptor::new(Some(data));
    module.classify();

    let mut stack = EvalStack::new();
    let evaluator = Evaluator::new(&registry);
    // Evaluate twice: the second pass additionally exercises the memo table.
    let first = evaluator.is_schedulable(&mut module, &mut stack);
    let second = evaluator.is_schedulable(&mut module, &mut stack);
    assert_eq!(first, second);
});
