#![no_main]

use libfuzzer_sys::fuzz_target;

use depex_bytecode::ModuleDescriptor;

fuzz_target!(|data: &[u8]| {
    let mut module = ModuleDescriptor::new(Some(data));
    module.classify();
});
