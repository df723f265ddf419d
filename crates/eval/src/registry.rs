//! The service-registry seam.

use depex_bytecode::Guid;
use rustc_hash::FxHashSet;

/// The live service registry, as seen by the evaluator.
///
/// Implemented by the host; the engine only ever reads it. Queries must be
/// free of side effects observable to the engine, which may issue any number
/// of them per evaluation.
pub trait ServiceRegistry {
    /// Returns `true` if the service named by `id` is currently present.
    fn is_present(&self, id: &Guid) -> bool;

    /// Returns `true` if all basic platform services are available.
    ///
    /// This single predicate is the whole readiness verdict for modules that
    /// carry no dependency expression.
    fn base_services_present(&self) -> bool;
}

impl<R: ServiceRegistry + ?Sized> ServiceRegistry for &R {
    fn is_present(&self, id: &Guid) -> bool {
        (**self).is_present(id)
    }

    fn base_services_present(&self) -> bool {
        (**self).base_services_present()
    }
}

/// Set-backed [`ServiceRegistry`] for hosts that track presence as a plain
/// GUID set.
///
/// Services are only ever added; presence is assumed monotonic over a boot
/// sequence, which is also what makes the evaluator's push memoization sound.
#[derive(Clone, Debug, Default)]
pub struct GuidSetRegistry {
    present: FxHashSet<Guid>,
}

impl GuidSetRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the service named by `id` as present.
    pub fn register(&mut self, id: Guid) {
        self.present.insert(id);
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.present.len()
    }

    /// Returns `true` if no service has been registered.
    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }
}

impl ServiceRegistry for GuidSetRegistry {
    fn is_present(&self, id: &Guid) -> bool {
        self.present.contains(id)
    }

    fn base_services_present(&self) -> bool {
        true
    }
}
