pub mod reconciler;

pub use reconciler::{IdReconciler, ReconcileJob};
