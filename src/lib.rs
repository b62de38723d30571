// Gamedex - A B-tree backed catalog database for game records
// Root library module

pub mod builders;
pub mod catalog_store;
pub mod contracts;
pub mod observability;
pub mod pure;
pub mod types;

// Re-export key types
pub use observability::{
    init_logging, init_logging_with_level, log_operation, record_metric, with_trace_id, MetricType,
    Operation, OperationContext,
};

pub use contracts::{Catalog, Record, RemoveOutcome};

// Re-export validated types
pub use types::{MinDegree, RecordKey};

// Re-export builders
pub use builders::RecordBuilder;

// Re-export the engine
pub use pure::btree;
pub use pure::btree::BTree;

// Re-export persistence
pub use catalog_store::{load_catalog, save_catalog, save_keys};

// Test modules
#[cfg(test)]
mod btree_test;
