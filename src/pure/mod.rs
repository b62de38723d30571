// Pure engine modules
// Everything under pure/ is deterministic and side-effect free: no I/O,
// no logging, no global state. Instrumentation belongs to the callers.

pub mod btree;

pub use btree::{all_leaves_at_same_level, check_invariants, is_valid_btree, BTree};
