//! Database entities backing the attendance manager.

pub mod storage_slot;
