pub mod partitions;

pub use partitions::{append_rows, PartitionStore};
