pub mod codec;
pub mod files;
pub mod kv;

pub use codec::{
    clear_running_marker, encode, load_categories, load_tasks, read_running_marker,
    write_running_marker, RunningMarker,
};
pub use files::{
    atomic_write, ensure_dir, find_local_data_dir, get_data_dir, init_local_data_dir, quarantine_file,
    read_file, remove_file, DATA_DIR_NAME,
};
pub use kv::{FileStore, KeyValueStore, MemoryStore, StorageKey};

#[cfg(test)]
pub(crate) use kv::FailingStore;
