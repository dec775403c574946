// Tasklist - local to-do list backed by a persistent key-value store

pub mod config;
pub mod context;
pub mod filter;
pub mod kv;
pub mod render;
pub mod sqlite;
pub mod store;
pub mod task;
pub mod theme;

// Re-export main types for convenience
pub use config::{Backend, Config};
pub use context::TaskContext;
pub use filter::FilterType;
pub use kv::{FileKv, KvStore, MemoryKv};
pub use sqlite::SqliteKv;
pub use store::{DARK_MODE_KEY, DragState, Persistence, TASKS_KEY, TaskCounts, TaskStore};
pub use task::Task;
pub use theme::{FixedTheme, TerminalTheme, ThemeSignal};
