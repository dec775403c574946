// Task store: in-memory task list mirrored to a key-value backing store

use crate::filter::FilterType;
use crate::kv::KvStore;
use crate::task::Task;
use crate::theme::ThemeSignal;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// Backing-store key holding the JSON task array
pub const TASKS_KEY: &str = "tasks";

/// Backing-store key holding `"true"` or `"false"`
pub const DARK_MODE_KEY: &str = "darkMode";

/// Drag-and-drop interaction state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

/// Whether mutations are still being written to the backing store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Persistence {
    #[default]
    Durable,
    /// A write failed earlier in this session; nothing is written anymore
    MemoryOnly,
}

/// Per-filter task totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

/// Owns the task list, filter selection, theme flag and drag state
///
/// Every change to the task list or the theme flag is written through to the
/// backing store as a full overwrite before the call returns. The filter and
/// drag state are session-only.
pub struct TaskStore<K: KvStore> {
    backend: K,
    tasks: Vec<Task>,
    filter_type: FilterType,
    dark_mode: bool,
    drag: DragState,
    persistence: Persistence,
}

impl<K: KvStore> TaskStore<K> {
    /// Create the store and hydrate it from the backing store
    ///
    /// Never fails: unreadable or corrupt data leaves the task list empty, and
    /// a missing theme preference is taken from `signal`.
    pub fn open<S: ThemeSignal + ?Sized>(backend: K, signal: &S) -> Self {
        let tasks = load_tasks(&backend);
        let dark_mode = load_dark_mode(&backend, signal);

        info!(count = tasks.len(), dark_mode, "Task store hydrated");

        Self {
            backend,
            tasks,
            filter_type: FilterType::default(),
            dark_mode,
            drag: DragState::default(),
            persistence: Persistence::default(),
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// All tasks in display order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Tasks visible under the current filter, in display order
    pub fn filtered_tasks(&self) -> Vec<&Task> {
        let filter = self.filter_type;
        self.tasks.iter().filter(|task| filter.matches(task)).collect()
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        self.drag == DragState::Dragging
    }

    pub fn persistence(&self) -> Persistence {
        self.persistence
    }

    pub fn is_memory_only(&self) -> bool {
        self.persistence == Persistence::MemoryOnly
    }

    pub fn counts(&self) -> TaskCounts {
        let completed = self.tasks.iter().filter(|task| task.completed).count();
        TaskCounts {
            total: self.tasks.len(),
            completed,
            pending: self.tasks.len() - completed,
        }
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    /// Give up the store, handing back its backing store
    pub fn into_backend(self) -> K {
        self.backend
    }

    // ========================================================================
    // Task mutations
    // ========================================================================

    /// Append a new task; blank text is ignored
    ///
    /// Returns the id of the created task.
    pub fn add_task(&mut self, text: &str) -> Option<String> {
        let task = Task::new(text)?;
        let id = task.id.clone();

        debug!(id = %id, "add_task: appending");
        self.tasks.push(task);
        self.save_tasks();

        Some(id)
    }

    /// Remove the task with the given id, if any
    pub fn delete_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);

        if self.tasks.len() == before {
            debug!(id, "delete_task: no such task");
            return false;
        }

        self.save_tasks();
        true
    }

    /// Flip the completion flag of the task with the given id, if any
    pub fn toggle_task(&mut self, id: &str) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!(id, "toggle_task: no such task");
            return false;
        };

        task.completed = !task.completed;
        self.save_tasks();
        true
    }

    /// Move the task at `from` to `to`, shifting the tasks in between
    ///
    /// Both positions index the unfiltered list. Out-of-range positions are
    /// ignored.
    pub fn reorder_tasks(&mut self, from: usize, to: usize) -> bool {
        let len = self.tasks.len();
        if from >= len || to >= len {
            debug!(from, to, len, "reorder_tasks: index out of range");
            return false;
        }
        if from == to {
            return false;
        }

        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        self.save_tasks();
        true
    }

    /// Move a task using positions in the current filtered view
    ///
    /// The dragged and target tasks are located by id in the full list, so
    /// hidden tasks keep their places when a filter is active.
    pub fn reorder_visible(&mut self, from: usize, to: usize) -> bool {
        let (dragged_id, target_id) = {
            let visible = self.filtered_tasks();
            match (visible.get(from), visible.get(to)) {
                (Some(dragged), Some(target)) => (dragged.id.clone(), target.id.clone()),
                _ => {
                    debug!(from, to, len = visible.len(), "reorder_visible: index out of range");
                    return false;
                }
            }
        };

        let from = self.tasks.iter().position(|task| task.id == dragged_id);
        let to = self.tasks.iter().position(|task| task.id == target_id);
        match (from, to) {
            (Some(from), Some(to)) => self.reorder_tasks(from, to),
            _ => false,
        }
    }

    /// Remove every completed task in a single write
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);

        let removed = before - self.tasks.len();
        if removed > 0 {
            self.save_tasks();
        }
        removed
    }

    // ========================================================================
    // View and theme state
    // ========================================================================

    pub fn set_filter_type(&mut self, filter: FilterType) {
        self.filter_type = filter;
    }

    /// Flip the theme flag and persist it, returning the new value
    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        let value = self.dark_mode.to_string();
        self.write(DARK_MODE_KEY, &value);
        self.dark_mode
    }

    pub fn begin_drag(&mut self) {
        self.drag = DragState::Dragging;
    }

    pub fn end_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    fn save_tasks(&mut self) {
        match serde_json::to_string(&self.tasks) {
            Ok(json) => self.write(TASKS_KEY, &json),
            Err(e) => error!(error = ?e, "Failed to serialize tasks"),
        }
    }

    fn write(&mut self, key: &str, value: &str) {
        if self.persistence == Persistence::MemoryOnly {
            debug!(key, "Skipping write in memory-only mode");
            return;
        }

        if let Err(e) = self.backend.set(key, value) {
            error!(key, error = ?e, "Failed to persist, continuing in memory-only mode");
            self.persistence = Persistence::MemoryOnly;
        }
    }
}

fn load_tasks<K: KvStore>(backend: &K) -> Vec<Task> {
    let raw = match backend.get(TASKS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = ?e, "Failed to read stored tasks, starting empty");
            return Vec::new();
        }
    };

    let mut tasks: Vec<Task> = match serde_json::from_str(&raw) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(error = ?e, "Failed to parse stored tasks, starting empty");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    tasks.retain(|task| {
        if task.text.trim().is_empty() {
            warn!(id = %task.id, "Dropping stored task with blank text");
            return false;
        }

        let fresh = seen.insert(task.id.clone());
        if !fresh {
            warn!(id = %task.id, "Dropping stored task with duplicate id");
        }
        fresh
    });

    tasks
}

fn load_dark_mode<K: KvStore, S: ThemeSignal + ?Sized>(backend: &K, signal: &S) -> bool {
    match backend.get(DARK_MODE_KEY) {
        Ok(Some(value)) if !value.is_empty() => value.trim() == "true",
        Ok(_) => signal.prefers_dark(),
        Err(e) => {
            warn!(error = ?e, "Failed to read stored theme, using system preference");
            signal.prefers_dark()
        }
    }
}
