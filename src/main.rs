use clap::{Parser, Subcommand};
use eyre::{Result, eyre};
use std::path::PathBuf;
use tasklist::render::{self, short_id};
use tasklist::{
    Backend, Config, FileKv, FilterType, FixedTheme, KvStore, MemoryKv, SqliteKv, TaskContext, TaskStore,
    TerminalTheme, ThemeSignal,
};
use tracing::Level;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "Tasklist - a local to-do list with persistent storage")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding the task store (default: platform data dir)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Storage backend: sqlite, file or memory
    #[arg(short, long)]
    backend: Option<Backend>,

    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List tasks
    List {
        /// all, completed or pending
        #[arg(short, long, default_value = "all")]
        filter: FilterType,
    },

    /// Toggle a task between pending and completed
    Toggle {
        /// Task id, id suffix, or position in the listed view
        target: String,

        #[arg(short, long, default_value = "all")]
        filter: FilterType,
    },

    /// Delete a task
    Delete {
        /// Task id, id suffix, or position in the listed view
        target: String,

        #[arg(short, long, default_value = "all")]
        filter: FilterType,
    },

    /// Move a task to another position in the listed view
    Move {
        from: usize,
        to: usize,

        #[arg(short, long, default_value = "all")]
        filter: FilterType,
    },

    /// Show or toggle the dark theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },

    /// Delete all completed tasks
    ClearCompleted,
}

#[derive(Subcommand)]
enum ThemeAction {
    Show,
    Toggle,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing; stdout is reserved for command output
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let backend = cli.backend.unwrap_or(config.backend);
    let store_path = cli.store_path.clone().unwrap_or_else(|| config.resolved_store_path());

    let kv: Box<dyn KvStore> = match backend {
        Backend::Sqlite => Box::new(SqliteKv::open(&store_path)?),
        Backend::File => Box::new(FileKv::open(&store_path)?),
        Backend::Memory => Box::new(MemoryKv::new()),
    };

    let signal: Box<dyn ThemeSignal> = match config.prefers_dark {
        Some(dark) => Box::new(FixedTheme(dark)),
        None => Box::new(TerminalTheme::from_env()),
    };

    let mut context = TaskContext::new();
    context.provide(TaskStore::open(kv, signal.as_ref()))?;

    run(cli.command, context.store_mut()?)
}

fn run<K: KvStore>(command: Commands, store: &mut TaskStore<K>) -> Result<()> {
    match command {
        Commands::Add { text } => match store.add_task(&text.join(" ")) {
            Some(id) => println!("Added {}", short_id(&id)),
            None => return Err(eyre!("Task cannot be empty")),
        },
        Commands::List { filter } => {
            store.set_filter_type(filter);
            print!("{}", render::render_list(store));
        }
        Commands::Toggle { target, filter } => {
            store.set_filter_type(filter);
            let id = resolve_target(store, &target)?;
            store.toggle_task(&id);
            let state = match store.get_task(&id) {
                Some(task) if task.completed => "completed",
                _ => "pending",
            };
            println!("Marked {} {}", short_id(&id), state);
        }
        Commands::Delete { target, filter } => {
            store.set_filter_type(filter);
            let id = resolve_target(store, &target)?;
            store.delete_task(&id);
            println!("Deleted {}", short_id(&id));
        }
        Commands::Move { from, to, filter } => {
            store.set_filter_type(filter);
            let (Some(from), Some(to)) = (from.checked_sub(1), to.checked_sub(1)) else {
                return Err(eyre!("Positions start at 1"));
            };

            store.begin_drag();
            let moved = store.reorder_visible(from, to);
            store.end_drag();

            if !moved {
                println!("Nothing to move");
            }
            print!("{}", render::render_list(store));
        }
        Commands::Theme { action } => {
            if let Some(ThemeAction::Toggle) = action {
                store.toggle_dark_mode();
            }
            println!("{}", if store.dark_mode() { "dark" } else { "light" });
        }
        Commands::ClearCompleted => {
            let removed = store.clear_completed();
            println!("Removed {} completed task(s)", removed);
        }
    }

    if store.is_memory_only() {
        eprintln!("Warning: changes could not be saved");
    }

    Ok(())
}

/// Resolve a position in the filtered view, a full id, or a unique id suffix
fn resolve_target<K: KvStore>(store: &TaskStore<K>, target: &str) -> Result<String> {
    let target = target.trim();
    if target.is_empty() {
        return Err(eyre!("Task id cannot be empty"));
    }

    // Numbers that name no position may still be an all-digit id suffix
    if let Ok(position) = target.parse::<usize>() {
        let visible = store.filtered_tasks();
        if let Some(task) = position.checked_sub(1).and_then(|i| visible.get(i)) {
            return Ok(task.id.clone());
        }
    }

    if let Some(task) = store.get_task(target) {
        return Ok(task.id.clone());
    }

    let matches: Vec<_> = store.tasks().iter().filter(|task| task.id.ends_with(target)).collect();
    match matches.as_slice() {
        [task] => Ok(task.id.clone()),
        [] => Err(eyre!("No task matching {}", target)),
        _ => Err(eyre!("Ambiguous task id {}", target)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, text: &str) -> tasklist::Task {
        tasklist::Task {
            id: id.to_string(),
            text: text.to_string(),
            completed: false,
            created_at: chrono::Utc::now(),
        }
    }

    fn store_with(tasks: &[tasklist::Task]) -> TaskStore<MemoryKv> {
        let mut kv = MemoryKv::new();
        kv.set(tasklist::TASKS_KEY, &serde_json::to_string(tasks).unwrap()).unwrap();
        TaskStore::open(kv, &FixedTheme(false))
    }

    #[test]
    fn test_resolve_position() {
        let store = store_with(&[task("0190-aaaa", "a"), task("0190-bbbb", "b")]);
        assert_eq!(resolve_target(&store, "2").unwrap(), "0190-bbbb");
    }

    #[test]
    fn test_resolve_position_in_filtered_view() {
        let mut store = store_with(&[task("0190-aaaa", "a"), task("0190-bbbb", "b")]);
        store.toggle_task("0190-bbbb");
        store.set_filter_type(FilterType::Completed);
        assert_eq!(resolve_target(&store, "1").unwrap(), "0190-bbbb");
    }

    #[test]
    fn test_resolve_all_digit_suffix() {
        let id = "0190f3a2-7b1c-7d4e-9a6b-123412345678";
        let store = store_with(&[task(id, "a"), task("0190f3a2-7b1c-7d4e-9a6b-abcdefabcdef", "b")]);

        let shown = short_id(id);
        assert_eq!(shown, "12345678");
        assert_eq!(resolve_target(&store, shown).unwrap(), id);
    }

    #[test]
    fn test_resolve_full_id_and_suffix() {
        let store = store_with(&[task("0190-aaaa", "a"), task("0190-bbbb", "b")]);
        assert_eq!(resolve_target(&store, "0190-aaaa").unwrap(), "0190-aaaa");
        assert_eq!(resolve_target(&store, "bbbb").unwrap(), "0190-bbbb");
    }

    #[test]
    fn test_resolve_failures() {
        let store = store_with(&[task("0190-aaaa", "a"), task("0191-aaaa", "b")]);
        assert!(resolve_target(&store, "").is_err());
        assert!(resolve_target(&store, "7").is_err());
        assert!(resolve_target(&store, "zzzz").is_err());
        assert!(resolve_target(&store, "aaaa").is_err());
    }
}
