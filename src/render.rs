// Terminal rendering of the task store

use crate::kv::KvStore;
use crate::store::TaskStore;
use crate::task::Task;
use colored::{Color, Colorize};

pub const EMPTY_MESSAGE: &str = "No tasks found. Add a new task to get started.";

/// Colours for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: Color,
    pub done: Color,
    pub muted: Color,
    pub accent: Color,
}

impl Palette {
    pub fn for_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self {
                text: Color::BrightWhite,
                done: Color::BrightGreen,
                muted: Color::BrightBlack,
                accent: Color::BrightCyan,
            }
        } else {
            Self {
                text: Color::Black,
                done: Color::Green,
                muted: Color::White,
                accent: Color::Blue,
            }
        }
    }
}

/// Render the filtered view with 1-based positions, a header and a summary
pub fn render_list<K: KvStore>(store: &TaskStore<K>) -> String {
    let palette = Palette::for_mode(store.dark_mode());
    let visible = store.filtered_tasks();
    let mut out = String::new();

    out.push_str(&format!(
        "{}\n",
        format!("Tasks ({})", store.filter_type()).color(palette.accent).bold()
    ));

    if visible.is_empty() {
        out.push_str(&format!("  {}\n", EMPTY_MESSAGE.color(palette.muted)));
    }

    for (i, task) in visible.iter().enumerate() {
        out.push_str(&render_task(i + 1, task, &palette));
        out.push('\n');
    }

    let counts = store.counts();
    out.push_str(&format!(
        "{}\n",
        format!(
            "{} total, {} completed, {} pending",
            counts.total, counts.completed, counts.pending
        )
        .color(palette.muted)
    ));

    if store.is_memory_only() {
        out.push_str(&format!("{}\n", "Changes are not being saved".yellow()));
    }

    out
}

fn render_task(position: usize, task: &Task, palette: &Palette) -> String {
    let marker = if task.completed { "[x]" } else { "[ ]" };
    let text = if task.completed {
        task.text.color(palette.done).strikethrough()
    } else {
        task.text.color(palette.text)
    };
    let meta = format!("{} {}", short_id(&task.id), task.created_at.format("%Y-%m-%d %H:%M"));

    format!("{:>3}. {} {}  {}", position, marker, text, meta.color(palette.muted))
}

/// Trailing segment of an id, enough to tell tasks apart on screen
pub fn short_id(id: &str) -> &str {
    match id.char_indices().rev().nth(7) {
        Some((start, _)) => &id[start..],
        None => id,
    }
}
