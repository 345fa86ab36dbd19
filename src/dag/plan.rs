// src/dag/plan.rs

use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::exec::TaskWork;
use crate::types::TaskName;

/// Executable expansion of a task and everything it depends on.
///
/// Produced by [`crate::dag::TaskRegistry::resolve`] and interpreted by
/// [`crate::exec::TaskRunner`]. A plan is a tree: a task reached through two
/// different paths appears (and runs) twice.
#[derive(Clone)]
pub enum Plan {
    /// Run `deps`, then the task's own work (if any).
    Task {
        name: TaskName,
        deps: Box<Plan>,
        work: Option<Arc<dyn TaskWork>>,
    },
    Sequence(Vec<Plan>),
    Parallel(Vec<Plan>),
    Empty,
}

impl Plan {
    /// Names of the tasks that carry a work unit, in depth-first order.
    pub fn work_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_work_names(&mut out);
        out
    }

    fn collect_work_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Plan::Task { name, deps, work } => {
                deps.collect_work_names(out);
                if work.is_some() {
                    out.push(name.as_str());
                }
            }
            Plan::Sequence(children) | Plan::Parallel(children) => {
                for child in children {
                    child.collect_work_names(out);
                }
            }
            Plan::Empty => {}
        }
    }

    /// Indented tree rendering, used by `--dry-run`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        match self {
            Plan::Task { name, deps, work } => {
                let marker = if work.is_some() { "" } else { " (group)" };
                let _ = writeln!(out, "{pad}- {name}{marker}");
                deps.render_into(out, depth + 1);
            }
            Plan::Sequence(children) => {
                let _ = writeln!(out, "{pad}sequence:");
                for child in children {
                    child.render_into(out, depth + 1);
                }
            }
            Plan::Parallel(children) => {
                let _ = writeln!(out, "{pad}parallel:");
                for child in children {
                    child.render_into(out, depth + 1);
                }
            }
            Plan::Empty => {}
        }
    }
}

impl fmt::Debug for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Task { name, deps, work } => f
                .debug_struct("Task")
                .field("name", name)
                .field("deps", deps)
                .field("has_work", &work.is_some())
                .finish(),
            Plan::Sequence(children) => f.debug_tuple("Sequence").field(children).finish(),
            Plan::Parallel(children) => f.debug_tuple("Parallel").field(children).finish(),
            Plan::Empty => f.write_str("Empty"),
        }
    }
}
