// src/dag/registry.rs

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::plan::Plan;
use crate::errors::{Result, SitedagError};
use crate::exec::TaskWork;
use crate::types::TaskName;

/// One element of a dependency list: either a named task or a nested group.
///
/// Nesting lets a single task express shapes like
/// `Sequence(clean, Parallel(html, plans, css))` without inventing
/// intermediate task names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Task(TaskName),
    Group(DependencySpec),
}

impl From<&str> for Step {
    fn from(name: &str) -> Self {
        Step::Task(name.to_string())
    }
}

impl From<String> for Step {
    fn from(name: String) -> Self {
        Step::Task(name)
    }
}

impl From<DependencySpec> for Step {
    fn from(spec: DependencySpec) -> Self {
        Step::Group(spec)
    }
}

/// What a task must run before its own work unit.
///
/// - `None`: nothing.
/// - `Sequence`: each step runs to completion, in order; the first failure
///   aborts the rest.
/// - `Parallel`: all steps start together; the group fails as soon as one
///   member fails.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DependencySpec {
    #[default]
    None,
    Sequence(Vec<Step>),
    Parallel(Vec<Step>),
}

impl DependencySpec {
    pub fn sequence<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Step>,
    {
        DependencySpec::Sequence(steps.into_iter().map(Into::into).collect())
    }

    pub fn parallel<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Step>,
    {
        DependencySpec::Parallel(steps.into_iter().map(Into::into).collect())
    }

    /// Every task name referenced by this spec, including nested groups.
    pub fn task_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        let steps = match self {
            DependencySpec::None => return,
            DependencySpec::Sequence(steps) | DependencySpec::Parallel(steps) => steps,
        };
        for step in steps {
            match step {
                Step::Task(name) => out.push(name.as_str()),
                Step::Group(spec) => spec.collect_names(out),
            }
        }
    }
}

impl fmt::Display for DependencySpec {
    /// `sequence(clean, parallel(html, css))`; empty for `None`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, steps) = match self {
            DependencySpec::None => return Ok(()),
            DependencySpec::Sequence(steps) => ("sequence", steps),
            DependencySpec::Parallel(steps) => ("parallel", steps),
        };
        write!(f, "{label}(")?;
        for (i, step) in steps.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match step {
                Step::Task(name) => f.write_str(name)?,
                Step::Group(spec) => write!(f, "{spec}")?,
            }
        }
        f.write_str(")")
    }
}

/// A registered task: a name, what it depends on, and an optional work unit.
///
/// Composite tasks (like `build`) have dependencies but no work of their own.
#[derive(Clone)]
pub struct Task {
    name: TaskName,
    deps: DependencySpec,
    work: Option<Arc<dyn TaskWork>>,
}

impl Task {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn deps(&self) -> &DependencySpec {
        &self.deps
    }

    pub fn has_work(&self) -> bool {
        self.work.is_some()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("has_work", &self.has_work())
            .finish()
    }
}

/// Name → task table.
///
/// Built once at startup and handed to a [`crate::exec::TaskRunner`].
/// Re-defining a name replaces the previous definition.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: HashMap<TaskName, Arc<Task>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or overwrite a task.
    pub fn define(
        &mut self,
        name: impl Into<TaskName>,
        deps: DependencySpec,
        work: Option<Arc<dyn TaskWork>>,
    ) -> &mut Self {
        let name = name.into();
        if self.tasks.contains_key(&name) {
            debug!(task = %name, "overwriting existing task definition");
        }
        let task = Task {
            name: name.clone(),
            deps,
            work,
        };
        self.tasks.insert(name, Arc::new(task));
        self
    }

    /// Register a leaf task that only has a work unit.
    pub fn define_work<W>(&mut self, name: impl Into<TaskName>, work: W) -> &mut Self
    where
        W: TaskWork + 'static,
    {
        self.define(name, DependencySpec::None, Some(Arc::new(work)))
    }

    /// Register a composite task that only has dependencies.
    pub fn define_group(&mut self, name: impl Into<TaskName>, deps: DependencySpec) -> &mut Self {
        self.define(name, deps, None)
    }

    pub fn get(&self, name: &str) -> Result<Arc<Task>> {
        self.tasks
            .get(name)
            .cloned()
            .ok_or_else(|| SitedagError::UnknownTask(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// All task names, sorted.
    pub fn task_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tasks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Expand a task into an executable [`Plan`].
    ///
    /// Fails with `UnknownTask` if the task or anything it depends on is not
    /// registered, and with `CyclicDependency` if the task transitively
    /// depends on itself.
    pub fn resolve(&self, name: &str) -> Result<Plan> {
        self.check_acyclic(&[name])?;
        self.plan_for(name)
    }

    /// Check every registered task for unknown references and cycles.
    pub fn validate(&self) -> Result<()> {
        let names = self.task_names();
        self.check_acyclic(&names)
    }

    fn check_acyclic(&self, roots: &[&str]) -> Result<()> {
        // Edge direction: task -> dependency.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = roots.to_vec();

        while let Some(name) = stack.pop() {
            if !seen.insert(name) {
                continue;
            }
            let task = self
                .tasks
                .get(name)
                .ok_or_else(|| SitedagError::UnknownTask(name.to_string()))?;
            graph.add_node(task.name.as_str());

            for dep in task.deps.task_names() {
                graph.add_edge(task.name.as_str(), dep, ());
                stack.push(dep);
            }
        }

        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => {
                let path = self.cycle_path(cycle.node_id());
                Err(SitedagError::CyclicDependency(path))
            }
        }
    }

    /// Find a dependency path from `start` back to itself.
    fn cycle_path(&self, start: &str) -> Vec<TaskName> {
        fn walk<'a>(
            registry: &'a TaskRegistry,
            start: &str,
            current: &'a str,
            path: &mut Vec<&'a str>,
            visited: &mut HashSet<&'a str>,
        ) -> bool {
            let Some(task) = registry.tasks.get(current) else {
                return false;
            };
            for dep in task.deps.task_names() {
                if dep == start {
                    path.push(dep);
                    return true;
                }
                if visited.insert(dep) {
                    path.push(dep);
                    if walk(registry, start, dep, path, visited) {
                        return true;
                    }
                    path.pop();
                }
            }
            false
        }

        let mut visited = HashSet::new();
        let Some(task) = self.tasks.get(start) else {
            return vec![start.to_string()];
        };
        let mut path = vec![task.name.as_str()];
        walk(self, start, task.name.as_str(), &mut path, &mut visited);
        path.into_iter().map(str::to_string).collect()
    }

    fn plan_for(&self, name: &str) -> Result<Plan> {
        let task = self.get(name)?;
        let deps = self.plan_spec(&task.deps)?;
        Ok(Plan::Task {
            name: task.name.clone(),
            deps: Box::new(deps),
            work: task.work.clone(),
        })
    }

    fn plan_spec(&self, spec: &DependencySpec) -> Result<Plan> {
        match spec {
            DependencySpec::None => Ok(Plan::Empty),
            DependencySpec::Sequence(steps) => Ok(Plan::Sequence(self.plan_steps(steps)?)),
            DependencySpec::Parallel(steps) => Ok(Plan::Parallel(self.plan_steps(steps)?)),
        }
    }

    fn plan_steps(&self, steps: &[Step]) -> Result<Vec<Plan>> {
        steps
            .iter()
            .map(|step| match step {
                Step::Task(name) => self.plan_for(name),
                Step::Group(spec) => self.plan_spec(spec),
            })
            .collect()
    }
}
