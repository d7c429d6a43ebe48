//! Command-line host for a demo state container.
//!
//! Builds a counter/todo container, reads one JSON action envelope per line
//! from stdin, dispatches it, and prints every published state to stdout as a
//! JSON line.
//!
//! # Usage
//!
//! ```text
//! state-containers [config.toml] < actions.jsonl
//! ```
//!
//! ```text
//! {"type": "increment", "args": [5]}
//! {"type": "add_todo", "args": ["buy milk"]}
//! {"type": "toggle_todo", "args": [0]}
//! {"type": "@@SET", "args": [{"count": 0, "todos": []}]}
//! ```
//!
//! A line that fails to parse or dispatch is reported on stderr; processing
//! continues with the next line. Tracing goes to stderr or to
//! `trace_file` as configured.

use serde::{Deserialize, Serialize};
use state_containers::observability::init_tracing;
use state_containers::{
    ActionEnvelope, Config, Container, ContainerError, LoggingMiddleware, PureSelectors,
    PureTransitions, RecordingMiddleware, Result,
};
use std::io::{self, BufRead};
use std::process::ExitCode;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Todo {
    text: String,
    done: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct AppState {
    count: i64,
    todos: Vec<Todo>,
}

fn transitions() -> PureTransitions<AppState> {
    PureTransitions::new()
        .with("increment", |state: &AppState, (by,): (i64,)| AppState {
            count: state.count + by,
            ..state.clone()
        })
        .with("decrement", |state: &AppState, (by,): (i64,)| AppState {
            count: state.count - by,
            ..state.clone()
        })
        .with("add_todo", |state: &AppState, (text,): (String,)| {
            let mut todos = state.todos.clone();
            todos.push(Todo { text, done: false });
            AppState {
                todos,
                ..state.clone()
            }
        })
        .try_with("toggle_todo", |state: &AppState, (index,): (usize,)| {
            if index >= state.todos.len() {
                return Err(format!("no todo at index {index}"));
            }
            let mut todos = state.todos.clone();
            todos[index].done = !todos[index].done;
            Ok(AppState {
                todos,
                ..state.clone()
            })
        })
        .with("clear_done", |state: &AppState, (): ()| AppState {
            todos: state.todos.iter().filter(|t| !t.done).cloned().collect(),
            ..state.clone()
        })
}

fn selectors() -> PureSelectors<AppState> {
    PureSelectors::new()
        .with("count", |state: &AppState, (): ()| state.count)
        .with("remaining", |state: &AppState, (): ()| {
            state.todos.iter().filter(|t| !t.done).count()
        })
}

fn load_config() -> Result<Config> {
    match std::env::args_os().nth(1) {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}

fn run() -> Result<()> {
    let config = load_config()?;
    init_tracing(&config);

    let recorder = RecordingMiddleware::from_config(&config);
    let history = recorder.recording();

    let container = Container::builder(AppState::default())
        .config(&config)
        .transitions(transitions())
        .selectors(selectors())
        .middleware(recorder)
        .middleware(LoggingMiddleware::new())
        .build()?;

    let _printer = container.subscribe(|state| match serde_json::to_string(&**state) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!(error = %e, "state is not serializable"),
    });

    for (number, line) in io::stdin().lock().lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let outcome = serde_json::from_str::<ActionEnvelope>(&line)
            .map_err(ContainerError::from)
            .and_then(ActionEnvelope::into_action::<AppState>)
            .and_then(|action| container.dispatch(action));

        if let Err(e) = outcome {
            tracing::warn!(line = number + 1, error = %e, "action rejected");
            eprintln!("line {}: {e}", number + 1);
        }
    }

    let count: i64 = container.selectors().call("count", ())?;
    let remaining: usize = container.selectors().call("remaining", ())?;
    tracing::info!(actions = history.len(), count, remaining, "input exhausted");
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("state-containers: {e}");
            ExitCode::FAILURE
        }
    }
}
