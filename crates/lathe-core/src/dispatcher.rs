use crate::command::{Action, CommandError};
use log::{error, info};
use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

/// Outcome of one dispatched input line, for callers and tests; the
/// operator-facing report has already been logged by the time this is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A command matched and its operation succeeded.
    Handled,
    /// A command matched but reported an error.
    Failed(String),
    /// No command matched the first token.
    Unknown,
}

/// Matches input lines against an ordered action table and owns the run
/// flag that keeps the console loop alive.
pub struct Dispatcher {
    actions: Vec<Action>,
    running: Rc<Cell<bool>>,
}

impl Dispatcher {
    /// The run flag is created by the caller so the `stop` action can
    /// close over it before the table is handed here. Duplicate names
    /// are a configuration error; lookup stays a first-match linear
    /// scan.
    pub fn new(actions: Vec<Action>, running: Rc<Cell<bool>>) -> Result<Self, CommandError> {
        let mut seen = HashSet::new();
        for action in &actions {
            if !seen.insert(action.name().to_string()) {
                return Err(CommandError::DuplicateName(action.name().to_string()));
            }
        }

        Ok(Self { actions, running })
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn run_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.running)
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Trim, split on whitespace runs, lower-case the first token, and
    /// invoke the first matching action with the remaining tokens.
    /// Unknown input only logs; nothing is mutated.
    pub fn dispatch(&self, line: &str) -> Dispatch {
        let mut tokens = line.trim().split_whitespace();
        let name = tokens.next().unwrap_or("").to_lowercase();
        let args: Vec<String> = tokens.map(str::to_string).collect();

        for action in &self.actions {
            if action.name() == name {
                return match action.invoke(&args) {
                    Ok(()) => Dispatch::Handled,
                    Err(message) => {
                        error!("{message}");
                        Dispatch::Failed(message)
                    }
                };
            }
        }

        error!("Invalid command");
        info!("Type help to see command list");
        Dispatch::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn run_flag() -> Rc<Cell<bool>> {
        Rc::new(Cell::new(true))
    }

    #[test]
    fn unknown_command_is_reported_not_fatal() {
        let dispatcher = Dispatcher::new(Vec::new(), run_flag()).unwrap();
        assert_eq!(dispatcher.dispatch("xyz"), Dispatch::Unknown);
        assert!(dispatcher.is_running());
    }

    #[test]
    fn empty_input_matches_nothing() {
        let dispatcher = Dispatcher::new(Vec::new(), run_flag()).unwrap();
        assert_eq!(dispatcher.dispatch("   "), Dispatch::Unknown);
    }

    #[test]
    fn command_names_match_case_insensitively() {
        let running = run_flag();
        let stop = {
            let running = Rc::clone(&running);
            Action::new(
                "stop",
                Box::new(move |_| {
                    running.set(false);
                    Ok(())
                }),
            )
        };
        let dispatcher = Dispatcher::new(vec![stop], Rc::clone(&running)).unwrap();

        assert_eq!(dispatcher.dispatch("STOP"), Dispatch::Handled);
        assert!(!dispatcher.is_running());
    }

    #[test]
    fn arguments_are_passed_through_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let echo = {
            let seen = Rc::clone(&seen);
            Action::with_arity(
                "echo",
                0,
                3,
                Box::new(move |args| {
                    seen.borrow_mut().extend(args.iter().cloned());
                    Ok(())
                }),
            )
            .unwrap()
        };
        let dispatcher = Dispatcher::new(vec![echo], run_flag()).unwrap();

        assert_eq!(dispatcher.dispatch("  Echo one   two "), Dispatch::Handled);
        assert_eq!(*seen.borrow(), vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn action_errors_surface_as_failed() {
        let fail = Action::new("fail", Box::new(|_| Err("boom".to_string())));
        let dispatcher = Dispatcher::new(vec![fail], run_flag()).unwrap();

        assert_eq!(
            dispatcher.dispatch("fail"),
            Dispatch::Failed("boom".to_string())
        );
    }

    #[test]
    fn duplicate_names_fail_construction() {
        let a = Action::new("twin", Box::new(|_| Ok(())));
        let b = Action::new("twin", Box::new(|_| Ok(())));

        let result = Dispatcher::new(vec![a, b], run_flag());
        assert!(matches!(
            result.err(),
            Some(CommandError::DuplicateName(name)) if name == "twin"
        ));
    }
}
