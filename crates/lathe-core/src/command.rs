use thiserror::Error;

/// Errors raised while assembling a command table. These are fatal
/// configuration errors, unlike the `String` messages actions hand back
/// to the operator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("`{name}`: minimum argument count {min} exceeds maximum {max}")]
    ArityBounds {
        name: String,
        min: usize,
        max: usize,
    },
    #[error("duplicate command name `{0}`")]
    DuplicateName(String),
}

/// Operation bound to a command name. `Err` carries the operator-facing
/// message; success is silent.
pub type ActionFn = Box<dyn Fn(&[String]) -> Result<(), String>>;

/// A named, arity-validated operation. Immutable once built; the
/// dispatcher consults its table of these on every input line.
pub struct Action {
    name: String,
    min_args: usize,
    max_args: usize,
    description: Option<String>,
    op: ActionFn,
}

impl Action {
    /// An action that accepts exactly zero arguments.
    pub fn new(name: impl Into<String>, op: ActionFn) -> Self {
        Self {
            name: name.into(),
            min_args: 0,
            max_args: 0,
            description: None,
            op,
        }
    }

    pub fn with_arity(
        name: impl Into<String>,
        min_args: usize,
        max_args: usize,
        op: ActionFn,
    ) -> Result<Self, CommandError> {
        let name = name.into();

        if min_args > max_args {
            return Err(CommandError::ArityBounds {
                name,
                min: min_args,
                max: max_args,
            });
        }

        Ok(Self {
            name,
            min_args,
            max_args,
            description: None,
            op,
        })
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Arity is checked before the operation runs. The exact error
    /// strings are part of the console protocol.
    pub fn invoke(&self, args: &[String]) -> Result<(), String> {
        if args.len() < self.min_args {
            return Err(format!(
                "Not enough argument. Minimum required: {}. Got: {}",
                self.min_args,
                args.len()
            ));
        }

        if args.len() > self.max_args {
            return Err(format!(
                "Too many argument. Maximum required: {}. Got: {}",
                self.max_args,
                args.len()
            ));
        }

        (self.op)(args)
    }
}

/// Wraps a zero-argument operation into one accepting an optional repeat
/// count.
///
/// The counted loop admits fractional counts and runs `ceil(times)`
/// iterations; `repeat_runs_ceil_of_fractional_counts` below pins that
/// behavior. Rust's float parser accepts the literals `NaN` and `inf`;
/// both classify as not-a-number here, since an infinite count would
/// never terminate the loop.
pub fn repeat_action<F>(op: F) -> ActionFn
where
    F: Fn() + 'static,
{
    Box::new(move |args| {
        let raw = match args.first() {
            None => {
                op();
                return Ok(());
            }
            Some(raw) => raw,
        };

        let times = match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => return Err(format!("{raw} is not a number")),
        };

        if times < 0.0 {
            return Err(format!("{raw} is negative"));
        }

        let mut i = 0.0;
        while i < times {
            op();
            i += 1.0;
        }

        Ok(())
    })
}
