pub mod command;
pub mod device;
pub mod dispatcher;
pub mod rng;

pub use command::{repeat_action, Action, ActionFn, CommandError};
pub use device::{DeviceStatus, Lathe, TelemetrySnapshot, PRODUCTION_INTERVAL, REJECT_CHANCE};
pub use dispatcher::{Dispatch, Dispatcher};
pub use rng::{FixedSequence, RandomSource, ThreadRandom};
