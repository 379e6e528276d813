use crate::cycle::CycleDriver;
use lathe_core::{repeat_action, Action, CommandError, Dispatcher, Lathe, RandomSource};
use std::cell::{Cell, RefCell};
use std::io::Write;
use std::rc::Rc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Assemble the interactive command table over a shared device and run
/// flag. Vec order is the `help` listing order; dispatch is first-match.
pub fn build_commands<R>(
    device: Rc<RefCell<Lathe<R>>>,
    running: Rc<Cell<bool>>,
) -> Result<Vec<Action>, CommandError>
where
    R: RandomSource + 'static,
{
    let produce = {
        let device = Rc::clone(&device);
        Action::with_arity(
            "produce",
            0,
            1,
            repeat_action(move || {
                device.borrow_mut().produce();
            }),
        )?
        .describe("Increment the produced counter, optionally N times")
    };

    let reject = {
        let device = Rc::clone(&device);
        Action::with_arity(
            "reject",
            0,
            1,
            repeat_action(move || {
                device.borrow_mut().reject();
            }),
        )?
        .describe("Increment the rejected counter, optionally N times")
    };

    let stop = {
        let running = Rc::clone(&running);
        Action::new(
            "stop",
            Box::new(move |_| {
                running.set(false);
                Ok(())
            }),
        )
        .describe("Stop the console and shut down")
    };

    let status = {
        let device = Rc::clone(&device);
        Action::new(
            "status",
            Box::new(move |_| {
                let device = device.borrow();
                info!("state:    {}", device.status());
                info!("produced: {}", device.produced());
                info!("rejected: {}", device.rejected());
                Ok(())
            }),
        )
        .describe("Show device status and counters")
    };

    let disable = device_action(&device, "disable", "Disable the device", |d| {
        d.set_enabled(false)
    });
    let enable = device_action(&device, "enable", "Enable the device", |d| {
        d.set_enabled(true)
    });
    let toggle = device_action(&device, "toggle", "Toggle the device on or off", |d| {
        let next = !d.enabled();
        d.set_enabled(next);
    });
    let reset = device_action(&device, "reset", "Zero the production counters", |d| {
        d.reset()
    });
    let fail = device_action(&device, "fail", "Put the device into failure mode", |d| {
        d.set_failure(true)
    });

    let mut actions = vec![
        produce, reject, stop, status, disable, enable, toggle, reset, fail,
    ];

    // `help` lists the finished table, so its listing is captured here
    // and the entry spliced into place.
    let help_text = "List available commands";
    let mut listing: Vec<(String, Option<String>)> = actions
        .iter()
        .map(|a| (a.name().to_string(), a.description().map(str::to_string)))
        .collect();
    listing.insert(2, ("help".to_string(), Some(help_text.to_string())));

    let help = Action::new(
        "help",
        Box::new(move |_| {
            for (name, description) in &listing {
                match description {
                    Some(text) => info!("{name}\t{text}"),
                    None => info!("{name}"),
                }
            }
            Ok(())
        }),
    )
    .describe(help_text);
    actions.insert(2, help);

    Ok(actions)
}

fn device_action<R, F>(
    device: &Rc<RefCell<Lathe<R>>>,
    name: &str,
    description: &str,
    apply: F,
) -> Action
where
    R: RandomSource + 'static,
    F: Fn(&mut Lathe<R>) + 'static,
{
    let device = Rc::clone(device);
    Action::new(
        name,
        Box::new(move |_| {
            apply(&mut device.borrow_mut());
            Ok(())
        }),
    )
    .describe(description)
}

/// Read-evaluate loop: one stdin line per iteration, dispatched against
/// the table, with the cycle task reconciled after every command. Ctrl-C
/// and EOF behave like `stop`.
pub async fn run_console<R>(
    dispatcher: &Dispatcher,
    device: &Rc<RefCell<Lathe<R>>>,
    cycle: &mut CycleDriver,
) where
    R: RandomSource + 'static,
{
    let running = dispatcher.run_flag();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while running.get() {
        prompt();

        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    dispatcher.dispatch(&line);
                    cycle.reconcile(device);
                }
                Ok(None) => {
                    // stdin closed
                    running.set(false);
                }
                Err(err) => {
                    warn!(error = %err, "console read error");
                    running.set(false);
                }
            },
            _ = tokio::signal::ctrl_c() => {
                println!();
                running.set(false);
            }
        }
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
