//! The multi-producer, single-consumer command queue.
//!
//! Producers (console, UI threads) hold a cloneable [`CommandSender`] and
//! never block.  The tick loop takes everything queued so far at the start
//! of each drain phase; anything sent while the drain runs waits for the
//! next tick.

use crossbeam::channel::{self, Receiver, Sender};

use crate::command::{Command, parse_command};
use crate::CommandError;

pub(crate) enum Queued {
    Run(Box<dyn Command>),
    /// A console line that did not parse; reported during the next drain.
    Rejected { line: String, error: CommandError },
}

/// Cloneable handle for queueing commands from any thread.
#[derive(Clone)]
pub struct CommandSender {
    tx: Sender<Queued>,
}

impl CommandSender {
    /// Queue a command.  `false` once the simulation has been dropped.
    pub fn send(&self, command: impl Command + 'static) -> bool {
        self.send_boxed(Box::new(command))
    }

    pub fn send_boxed(&self, command: Box<dyn Command>) -> bool {
        self.tx.send(Queued::Run(command)).is_ok()
    }

    /// Parse and queue a console line.  Parse failures are queued too, so
    /// they reach the output sink in order with everything else.
    pub fn send_line(&self, line: &str) -> bool {
        let item = match parse_command(line) {
            Ok(command) => Queued::Run(command),
            Err(error) => Queued::Rejected { line: line.trim().to_owned(), error },
        };
        self.tx.send(item).is_ok()
    }
}

impl std::fmt::Debug for CommandSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSender").field("queued", &self.tx.len()).finish()
    }
}

pub(crate) struct CommandQueue {
    tx: Sender<Queued>,
    rx: Receiver<Queued>,
}

impl CommandQueue {
    pub(crate) fn new() -> Self {
        let (tx, rx) = channel::unbounded();
        Self { tx, rx }
    }

    pub(crate) fn sender(&self) -> CommandSender {
        CommandSender { tx: self.tx.clone() }
    }

    /// Everything queued up to now, oldest first.
    pub(crate) fn take(&self) -> Vec<Queued> {
        let queued = self.rx.len();
        self.rx.try_iter().take(queued).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.rx.len()
    }
}
