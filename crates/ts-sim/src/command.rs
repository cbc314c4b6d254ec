//! Console commands executed during the drain phase.
//!
//! A command names the [`ElementKind`] it targets.  The orchestrator streams
//! every element of that kind currently in the registry and calls
//! [`Command::execute`] once per element; each call yields its own
//! [`CommandReport`](crate::CommandReport), so one failing element never
//! hides the others.
//!
//! | Line                | Command                 | Target   |
//! |---------------------|-------------------------|----------|
//! | `simtime`           | [`SimTime`]             | net      |
//! | `walltime`          | [`WallTime`]            | net      |
//! | `spawn N`           | [`SpawnRandom`]         | net      |
//! | `remove ID`         | [`RemoveAgent`]         | net      |
//! | `info ID...`        | [`Info`]                | net      |
//! | `interpolate`       | [`ToggleInterpolation`] | net      |
//! | `restart`           | [`Restart`]             | net      |
//! | `list KIND`         | [`ListElements`]        | `KIND`   |

use std::fmt;

use ts_core::{AgentId, ElementId, ElementKind, SimClock, SimRng};
use ts_net::Net;
use ts_router::Gps;

use crate::{CommandError, SimConfig};

/// What one command produced for one element.
pub type CommandOutcome = Result<String, CommandError>;

/// Mutable access to the world handed to a command between ticks.
pub struct CommandContext<'a> {
    pub net:    &'a mut Net,
    pub clock:  &'a SimClock,
    pub gps:    &'a Gps,
    pub rng:    &'a mut SimRng,
    pub config: &'a SimConfig,

    pub(crate) interpolate: &'a mut bool,
    pub(crate) restart:     &'a mut bool,
}

impl CommandContext<'_> {
    /// Whether renderers should interpolate agent positions between ticks.
    pub fn interpolation(&self) -> bool {
        *self.interpolate
    }

    pub fn set_interpolation(&mut self, on: bool) {
        *self.interpolate = on;
    }

    /// Reload the world once this command has visited all its elements.
    pub fn request_restart(&mut self) {
        *self.restart = true;
    }
}

/// An operation queued from outside the tick loop.
pub trait Command: Send + fmt::Debug {
    /// Short name used in reports.
    fn name(&self) -> &str;

    /// The kind of element this command is applied to.
    fn target(&self) -> ElementKind {
        ElementKind::Net
    }

    /// Apply to one element of [`target`](Command::target).
    fn execute(&mut self, element: ElementId, ctx: &mut CommandContext<'_>) -> CommandOutcome;
}

// ── Built-ins ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default)]
pub struct SimTime;

impl Command for SimTime {
    fn name(&self) -> &str {
        "simtime"
    }

    fn execute(&mut self, _: ElementId, ctx: &mut CommandContext<'_>) -> CommandOutcome {
        Ok(format!("simulation time: {}", ctx.clock))
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct WallTime;

impl Command for WallTime {
    fn name(&self) -> &str {
        "walltime"
    }

    fn execute(&mut self, _: ElementId, ctx: &mut CommandContext<'_>) -> CommandOutcome {
        Ok(format!("wall time: {:.3} s", ctx.clock.wall_elapsed().as_secs_f64()))
    }
}

/// Spawn vehicles between random junction pairs the router can connect.
#[derive(Copy, Clone, Debug)]
pub struct SpawnRandom {
    pub count: usize,
}

impl Command for SpawnRandom {
    fn name(&self) -> &str {
        "spawn"
    }

    fn execute(&mut self, _: ElementId, ctx: &mut CommandContext<'_>) -> CommandOutcome {
        let gps = ctx.gps;
        let (vehicle, brain) = (ctx.config.default_vehicle, ctx.config.default_brain);
        let mut spawned = 0;
        for _ in 0..self.count {
            let placed = ctx.net.spawn_random(vehicle, brain, ctx.rng, |a, b| gps.is_reachable(a, b))?;
            if placed.is_none() {
                break;
            }
            spawned += 1;
        }
        if spawned == 0 && self.count > 0 {
            return Err(CommandError::Failed("no routable junction pair to spawn on".into()));
        }
        Ok(format!("spawned {spawned} of {} vehicles", self.count))
    }
}

#[derive(Copy, Clone, Debug)]
pub struct RemoveAgent {
    pub agent: AgentId,
}

impl Command for RemoveAgent {
    fn name(&self) -> &str {
        "remove"
    }

    fn execute(&mut self, _: ElementId, ctx: &mut CommandContext<'_>) -> CommandOutcome {
        let agent = ctx.net.remove_agent(self.agent)?;
        Ok(format!("removed {} ({})", self.agent, agent.name))
    }
}

/// Describe the given elements, one line each.
#[derive(Clone, Debug)]
pub struct Info {
    pub ids: Vec<ElementId>,
}

impl Command for Info {
    fn name(&self) -> &str {
        "info"
    }

    fn execute(&mut self, _: ElementId, ctx: &mut CommandContext<'_>) -> CommandOutcome {
        let lines: Vec<String> = self
            .ids
            .iter()
            .map(|&id| match ctx.net.element(id) {
                Some(element) => element.describe(),
                None if id == ctx.net.id() => format!("{:?}", ctx.net),
                None => format!("{id}: not found"),
            })
            .collect();
        Ok(lines.join("\n"))
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct ToggleInterpolation;

impl Command for ToggleInterpolation {
    fn name(&self) -> &str {
        "interpolate"
    }

    fn execute(&mut self, _: ElementId, ctx: &mut CommandContext<'_>) -> CommandOutcome {
        let on = !ctx.interpolation();
        ctx.set_interpolation(on);
        Ok(format!("interpolation {}", if on { "on" } else { "off" }))
    }
}

/// Reload topology and routes and reset the clock.
#[derive(Copy, Clone, Debug, Default)]
pub struct Restart;

impl Command for Restart {
    fn name(&self) -> &str {
        "restart"
    }

    fn execute(&mut self, _: ElementId, ctx: &mut CommandContext<'_>) -> CommandOutcome {
        ctx.request_restart();
        Ok("restart scheduled".into())
    }
}

/// Describe every element of one kind.
#[derive(Copy, Clone, Debug)]
pub struct ListElements {
    pub kind: ElementKind,
}

impl Command for ListElements {
    fn name(&self) -> &str {
        "list"
    }

    fn target(&self) -> ElementKind {
        self.kind
    }

    fn execute(&mut self, element: ElementId, ctx: &mut CommandContext<'_>) -> CommandOutcome {
        if element == ctx.net.id() {
            return Ok(format!("{:?}", ctx.net));
        }
        ctx.net
            .element(element)
            .map(|e| e.describe())
            .ok_or(CommandError::ElementNotFound(element))
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse one console line into a built-in command.
pub fn parse_command(line: &str) -> Result<Box<dyn Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Err(CommandError::UnknownCommand(String::new()));
    };
    let args: Vec<&str> = words.collect();

    let command: Box<dyn Command> = match name.to_ascii_lowercase().as_str() {
        "simtime" => no_args(name, &args, SimTime)?,
        "walltime" => no_args(name, &args, WallTime)?,
        "interpolate" => no_args(name, &args, ToggleInterpolation)?,
        "restart" => no_args(name, &args, Restart)?,
        "spawn" => {
            let [count] = args[..] else {
                return Err(CommandError::invalid(name, "usage: spawn N"));
            };
            let count = count
                .parse()
                .map_err(|_| CommandError::invalid(name, format!("{count:?} is not a count")))?;
            Box::new(SpawnRandom { count })
        }
        "remove" => {
            let [id] = args[..] else {
                return Err(CommandError::invalid(name, "usage: remove ID"));
            };
            Box::new(RemoveAgent { agent: AgentId(parse_id(name, id)?.0) })
        }
        "info" => {
            if args.is_empty() {
                return Err(CommandError::invalid(name, "usage: info ID..."));
            }
            let ids = args.iter().map(|a| parse_id(name, a)).collect::<Result<_, _>>()?;
            Box::new(Info { ids })
        }
        "list" => {
            let [kind] = args[..] else {
                return Err(CommandError::invalid(name, "usage: list KIND"));
            };
            let kind = kind.parse().map_err(|e| CommandError::invalid(name, format!("{e}")))?;
            Box::new(ListElements { kind })
        }
        _ => return Err(CommandError::UnknownCommand(name.to_owned())),
    };
    Ok(command)
}

fn no_args<C: Command + 'static>(
    name: &str,
    args: &[&str],
    command: C,
) -> Result<Box<dyn Command>, CommandError> {
    if args.is_empty() {
        Ok(Box::new(command))
    } else {
        Err(CommandError::invalid(name, "takes no arguments"))
    }
}

/// `42` or `#42`.
fn parse_id(command: &str, word: &str) -> Result<ElementId, CommandError> {
    word.trim_start_matches('#')
        .parse()
        .map(ElementId)
        .map_err(|_| CommandError::invalid(command, format!("{word:?} is not an element id")))
}
