//! Fluent builder for constructing a [`Simulation`].

use tracing::info;

use ts_core::LayerTable;
use ts_net::{DepartureQueue, Imported, Net, TopologySource, import};

use crate::{LogSink, OutputSink, SimConfig, SimResult, Simulation};

/// Fluent builder for [`Simulation`].
///
/// # Inputs (all optional)
///
/// | Method             | Default                                   |
/// |--------------------|-------------------------------------------|
/// | `.source(s)`       | none; `restart` fails without one         |
/// | `.net(n)`          | imported from the source, else empty      |
/// | `.departures(q)`   | imported from the source, else empty      |
/// | `.layers(t)`       | `LayerTable::default()`                   |
/// | `.sink(s)`         | [`LogSink`]                               |
///
/// With both a source and a net, the net is used for the first run and the
/// source only for restarts.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config)
///     .source(JsonFiles { net: "ring.net.json".into(), routes: None })
///     .sink(ChannelSink::new(tx))
///     .build()?;
/// sim.run(&stop, &mut NoopObserver);
/// ```
pub struct SimBuilder {
    config:     SimConfig,
    source:     Option<Box<dyn TopologySource>>,
    net:        Option<Net>,
    departures: Option<DepartureQueue>,
    layers:     LayerTable,
    sink:       Option<Box<dyn OutputSink>>,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            source:     None,
            net:        None,
            departures: None,
            layers:     LayerTable::default(),
            sink:       None,
        }
    }

    /// Where to import the world from, now and on every restart.
    pub fn source(mut self, source: impl TopologySource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Start from an already populated registry.
    pub fn net(mut self, net: Net) -> Self {
        self.net = Some(net);
        self
    }

    /// Routes waiting to depart, for a registry given through [`net`](Self::net).
    pub fn departures(mut self, departures: DepartureQueue) -> Self {
        self.departures = Some(departures);
        self
    }

    /// Layer table for imported and empty registries.
    pub fn layers(mut self, layers: LayerTable) -> Self {
        self.layers = layers;
        self
    }

    pub fn sink(mut self, sink: impl OutputSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Validate the config, import the world, compute the router, and return
    /// a ready-to-run [`Simulation`].
    pub fn build(self) -> SimResult<Simulation> {
        self.config.validate()?;

        let (net, departures) = match (self.net, self.source.as_deref()) {
            (Some(net), _) => (net, self.departures.unwrap_or_default()),
            (None, Some(source)) => {
                let Imported { net, departures } =
                    import(source, self.layers, self.config.default_brain)?;
                (net, departures)
            }
            (None, None) => (Net::new(self.layers), self.departures.unwrap_or_default()),
        };

        #[cfg(feature = "parallel")]
        let pool = match self.config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("ts-decide-{i}"))
                    .build()
                    .map_err(|e| crate::SimError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };

        info!(
            elements = net.len(),
            agents = net.agent_count(),
            departures = departures.len(),
            seed = self.config.seed,
            "simulation built",
        );

        Ok(Simulation::assemble(
            self.config,
            net,
            departures,
            self.sink.unwrap_or_else(|| Box::new(LogSink)),
            self.source,
            #[cfg(feature = "parallel")]
            pool,
        ))
    }
}
