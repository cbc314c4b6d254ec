//! Topology and route import from JSON descriptions.
//!
//! # Topology
//!
//! ```json
//! {
//!   "junctions":   [{ "id": "j1", "x": 0.0, "y": 0.0, "shape": [[-1, -1], [1, 1]] }],
//!   "edges":       [{ "id": "e1", "from": "j1", "to": "j2", "priority": 1,
//!                     "lanes": [{ "id": "e1_0", "index": 0, "speed": 13.9, "length": 100.0 }] }],
//!   "connections": [{ "from": "e1_0", "to": "e2_0" }]
//! }
//! ```
//!
//! Missing junction shapes default to the junction's position; missing lane
//! shapes default to the straight line between the edge's junctions.
//!
//! # Routes
//!
//! ```json
//! {
//!   "vehicle_types": [{ "id": "car", "accel": 2.6, "decel": 4.5, "length": 5.0, "max_speed": 33.3 }],
//!   "vehicles":      [{ "id": "v0", "type": "car", "depart": 0.0, "route": ["e1", "e2"] }],
//!   "flows":         [{ "id": "f0", "type": "car", "from": "j1", "to": "j3", "frequency": 0.2 }]
//! }
//! ```
//!
//! # Atomicity
//!
//! [`NetDescription::build`] populates a private `Net` and returns it only if
//! every element was accepted.  [`RouteDescription::resolve`] only reads the
//! registry; [`RoutePlan::install`] checks every flow name before adding any.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::info;

use ts_core::{EdgeId, ElementKind, LaneId, LayerTable, Point2, Shape};

use crate::{
    Brain, DepartureQueue, Edge, Flow, ImportError, ImportResult, Junction, Lane, Net, SpawnInfo,
    Vehicle,
};

// ── Topology description ──────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NetDescription {
    pub junctions:   Vec<JunctionDesc>,
    pub edges:       Vec<EdgeDesc>,
    #[serde(default)]
    pub connections: Vec<ConnectionDesc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JunctionDesc {
    pub id:    String,
    pub x:     f64,
    pub y:     f64,
    #[serde(default)]
    pub shape: Vec<[f64; 2]>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EdgeDesc {
    pub id:       String,
    pub from:     String,
    pub to:       String,
    #[serde(default)]
    pub priority: i32,
    pub lanes:    Vec<LaneDesc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LaneDesc {
    pub id:     String,
    pub index:  usize,
    pub speed:  f64,
    pub length: f64,
    #[serde(default)]
    pub shape:  Vec<[f64; 2]>,
}

/// Lane-level connection by lane id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectionDesc {
    pub from: String,
    pub to:   String,
}

fn to_shape(points: &[[f64; 2]]) -> Shape {
    points.iter().map(|&[x, y]| Point2::new(x, y)).collect::<Vec<_>>().into()
}

impl NetDescription {
    pub fn from_json_str(s: &str) -> ImportResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> ImportResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Build a fresh registry.  Any error discards everything built so far.
    pub fn build(&self, layers: LayerTable) -> ImportResult<Net> {
        let mut net = Net::new(layers);

        for j in &self.junctions {
            let position = Point2::new(j.x, j.y);
            let shape = if j.shape.is_empty() {
                Shape::new(vec![position])
            } else {
                to_shape(&j.shape)
            };
            net.add_junction(Junction::new(j.id.clone(), position, shape)?)?;
        }

        let junction = |net: &Net, name: &str| {
            net.find_junction(name).ok_or_else(|| ImportError::UnknownReference {
                kind: ElementKind::Junction,
                name: name.to_owned(),
            })
        };

        for e in &self.edges {
            let from = junction(&net, &e.from)?;
            let to = junction(&net, &e.to)?;
            let edge = net.add_edge(Edge::new(e.id.clone(), from, to, e.priority)?)?;
            let ends = [from, to]
                .map(|j| net.junction(j).map(|j| j.position).unwrap_or_default());

            let mut lanes: Vec<&LaneDesc> = e.lanes.iter().collect();
            lanes.sort_by_key(|l| l.index);
            for (expected, l) in lanes.into_iter().enumerate() {
                if l.index != expected {
                    return Err(ImportError::LaneIndex {
                        edge: e.id.clone(),
                        expected,
                        got: l.index,
                    });
                }
                let shape = if l.shape.is_empty() {
                    Shape::new(ends.to_vec())
                } else {
                    to_shape(&l.shape)
                };
                net.add_lane(Lane::new(l.id.clone(), edge, l.index, l.speed, l.length, shape)?)?;
            }
        }

        let lane = |net: &Net, name: &str| -> ImportResult<LaneId> {
            net.find_lane(name).ok_or_else(|| ImportError::UnknownReference {
                kind: ElementKind::Lane,
                name: name.to_owned(),
            })
        };
        for c in &self.connections {
            let from = lane(&net, &c.from)?;
            let to = lane(&net, &c.to)?;
            net.connect(from, to)?;
        }

        info!(
            junctions   = self.junctions.len(),
            edges       = self.edges.len(),
            connections = self.connections.len(),
            "topology imported",
        );
        Ok(net)
    }
}

// ── Route description ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RouteDescription {
    #[serde(default)]
    pub vehicle_types: Vec<VehicleTypeDesc>,
    #[serde(default)]
    pub vehicles:      Vec<VehicleDesc>,
    #[serde(default)]
    pub flows:         Vec<FlowDesc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VehicleTypeDesc {
    pub id:        String,
    /// m/s².
    pub accel:     f64,
    /// m/s², positive.
    pub decel:     f64,
    pub length:    f64,
    pub max_speed: f64,
    /// Behavior for agents of this type; the caller's default if absent.
    #[serde(default)]
    pub brain:     Option<Brain>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VehicleDesc {
    pub id:            String,
    #[serde(rename = "type")]
    pub vehicle_type:  String,
    pub depart:        f64,
    #[serde(default)]
    pub depart_pos:    f64,
    #[serde(default)]
    pub depart_speed:  f64,
    /// Metres along the last edge; the end of the edge if absent.
    #[serde(default)]
    pub arrival_pos:   Option<f64>,
    #[serde(default)]
    pub arrival_speed: f64,
    pub route:         Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowDesc {
    pub id:           String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub from:         String,
    pub to:           String,
    /// Spawns per simulated second.
    pub frequency:    f64,
}

/// Resolved routes and flows, ready to be installed into a registry.
#[derive(Clone, Debug, Default)]
pub struct RoutePlan {
    pub routes: Vec<SpawnInfo>,
    pub flows:  Vec<Flow>,
}

impl RouteDescription {
    pub fn from_json_str(s: &str) -> ImportResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> ImportResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Resolve every name against `net` without modifying it.
    pub fn resolve(&self, net: &Net, default_brain: Brain) -> ImportResult<RoutePlan> {
        let mut types: FxHashMap<&str, (Vehicle, Brain)> = FxHashMap::default();
        for t in &self.vehicle_types {
            let vehicle = Vehicle::new(-t.decel.abs(), t.accel, 0.0, t.max_speed, t.length)?;
            types.insert(t.id.as_str(), (vehicle, t.brain.unwrap_or(default_brain)));
        }
        let profile = |name: &str| {
            types
                .get(name)
                .copied()
                .ok_or_else(|| ImportError::UnknownVehicleType(name.to_owned()))
        };

        let mut routes = Vec::with_capacity(self.vehicles.len());
        for v in &self.vehicles {
            let (vehicle, brain) = profile(&v.vehicle_type)?;
            let path = resolve_path(net, &v.id, &v.route)?;
            let Some(&last) = path.last() else {
                return Err(ImportError::EmptyRoute(v.id.clone()));
            };
            let last_len = net.edge_length(last).unwrap_or(0.0);
            routes.push(SpawnInfo {
                name:             v.id.clone(),
                vehicle,
                brain,
                path,
                depart_time:      v.depart,
                depart_position:  v.depart_pos,
                depart_speed:     v.depart_speed,
                arrival_position: v.arrival_pos.unwrap_or(last_len),
                arrival_speed:    v.arrival_speed,
            });
        }

        let mut flows = Vec::with_capacity(self.flows.len());
        for f in &self.flows {
            let (vehicle, brain) = profile(&f.vehicle_type)?;
            let junction = |name: &str| {
                net.find_junction(name).ok_or_else(|| ImportError::UnknownReference {
                    kind: ElementKind::Junction,
                    name: name.to_owned(),
                })
            };
            let (from, to) = (junction(&f.from)?, junction(&f.to)?);
            flows.push(Flow::new(f.id.clone(), vehicle, brain, from, to, f.frequency)?);
        }

        Ok(RoutePlan { routes, flows })
    }
}

/// Map edge names to ids and check that consecutive edges share a junction.
fn resolve_path(net: &Net, vehicle: &str, names: &[String]) -> ImportResult<Vec<EdgeId>> {
    if names.is_empty() {
        return Err(ImportError::EmptyRoute(vehicle.to_owned()));
    }
    let mut path: Vec<EdgeId> = Vec::with_capacity(names.len());
    for name in names {
        let id = net.find_edge(name).ok_or_else(|| ImportError::UnknownReference {
            kind: ElementKind::Edge,
            name: name.clone(),
        })?;
        if let Some(&prev) = path.last() {
            let joined = net
                .edge(prev)
                .zip(net.edge(id))
                .is_some_and(|(a, b)| a.to() == b.from());
            if !joined {
                return Err(ImportError::DisconnectedRoute {
                    vehicle: vehicle.to_owned(),
                    edge:    name.clone(),
                });
            }
        }
        path.push(id);
    }
    Ok(path)
}

impl RoutePlan {
    /// Register the flows in `net` and queue the routes by departure time.
    pub fn install(self, net: &mut Net) -> ImportResult<DepartureQueue> {
        let mut seen = FxHashSet::default();
        for f in &self.flows {
            if !seen.insert(f.name.as_str()) || net.find_flow(&f.name).is_some() {
                return Err(crate::NetError::DuplicateName {
                    kind: ElementKind::Flow,
                    name: f.name.clone(),
                }
                .into());
            }
        }
        let (routes, flows) = (self.routes.len(), self.flows.len());
        for flow in self.flows {
            net.add_flow(flow)?;
        }
        info!(routes, flows, "routes installed");
        Ok(DepartureQueue::new(self.routes))
    }
}

// ── Sources ───────────────────────────────────────────────────────────────────

/// Where a simulation loads (and reloads, on restart) its world from.
pub trait TopologySource: Send + Sync {
    fn load_net(&self, layers: LayerTable) -> ImportResult<Net>;

    /// Routes and flows for `net`.  None by default.
    fn load_routes(&self, _net: &Net, _default_brain: Brain) -> ImportResult<RoutePlan> {
        Ok(RoutePlan::default())
    }
}

/// A fully imported world.
#[derive(Debug)]
pub struct Imported {
    pub net:        Net,
    pub departures: DepartureQueue,
}

/// Load topology and routes from `source` and install the routes.
pub fn import(
    source: &dyn TopologySource,
    layers: LayerTable,
    default_brain: Brain,
) -> ImportResult<Imported> {
    let mut net = source.load_net(layers)?;
    let departures = source.load_routes(&net, default_brain)?.install(&mut net)?;
    Ok(Imported { net, departures })
}

/// In-memory descriptions.
#[derive(Clone, Debug, Default)]
pub struct Scenario {
    pub net:    NetDescription,
    pub routes: RouteDescription,
}

impl TopologySource for Scenario {
    fn load_net(&self, layers: LayerTable) -> ImportResult<Net> {
        self.net.build(layers)
    }

    fn load_routes(&self, net: &Net, default_brain: Brain) -> ImportResult<RoutePlan> {
        self.routes.resolve(net, default_brain)
    }
}

/// JSON files on disk, re-read on every load.
#[derive(Clone, Debug)]
pub struct JsonFiles {
    pub net:    PathBuf,
    pub routes: Option<PathBuf>,
}

impl TopologySource for JsonFiles {
    fn load_net(&self, layers: LayerTable) -> ImportResult<Net> {
        info!(path = %self.net.display(), "loading topology");
        NetDescription::from_json_reader(BufReader::new(File::open(&self.net)?))?.build(layers)
    }

    fn load_routes(&self, net: &Net, default_brain: Brain) -> ImportResult<RoutePlan> {
        match &self.routes {
            Some(path) => {
                info!(path = %path.display(), "loading routes");
                RouteDescription::from_json_reader(BufReader::new(File::open(path)?))?
                    .resolve(net, default_brain)
            }
            None => Ok(RoutePlan::default()),
        }
    }
}
