//! Ring road scenario shared by the demo.
//!
//! Four junctions on a 200 m square, two lanes per side running
//! counter-clockwise, plus a one-lane shortcut across the middle.  Lane `i`
//! of every side continues into lane `i` of the next side.

use ts_net::{
    ConnectionDesc, EdgeDesc, FlowDesc, JunctionDesc, LaneDesc, NetDescription, RouteDescription,
    Scenario, VehicleDesc, VehicleTypeDesc,
};

const SIDE:       f64 = 200.0;
const URBAN:      f64 = 13.9; // 50 km/h
const SHORTCUT:   f64 = 8.3;  // 30 km/h
const RING_LANES: usize = 2;

const CORNERS: [(&str, f64, f64); 4] = [
    ("sw", 0.0, 0.0),
    ("se", SIDE, 0.0),
    ("ne", SIDE, SIDE),
    ("nw", 0.0, SIDE),
];

fn lane(edge: &str, index: usize, speed: f64, length: f64) -> LaneDesc {
    LaneDesc { id: format!("{edge}_{index}"), index, speed, length, shape: Vec::new() }
}

fn side_name(i: usize) -> String {
    let (from, ..) = CORNERS[i];
    let (to, ..) = CORNERS[(i + 1) % CORNERS.len()];
    format!("{from}-{to}")
}

/// Topology of the ring.
pub fn ring_net() -> NetDescription {
    let junctions = CORNERS
        .iter()
        .map(|&(id, x, y)| JunctionDesc { id: id.into(), x, y, shape: Vec::new() })
        .collect();

    let mut edges: Vec<EdgeDesc> = (0..CORNERS.len())
        .map(|i| {
            let id = side_name(i);
            EdgeDesc {
                lanes:    (0..RING_LANES).map(|l| lane(&id, l, URBAN, SIDE)).collect(),
                from:     CORNERS[i].0.into(),
                to:       CORNERS[(i + 1) % CORNERS.len()].0.into(),
                priority: 2,
                id,
            }
        })
        .collect();
    let diagonal = SIDE * std::f64::consts::SQRT_2;
    edges.push(EdgeDesc {
        id:       "sw-ne".into(),
        from:     "sw".into(),
        to:       "ne".into(),
        priority: 1,
        lanes:    vec![lane("sw-ne", 0, SHORTCUT, diagonal)],
    });

    let mut connections = Vec::new();
    for i in 0..CORNERS.len() {
        let here = side_name(i);
        let next = side_name((i + 1) % CORNERS.len());
        for l in 0..RING_LANES {
            connections.push(ConnectionDesc { from: format!("{here}_{l}"), to: format!("{next}_{l}") });
        }
    }
    // The shortcut feeds the ne-nw side and is fed from nw-sw.
    connections.push(ConnectionDesc { from: "sw-ne_0".into(), to: "ne-nw_0".into() });
    connections.push(ConnectionDesc { from: "nw-sw_0".into(), to: "sw-ne_0".into() });

    NetDescription { junctions, edges, connections }
}

/// One vehicle type, two scheduled vehicles, and a flow toward `ne`.
pub fn ring_routes() -> RouteDescription {
    let vehicle = |id: &str, depart: f64, route: &[&str]| VehicleDesc {
        id:            id.into(),
        vehicle_type:  "car".into(),
        depart,
        depart_pos:    0.0,
        depart_speed:  0.0,
        arrival_pos:   None,
        arrival_speed: 0.0,
        route:         route.iter().map(|&e| e.to_owned()).collect(),
    };

    RouteDescription {
        vehicle_types: vec![VehicleTypeDesc {
            id:        "car".into(),
            accel:     2.6,
            decel:     4.5,
            length:    5.0,
            max_speed: 33.3,
            brain:     None,
        }],
        vehicles: vec![
            vehicle("commuter", 0.5, &["sw-se", "se-ne", "ne-nw"]),
            vehicle("shortcut", 2.0, &["sw-ne", "ne-nw", "nw-sw"]),
        ],
        flows: vec![FlowDesc {
            id:           "to-ne".into(),
            vehicle_type: "car".into(),
            from:         "nw".into(),
            to:           "ne".into(),
            frequency:    0.25,
        }],
    }
}

pub fn ring_scenario() -> Scenario {
    Scenario { net: ring_net(), routes: ring_routes() }
}
