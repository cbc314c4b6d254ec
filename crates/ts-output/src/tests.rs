//! Integration tests for ts-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::{AGENT_TRACE_FILE, CsvWriter, TICK_SUMMARY_FILE};
    use crate::row::{AgentTraceRow, TickSummaryRow};
    use crate::writer::TraceWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn agent_row(agent_id: u64, tick: u64) -> AgentTraceRow {
        AgentTraceRow {
            tick,
            sim_time: tick as f64 * 0.5,
            agent_id,
            lane_id: 3,
            position: 12.25,
            velocity: 4.0,
            x: Some(1.0),
            y: None,
        }
    }

    fn read(dir: &TempDir, file: &str) -> (Vec<String>, Vec<csv::StringRecord>) {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        let headers = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        let rows = rdr.records().map(|r| r.unwrap()).collect();
        (headers, rows)
    }

    #[test]
    fn csv_files_and_headers() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let (headers, rows) = read(&dir, AGENT_TRACE_FILE);
        assert_eq!(headers, ["tick", "sim_time", "agent_id", "lane_id", "position", "velocity", "x", "y"]);
        assert!(rows.is_empty());

        let (headers, _) = read(&dir, TICK_SUMMARY_FILE);
        assert_eq!(headers[..3], ["tick", "sim_time", "dt"]);
        assert_eq!(headers.len(), 11);
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tmp();
        let nested = dir.path().join("runs").join("a");
        let _w = CsvWriter::new(&nested).unwrap();
        assert!(nested.join(AGENT_TRACE_FILE).exists());
    }

    #[test]
    fn agent_rows_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_agents(&[agent_row(7, 4), agent_row(8, 4)]).unwrap();
        w.finish().unwrap();

        let (_, rows) = read(&dir, AGENT_TRACE_FILE);
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "4");
        assert_eq!(&rows[0][1], "2.000");
        assert_eq!(&rows[0][2], "7");
        assert_eq!(&rows[0][4], "12.250");
        assert_eq!(&rows[0][6], "1.000");
        assert_eq!(&rows[0][7], "", "missing coordinate is empty");
        assert_eq!(&rows[1][2], "8");
    }

    #[test]
    fn summary_rows_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let row = TickSummaryRow {
            tick:        3,
            sim_time:    1.5,
            dt:          0.5,
            agents:      10,
            moved:       8,
            transferred: 1,
            arrived:     1,
            exited:      0,
            spawned:     2,
            failures:    0,
            commands:    1,
        };
        w.write_tick_summary(&row).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();

        let (_, rows) = read(&dir, TICK_SUMMARY_FILE);
        assert_eq!(rows.len(), 1);
        let fields: Vec<&str> = rows[0].iter().collect();
        assert_eq!(fields, ["3", "1.500", "0.500", "10", "8", "1", "1", "0", "2", "0", "1"]);
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use ts_core::{LayerTable, Tick};
    use ts_net::{Agent, Brain, NetDescription, Vehicle};
    use ts_sim::{SimBuilder, SimConfig, SimObserver};

    use crate::csv::{AGENT_TRACE_FILE, CsvWriter, TICK_SUMMARY_FILE};
    use crate::{AgentTraceRow, OutputResult, TickSummaryRow, TraceObserver, TraceWriter};

    const ROAD: &str = r#"{
        "junctions": [{ "id": "a", "x": 0, "y": 0 }, { "id": "b", "x": 100, "y": 0 }],
        "edges": [{ "id": "ab", "from": "a", "to": "b", "lanes": [
            { "id": "ab_0", "index": 0, "speed": 13.9, "length": 100 }
        ]}]
    }"#;

    fn road_sim(snapshot_every: u64) -> ts_sim::Simulation {
        let mut net = NetDescription::from_json_str(ROAD)
            .and_then(|d| d.build(LayerTable::default()))
            .unwrap();
        let lane = net.find_lane("ab_0").unwrap();
        for position in [10.0, 30.0] {
            let agent = Agent::new("idle", lane, position, 0.0, Vehicle::default(), Brain::Idle).unwrap();
            net.add_agent(agent).unwrap();
        }
        let config = SimConfig { snapshot_interval_ticks: snapshot_every, ..SimConfig::default() };
        SimBuilder::new(config).net(net).build().unwrap()
    }

    #[test]
    fn run_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sim = road_sim(2);
        let mut obs = TraceObserver::new(CsvWriter::new(dir.path()).unwrap());
        sim.run_ticks(4, 0.5, &mut obs);
        obs.on_sim_end(sim.clock.current_tick());
        assert!(obs.take_error().is_none());

        let mut summaries = csv::Reader::from_path(dir.path().join(TICK_SUMMARY_FILE)).unwrap();
        assert_eq!(summaries.records().count(), 4);

        let mut trace = csv::Reader::from_path(dir.path().join(AGENT_TRACE_FILE)).unwrap();
        let rows: Vec<_> = trace.records().map(|r| r.unwrap()).collect();
        // Ticks 0 and 2, two agents each.
        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[0][0], "0");
        assert_eq!(&rows[2][0], "2");
        // Idle agents at rest keep their place; x follows the straight lane.
        assert_eq!(&rows[0][4], "10.000");
        assert_eq!(&rows[0][6], "10.000");
    }

    /// Fails every write after the first.
    #[derive(Default)]
    struct Flaky {
        writes: usize,
    }

    impl TraceWriter for Flaky {
        fn write_agents(&mut self, _rows: &[AgentTraceRow]) -> OutputResult<()> {
            Ok(())
        }

        fn write_tick_summary(&mut self, _row: &TickSummaryRow) -> OutputResult<()> {
            self.writes += 1;
            if self.writes > 1 {
                Err(std::io::Error::other(format!("disk full at write {}", self.writes)).into())
            } else {
                Ok(())
            }
        }

        fn finish(&mut self) -> OutputResult<()> {
            Ok(())
        }
    }

    #[test]
    fn first_error_is_kept() {
        let mut sim = road_sim(0);
        let mut obs = TraceObserver::new(Flaky::default());
        sim.run_ticks(3, 0.1, &mut obs);
        let err = obs.take_error().expect("writes failed");
        assert!(err.to_string().contains("write 2"), "{err}");
        assert!(obs.take_error().is_none());
        assert_eq!(obs.into_writer().writes, 3, "later ticks still attempted");
    }

    #[test]
    fn summary_row_mirrors_tick_summary() {
        let mut sim = road_sim(0);
        let summary = sim.step(1.0);
        let row = TickSummaryRow::from(&summary);
        assert_eq!(row.tick, 0);
        assert_eq!(row.agents, 2);
        assert_eq!(row.moved, 2);
        assert_eq!(row.sim_time, 1.0);
        assert_eq!(Tick(row.tick), summary.tick);
    }
}
