//! Scenario loading, validation and topology tests

use std::io::Write;
use subway_sim::simulation::{Line, NetworkTopology, Position, Scenario, StationId};

const TWO_STATIONS: &str = r#"
    { "id": "a", "name": "Alpha", "x": 0.0, "y": 0.0, "capacity": 100 },
    { "id": "b", "name": "Bravo", "x": 20.0, "y": 0.0, "capacity": 100 }
"#;

fn scenario_with_trains(trains: &str) -> Scenario {
    let json = format!(
        r#"{{
            "stations": [ {} ],
            "segments": [ {{ "from": "a", "to": "b", "line": "red" }} ],
            "trains": [ {} ]
        }}"#,
        TWO_STATIONS, trains
    );
    Scenario::from_json_str(&json).expect("scenario should parse")
}

fn build_error(scenario: &Scenario) -> String {
    match scenario.build() {
        Ok(_) => panic!("scenario should have been rejected"),
        Err(e) => format!("{:#}", e),
    }
}

#[test]
fn test_default_network_layout() {
    let built = Scenario::default_network()
        .build()
        .expect("default network should build");
    assert_eq!(built.network.station_count(), 13);
    assert_eq!(built.network.segment_count(), 12);
    assert_eq!(built.state.trains.len(), 5);

    let waiting = |key: &str| {
        let id = built.network.lookup(key).expect("station exists");
        built.state.waiting[id.0]
    };
    assert_eq!(waiting("wtc"), 400);
    assert_eq!(waiting("newark"), 320);
    assert_eq!(waiting("journal"), 210);
    assert_eq!(waiting("hoboken"), 244);
    assert_eq!(waiting("grove"), 100);
    assert_eq!(waiting("9st"), 50);

    let onboard: Vec<u32> = built.state.trains.iter().map(|t| t.onboard).collect();
    assert_eq!(onboard, vec![180, 180, 120, 150, 150]);
}

#[test]
fn test_default_trains_start_on_their_routes() {
    let built = Scenario::default_network()
        .build()
        .expect("default network should build");
    let journal = built.network.lookup("journal").expect("station exists");
    for train in &built.state.trains {
        assert!(train.route.len() >= 2);
        assert!(train.route.contains(&journal));
        assert_eq!(train.position, built.network.position(train.current_station()));
    }
    // The second yellow train starts at the far end of its route
    let yellow = &built.state.trains[4];
    assert_eq!(yellow.line, Line::Yellow);
    assert_eq!(yellow.route_index, yellow.route.len() - 1);
}

#[test]
fn test_minimal_scenario_builds() {
    let scenario = scenario_with_trains(r#"{ "line": "red", "start": "b", "route": ["a", "b"] }"#);
    let built = scenario.build().expect("scenario should build");
    assert_eq!(built.state.waiting, vec![25, 25]);
    assert_eq!(built.state.trains[0].route_index, 1);
    assert_eq!(built.state.trains[0].onboard, 180);
}

#[test]
fn test_rejects_short_route() {
    let scenario = scenario_with_trains(r#"{ "line": "red", "start": "a", "route": ["a"] }"#);
    assert!(build_error(&scenario).contains("at least 2 stations"));
}

#[test]
fn test_rejects_unknown_route_station() {
    let scenario =
        scenario_with_trains(r#"{ "line": "red", "start": "a", "route": ["a", "zzz"] }"#);
    assert!(build_error(&scenario).contains("zzz"));
}

#[test]
fn test_rejects_start_off_route() {
    let json = format!(
        r#"{{
            "stations": [ {}, {{ "id": "c", "name": "Charlie", "x": 40.0, "y": 0.0, "capacity": 100 }} ],
            "trains": [ {{ "line": "blue", "start": "c", "route": ["a", "b"] }} ]
        }}"#,
        TWO_STATIONS
    );
    let scenario = Scenario::from_json_str(&json).expect("scenario should parse");
    assert!(build_error(&scenario).contains("not on the route"));
}

#[test]
fn test_rejects_repeated_route_stop() {
    let scenario =
        scenario_with_trains(r#"{ "line": "red", "start": "a", "route": ["a", "b", "a"] }"#);
    assert!(build_error(&scenario).contains("more than once"));
}

#[test]
fn test_rejects_bad_train_parameters() {
    for train in [
        r#"{ "line": "red", "start": "a", "route": ["a", "b"], "capacity": 0 }"#,
        r#"{ "line": "red", "start": "a", "route": ["a", "b"], "speed": 0.0 }"#,
        r#"{ "line": "red", "start": "a", "route": ["a", "b"], "dwell_ticks": 0 }"#,
        r#"{ "line": "red", "start": "a", "route": ["a", "b"], "load_factor": 1.5 }"#,
    ] {
        assert!(scenario_with_trains(train).build().is_err(), "accepted {}", train);
    }
}

#[test]
fn test_rejects_duplicate_station_key() {
    let scenario = Scenario::from_json_str(
        r#"{ "stations": [
            { "id": "a", "name": "Alpha", "x": 0.0, "y": 0.0, "capacity": 100 },
            { "id": "a", "name": "Again", "x": 5.0, "y": 0.0, "capacity": 100 }
        ] }"#,
    )
    .expect("scenario should parse");
    assert!(scenario.build().is_err());
}

#[test]
fn test_rejects_invalid_station() {
    for station in [
        r#"{ "id": "a", "name": "Alpha", "x": 0.0, "y": 0.0, "capacity": 0 }"#,
        r#"{ "id": "a", "name": "Alpha", "x": 0.0, "y": 0.0, "capacity": 10, "initial_load": -0.5 }"#,
        r#"{ "id": "a", "name": "Alpha", "x": 0.0, "y": 0.0, "capacity": 10, "base_rate": -1.0 }"#,
    ] {
        let json = format!(r#"{{ "stations": [ {} ] }}"#, station);
        let scenario = Scenario::from_json_str(&json).expect("scenario should parse");
        assert!(scenario.build().is_err(), "accepted {}", station);
    }
}

#[test]
fn test_rejects_segment_to_unknown_station() {
    let json = format!(
        r#"{{
            "stations": [ {} ],
            "segments": [ {{ "from": "a", "to": "nowhere", "line": "yellow" }} ]
        }}"#,
        TWO_STATIONS
    );
    let scenario = Scenario::from_json_str(&json).expect("scenario should parse");
    assert!(build_error(&scenario).contains("nowhere"));
}

#[test]
fn test_rejects_malformed_json() {
    assert!(Scenario::from_json_str("{ not json").is_err());
    assert!(Scenario::from_json_str(r#"{ "stations": [], "trains": [ { "line": "purple" } ] }"#).is_err());
}

#[test]
fn test_load_from_file() {
    let path = std::env::temp_dir().join(format!("subway_sim_scenario_{}.json", std::process::id()));
    let json = serde_json::to_string(&Scenario::default_network()).expect("scenario should serialize");
    std::fs::File::create(&path)
        .and_then(|mut file| file.write_all(json.as_bytes()))
        .expect("temp file should be writable");

    let loaded = Scenario::load(&path).expect("scenario should load");
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, Scenario::default_network());

    assert!(Scenario::load(&path).is_err());
}

#[test]
fn test_topology_adjacency_and_neighbourhood() {
    let mut network = NetworkTopology::new();
    let a = network
        .add_station("a", "Alpha", Position::new(0.0, 0.0), 100, 1.0)
        .expect("valid station");
    let b = network
        .add_station("b", "Bravo", Position::new(99.0, 99.0), 100, 1.0)
        .expect("valid station");
    let c = network
        .add_station("c", "Charlie", Position::new(100.0, 0.0), 100, 1.0)
        .expect("valid station");
    network.add_segment(a, b, Line::Red).expect("valid segment");
    network.add_segment(c, b, Line::Blue).expect("valid segment");

    assert_eq!((a, b, c), (StationId(0), StationId(1), StationId(2)));
    assert!(network.are_adjacent(b, a));
    assert!(!network.are_adjacent(a, c));
    assert_eq!(network.neighbours(b), vec![a, c]);

    // The neighbourhood is a box and its edge is excluded
    assert_eq!(network.stations_near(a, 100.0), vec![b]);
    assert_eq!(network.stations_near(b, 100.0), vec![a, c]);

    assert!(network.resolve("d").is_err());
    assert!(network
        .add_station("d", "Delta", Position::new(f64::NAN, 0.0), 100, 1.0)
        .is_err());
}
