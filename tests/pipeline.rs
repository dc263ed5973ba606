use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use caremap::config::AppConfig;
use caremap::data::boundary::BoundaryLayer;
use caremap::data::filter::{FilterOutcome, FilterSelection};
use caremap::data::geocode::LatLon;
use caremap::data::loader::load_file;
use caremap::data::matching::MatchStrategy;
use caremap::data::model::Column;
use caremap::data::options::option_sets;
use caremap::pipeline;
use tempfile::TempDir;

const SITES_CSV: &str = "\
Site name,Address,Coordinates,Ward,Insurance Accepted,Services Available,Populations served,See Walk-In/ Unscheduled Patients
Unity Health Care,3020 14th St NW,\"(38.9296, -77.0327)\",1,\"Medicaid, Medicare, DC Healthcare Alliance\",\"Primary Care, Dental\",\"Adults, Children\",Yes
Bread for the City,1525 7th St NW,\"(38.9102, -77.0219)\",2,\"Medicaid, Sliding Scale\",\"Primary Care, Vision\",Adults,No
Whitman-Walker,1525 14th St NW,\"(38.9103, -77.0322)\",2,\"Private Insurance, Non-Medicaid\",Behavioral Health,\"LGBTQ+, Adults\",Yes
Mary's Center,2333 Ontario Rd NW,not available,1,None,\"Primary Care, Prenatal Care\",\"Children, Immigrants and Refugees\",No
Anacostia Clinic,1328 W St SE,\"(38.8654, -76.9862)\",8,Medicare,,Seniors,Yes
";

const WARDS_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    { "type": "Feature", "properties": { "WARD": 1 },
      "geometry": { "type": "Polygon", "coordinates": [[[-77.05, 38.92], [-77.02, 38.92], [-77.02, 38.94], [-77.05, 38.92]]] } },
    { "type": "Feature", "properties": { "WARD": 2 },
      "geometry": { "type": "Polygon", "coordinates": [[[-77.04, 38.90], [-77.01, 38.90], [-77.01, 38.92], [-77.04, 38.90]]] } },
    { "type": "Feature", "properties": { "WARD": 8 },
      "geometry": { "type": "Polygon", "coordinates": [[[-77.00, 38.84], [-76.97, 38.84], [-76.97, 38.87], [-77.00, 38.84]]] } }
  ]
}"#;

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn selection(pairs: &[(Column, &[&str])]) -> FilterSelection {
    pairs
        .iter()
        .map(|(col, values)| (*col, values.iter().map(|v| v.to_string()).collect()))
        .collect()
}

#[test]
fn loads_extracts_filters_and_renders() {
    let tmp = TempDir::new().unwrap();
    let sites = write(tmp.path(), "sites.csv", SITES_CSV);
    let wards = write(tmp.path(), "wards.geojson", WARDS_GEOJSON);

    let config = AppConfig::default();
    let table = load_file(&sites, &config.columns).unwrap();
    assert_eq!(table.len(), 5);

    let options = option_sets(&table, false);
    assert_eq!(options[&Column::District], vec!["1", "2", "8"]);
    assert_eq!(
        options[&Column::Insurance],
        vec![
            "DC Healthcare Alliance",
            "Medicaid",
            "Medicare",
            "Non-Medicaid",
            "None",
            "Private Insurance",
            "Sliding Scale"
        ]
    );
    assert_eq!(options[&Column::WalkIn], vec!["No", "Yes"]);

    let boundary = BoundaryLayer::load(&wards, &config.boundary_property).unwrap();

    // No filters: everything, with the malformed row at the default pair.
    let all = pipeline::run(&table, &FilterSelection::new(), &config, Some(&boundary));
    assert_eq!(all.outcome(), FilterOutcome::Unfiltered);
    assert_eq!(all.points.len(), 5);
    assert_eq!(all.defaulted_count(), 1);
    assert_eq!(all.points[3].position, LatLon::new(0.0, 0.0));
    assert!(all.overlay.is_empty());

    // Two wards plus walk-in: AND across columns, overlay follows the wards.
    let sel = selection(&[
        (Column::District, &["1", "2"][..]),
        (Column::WalkIn, &["Yes"][..]),
    ]);
    let out = pipeline::run(&table, &sel, &config, Some(&boundary));
    assert_eq!(out.view.indices, vec![0, 2]);
    let overlay: BTreeSet<&str> = out.overlay.iter().map(|f| f.district.as_str()).collect();
    assert_eq!(overlay, BTreeSet::from(["1", "2"]));
    let center = out.center.unwrap();
    assert!((center.lat - (38.9296 + 38.9103) / 2.0).abs() < 1e-9);
    assert!((center.lon - (-77.0327 - 77.0322) / 2.0).abs() < 1e-9);
    assert_eq!(
        out.points[1].tooltip,
        "Site name: Whitman-Walker\nAddress: 1525 14th St NW"
    );
}

#[test]
fn medicaid_selection_across_strategies() {
    let tmp = TempDir::new().unwrap();
    let sites = write(tmp.path(), "sites.csv", SITES_CSV);
    let table = load_file(&sites, &AppConfig::default().columns).unwrap();
    let sel = selection(&[(Column::Insurance, &["Medicaid"][..])]);

    let run_with = |matching| {
        let config = AppConfig {
            matching,
            ..AppConfig::default()
        };
        pipeline::run(&table, &sel, &config, None).view.indices
    };

    // "None" (row 3) is excluded by every strategy; only the token
    // strategy rejects "Non-Medicaid" (row 2).
    assert_eq!(run_with(MatchStrategy::Contains), vec![0, 1, 2]);
    assert_eq!(run_with(MatchStrategy::Token), vec![0, 1]);
    assert_eq!(run_with(MatchStrategy::Fuzzy), vec![0, 1, 2]);
}

#[test]
fn exhausted_filters_report_no_results() {
    let tmp = TempDir::new().unwrap();
    let sites = write(tmp.path(), "sites.csv", SITES_CSV);
    let table = load_file(&sites, &AppConfig::default().columns).unwrap();
    let sel = selection(&[
        (Column::District, &["8"][..]),
        (Column::Services, &["Dental"][..]),
    ]);
    let out = pipeline::run(&table, &sel, &AppConfig::default(), None);
    assert_eq!(out.outcome(), FilterOutcome::NoMatches);
    assert!(out.points.is_empty());
    assert!(out.center.is_none());
}

#[test]
fn overlay_failure_leaves_points_intact() {
    let tmp = TempDir::new().unwrap();
    let sites = write(tmp.path(), "sites.csv", SITES_CSV);
    let wards = write(tmp.path(), "wards.geojson", WARDS_GEOJSON);
    let table = load_file(&sites, &AppConfig::default().columns).unwrap();

    assert!(BoundaryLayer::load(&wards, "DISTRICT").is_err());
    let out = pipeline::run(
        &table,
        &selection(&[(Column::District, &["8"][..])]),
        &AppConfig::default(),
        None,
    );
    assert_eq!(out.view.indices, vec![4]);
    assert_eq!(out.points.len(), 1);
    assert!(out.overlay.is_empty());
}
