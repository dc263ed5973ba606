use anyhow::{Context, Result};
use serde_json::json;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// A random non-empty subset, comma-joined in list order.
    fn subset(&mut self, items: &[&str]) -> String {
        let mut chosen: Vec<&str> = items
            .iter()
            .copied()
            .filter(|_| self.next_f64() < 0.4)
            .collect();
        if chosen.is_empty() {
            chosen.push(self.pick(items));
        }
        chosen.join(", ")
    }
}

// Districts are a 4 × 2 grid of cells over the sample area.
const LAT_MIN: f64 = 38.80;
const LON_MIN: f64 = -77.12;
const CELL: f64 = 0.05;
const COLS: usize = 4;
const ROWS: usize = 2;

fn ward_of(lat: f64, lon: f64) -> usize {
    let col = (((lon - LON_MIN) / CELL) as usize).min(COLS - 1);
    let row = (((lat - LAT_MIN) / CELL) as usize).min(ROWS - 1);
    row * COLS + col + 1
}

fn boundary_geojson() -> serde_json::Value {
    let features: Vec<serde_json::Value> = (0..ROWS)
        .flat_map(|row| (0..COLS).map(move |col| (row, col)))
        .map(|(row, col)| {
            let x0 = LON_MIN + col as f64 * CELL;
            let y0 = LAT_MIN + row as f64 * CELL;
            let (x1, y1) = (x0 + CELL, y0 + CELL);
            json!({
                "type": "Feature",
                "properties": { "WARD": row * COLS + col + 1, "NAME": format!("Ward {}", row * COLS + col + 1) },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[x0, y0], [x1, y0], [x1, y1], [x0, y1], [x0, y0]]]
                }
            })
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let insurance = ["Medicaid", "Medicare", "DC Healthcare Alliance", "Private Insurance", "Non-Medicaid", "Sliding Scale"];
    let services = ["Primary Care", "Dental", "Behavioral Health", "Pharmacy", "Vision", "Prenatal Care"];
    let populations = ["Adults", "Children", "Seniors", "Homeless", "LGBTQ+", "Immigrants and Refugees"];
    let streets = ["Georgia Ave NW", "Benning Rd NE", "Martin Luther King Jr Ave SE", "14th St NW", "Rhode Island Ave NE"];

    let data_path = "sample_sites.csv";
    let mut writer = csv::Writer::from_path(data_path).context("creating sample CSV")?;
    writer.write_record([
        "Site name",
        "Address",
        "Coordinates",
        "Ward",
        "Insurance Accepted",
        "Services Available",
        "Populations served",
        "See Walk-In/ Unscheduled Patients",
        "Phone",
    ])?;

    let n_sites = 40;
    for i in 0..n_sites {
        let lat = LAT_MIN + rng.next_f64() * CELL * ROWS as f64;
        let lon = LON_MIN + rng.next_f64() * CELL * COLS as f64;
        let ward = ward_of(lat, lon);
        // Every tenth site has no coordinates, to exercise the fallback.
        let coordinates = if i % 10 == 9 {
            String::new()
        } else {
            format!("({lat:.5}, {lon:.5})")
        };
        let address = format!("{} {}", 100 + rng.next_u64() % 4900, rng.pick(&streets));
        let walk_in = if rng.next_f64() < 0.5 { "Yes" } else { "No" };

        writer.write_record([
            format!("Community Health Site {}", i + 1),
            address,
            coordinates,
            ward.to_string(),
            rng.subset(&insurance),
            rng.subset(&services),
            rng.subset(&populations),
            walk_in.to_string(),
            format!("(202) 555-{:04}", rng.next_u64() % 10_000),
        ])?;
    }
    writer.flush()?;

    let boundary_path = "sample_wards.geojson";
    let text = serde_json::to_string_pretty(&boundary_geojson())?;
    std::fs::write(boundary_path, text).context("writing sample boundaries")?;

    println!(
        "Wrote {n_sites} sites to {data_path} and {} wards to {boundary_path}",
        COLS * ROWS
    );
    Ok(())
}
