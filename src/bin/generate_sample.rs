use serde_json::{Value, json};

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

    fn choice<T: Copy>(&mut self, values: &[T]) -> T {
        values[(self.next_u64() % values.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const FEATURES: [&str; 15] = [
    "ts1_mean", "ts2_mean", "ts3_mean", "ts4_mean", "ps1_mean", "ps2_mean", "ps3_mean",
    "ps4_mean", "ps5_mean", "ps6_mean", "fs1_mean", "fs2_mean", "eps1_mean", "vs1_mean",
    "se_mean",
];

/// One synthetic hydraulic cycle: 15 sensor summary features driven by the
/// four condition classes, plus measurement noise.
fn generate_cycle(
    rng: &mut SimpleRng,
    cooler: i64,
    valve: i64,
    leak: i64,
    press: i64,
) -> Vec<f64> {
    let cooler = cooler as f64;
    let valve = valve as f64;
    let leak = leak as f64;
    let press = press as f64;

    vec![
        // Temperatures rise as the cooler degrades.
        52.0 - 0.08 * cooler + rng.gauss(0.0, 0.8),
        50.5 - 0.07 * cooler + rng.gauss(0.0, 0.8),
        49.0 - 0.06 * cooler + rng.gauss(0.0, 0.8),
        47.5 - 0.05 * cooler + rng.gauss(0.0, 0.8),
        // ps1 tracks valve switching quality.
        100.0 + 0.5 * (valve - 73.0) + rng.gauss(0.0, 0.8),
        104.0 + 0.2 * (valve - 73.0) + rng.gauss(0.0, 1.0),
        2.0 + rng.gauss(0.0, 0.1),
        1.8 + rng.gauss(0.0, 0.1),
        // ps5/ps6 track the accumulator pre-charge.
        0.95 * press + rng.gauss(0.0, 2.5),
        0.90 * press + rng.gauss(0.0, 2.5),
        // Flow drops with pump leakage.
        6.0 - 1.5 * leak + rng.gauss(0.0, 0.3),
        9.0 + 0.2 * leak + rng.gauss(0.0, 0.3),
        2450.0 + 25.0 * leak + rng.gauss(0.0, 15.0),
        0.55 + 0.05 * leak + rng.gauss(0.0, 0.02),
        // Overall efficiency is dominated by the cooler.
        20.0 + 0.4 * cooler + rng.gauss(0.0, 2.0),
    ]
}

/// Decision chain over one feature: `thresholds[i]` splits off
/// `class_order[i]`, the final right branch lands in the last class.
fn threshold_chain(feature: &str, thresholds: &[f64], class_order: &[usize]) -> Value {
    assert_eq!(thresholds.len() + 1, class_order.len());
    let mut nodes = Vec::new();
    for (i, &t) in thresholds.iter().enumerate() {
        let base = nodes.len();
        nodes.push(json!({
            "kind": "split",
            "feature": feature,
            "threshold": t,
            "left": base + 1,
            "right": base + 2,
        }));
        nodes.push(json!({ "kind": "leaf", "class": class_order[i] }));
        if i + 1 == thresholds.len() {
            nodes.push(json!({ "kind": "leaf", "class": class_order[i + 1] }));
        }
    }
    json!({ "nodes": nodes })
}

fn write_model(
    target: &str,
    classes: &[i64],
    feature: &str,
    thresholds: &[f64],
    class_order: &[usize],
) {
    let artifact = json!({
        "target": target,
        "classes": classes,
        "feature_names": FEATURES,
        "trees": [threshold_chain(feature, thresholds, class_order)],
    });

    let path = format!("models/best_model_{}.json", target.to_ascii_lowercase());
    std::fs::write(
        &path,
        serde_json::to_string_pretty(&artifact).expect("serializing artifact"),
    )
    .expect("writing classifier artifact");
    println!("Wrote {path}");
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let n_cycles = 600;

    let coolers = [3i64, 20, 100];
    let valves = [73i64, 80, 90, 100];
    let leaks = [0i64, 1, 2];
    let pressures = [90i64, 100, 115, 130];

    // ---- Dataset ----
    let mut writer = csv::Writer::from_path("sample_data.csv").expect("creating sample_data.csv");

    let mut header: Vec<String> = vec!["cycle_id".into()];
    header.extend(FEATURES.iter().map(|f| f.to_string()));
    header.extend(
        ["Cooler_Cond", "Valve_Cond", "Pump_Leak", "Accumulator_Press"]
            .iter()
            .map(|t| t.to_string()),
    );
    writer.write_record(&header).expect("writing CSV header");

    for cycle_id in 0..n_cycles {
        let cooler = rng.choice(&coolers);
        let valve = rng.choice(&valves);
        let leak = rng.choice(&leaks);
        let press = rng.choice(&pressures);

        let mut record: Vec<String> = vec![cycle_id.to_string()];
        for value in generate_cycle(&mut rng, cooler, valve, leak, press) {
            record.push(format!("{value:.4}"));
        }
        for target in [cooler, valve, leak, press] {
            record.push(target.to_string());
        }
        writer.write_record(&record).expect("writing CSV record");
    }
    writer.flush().expect("flushing CSV");
    println!("Wrote {n_cycles} cycles to sample_data.csv");

    // ---- Classifier artifacts ----
    // Thresholds sit at the midpoints between class-conditional means of the
    // driving feature, so the models recover the generating rule well.
    std::fs::create_dir_all("models").expect("creating models directory");

    // se_mean: 21.2 / 28.0 / 60.0
    write_model("Cooler_Cond", &coolers, "se_mean", &[24.6, 44.0], &[0, 1, 2]);
    // ps1_mean: 100.0 / 103.5 / 108.5 / 113.5
    write_model(
        "Valve_Cond",
        &valves,
        "ps1_mean",
        &[101.75, 106.0, 111.0],
        &[0, 1, 2, 3],
    );
    // fs1_mean: 6.0 / 4.5 / 3.0 – flow falls as leakage grows.
    write_model("Pump_Leak", &leaks, "fs1_mean", &[3.75, 5.25], &[2, 1, 0]);
    // ps5_mean: 85.5 / 95.0 / 109.25 / 123.5
    write_model(
        "Accumulator_Press",
        &pressures,
        "ps5_mean",
        &[90.25, 102.1, 116.4],
        &[0, 1, 2, 3],
    );
}
