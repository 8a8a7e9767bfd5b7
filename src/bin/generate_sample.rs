use anyhow::{Context, Result};
use serde::Serialize;

/// One row of the generated file, headers as they appear in scraped exports.
#[derive(Serialize)]
struct Listing {
    #[serde(rename = "Brand")]
    brand: String,
    #[serde(rename = "Model")]
    model: String,
    #[serde(rename = "Colour")]
    colour: String,
    #[serde(rename = "Original Price")]
    original_price: String,
    #[serde(rename = "Discounted Price")]
    discounted_price: String,
    #[serde(rename = "Ratings")]
    ratings: String,
    #[serde(rename = "Memory")]
    memory: String,
    #[serde(rename = "Storage")]
    storage: String,
    #[serde(rename = "Processor")]
    processor: String,
    #[serde(rename = "Rear Camera")]
    rear_camera: String,
    #[serde(rename = "Front Camera")]
    front_camera: String,
    #[serde(rename = "Display Size")]
    display_size: String,
    #[serde(rename = "Battery Capacity")]
    battery_capacity: String,
    #[serde(rename = "Battery Type")]
    battery_type: String,
}

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

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let brands: [(&str, &[&str]); 4] = [
        ("SAMSUNG", &["Galaxy F13", "Galaxy M33", "Galaxy A54"]),
        ("REDMI", &["Redmi 10", "Redmi Note 12"]),
        ("realme", &["narzo 50", "C35", "GT Master"]),
        ("APPLE", &["iPhone 13", "iPhone 14"]),
    ];
    let colours = ["Black", "Blue", "Green", "Silver", "Purple"];
    let memories = ["4 GB", "6 GB", "8 GB"];
    let storages = ["64 GB", "128 GB", "256 GB"];
    let processors = ["Exynos 850", "Snapdragon 680", "Dimensity 700", "A15 Bionic"];
    let rear = ["50MP + 2MP", "48MP", "64MP + 8MP + 2MP", "12MP + 12MP"];
    let front = ["8MP", "16MP", "12MP"];
    let batteries = [4000.0, 5000.0, 6000.0];
    let battery_types = ["Li-ion", "Li-polymer", "Unknown"];

    let output_path = "sample_phones.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    let mut rows = 0usize;
    for (brand, models) in &brands {
        for model in models.iter() {
            // three listings per model, so model names repeat
            for _ in 0..3 {
                let price = (rng.range(8_000.0, 80_000.0) / 100.0).round() * 100.0;
                let discount = (price * rng.range(0.7, 0.95) / 10.0).round() * 10.0;
                // every ninth row carries an unparsable rating
                let ratings = if rows % 9 == 8 {
                    "N/A".to_string()
                } else {
                    format!("{:.1}", rng.range(3.5, 4.8))
                };
                let battery = batteries[(rng.next_u64() % batteries.len() as u64) as usize];

                writer.serialize(Listing {
                    brand: brand.to_string(),
                    model: model.to_string(),
                    colour: rng.pick(&colours).to_string(),
                    original_price: format!("{price:.0}"),
                    discounted_price: format!("{discount:.0}"),
                    ratings,
                    memory: rng.pick(&memories).to_string(),
                    storage: rng.pick(&storages).to_string(),
                    processor: rng.pick(&processors).to_string(),
                    rear_camera: rng.pick(&rear).to_string(),
                    front_camera: rng.pick(&front).to_string(),
                    display_size: format!("{:.2}", rng.range(15.0, 17.5)),
                    battery_capacity: format!("{battery:.0}"),
                    battery_type: rng.pick(&battery_types).to_string(),
                })?;
                rows += 1;
            }
        }
    }
    writer.flush()?;

    println!("Wrote {rows} listings to {output_path}");
    Ok(())
}
