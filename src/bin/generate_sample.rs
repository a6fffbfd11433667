//! Writes a deterministic `Student_dataset.csv` for trying out the dashboard.

use anyhow::{Context, Result};

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

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[(self.next_u64() % options.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn grade(value: f64) -> i64 {
    value.round().clamp(0.0, 20.0) as i64
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let output_path = "Student_dataset.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    writer.write_record([
        "school",
        "sex",
        "age",
        "studytime",
        "failures",
        "absences",
        "G1",
        "G2",
        "G3",
        "Predicted Result",
    ])?;

    let n_rows = 150;
    for _ in 0..n_rows {
        let school = rng.pick(&["GP", "MS"]);
        let sex = rng.pick(&["F", "M"]);
        let age = 15 + (rng.next_u64() % 5) as i64;
        let studytime = 1 + (rng.next_u64() % 4) as i64;
        let failures = (rng.next_u64() % 4) as i64;
        let absences = (rng.next_u64() % 21) as i64;

        // Grade snapshots share a latent ability term so the dashboard's
        // correlation heatmap shows structure.
        let ability = rng.gauss(11.0, 3.0) + 0.6 * studytime as f64 - 1.2 * failures as f64;
        let g1 = grade(ability + rng.gauss(0.0, 1.2));
        let g2 = grade(0.65 * g1 as f64 + 0.35 * ability + rng.gauss(0.0, 1.0));
        let g3 = grade(0.55 * g2 as f64 + 0.45 * ability + rng.gauss(0.0, 1.0));

        let predicted = if g3 as f64 + rng.gauss(0.0, 1.0) >= 10.0 {
            "Pass"
        } else {
            "Fail"
        };

        writer.write_record([
            school.to_string(),
            sex.to_string(),
            age.to_string(),
            studytime.to_string(),
            failures.to_string(),
            absences.to_string(),
            g1.to_string(),
            g2.to_string(),
            g3.to_string(),
            predicted.to_string(),
        ])?;
    }

    writer.flush()?;
    println!("Wrote {n_rows} students to {output_path}");
    Ok(())
}
