//! Writes a synthetic booking sheet for trying out the viewer.
//!
//! Usage: `generate_sample [OUTPUT.xlsx] [PEOPLE]`

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Format, Workbook};

const FIRST_NAMES: [&str; 16] = [
    "Alice", "Bruno", "Chloe", "Dmitri", "Elena", "Farah", "Gustav", "Hana", "Ines", "Jonas",
    "Kemi", "Luca", "Maya", "Nils", "Oona", "Priya",
];

const CLASSES: [(&str, f64); 6] = [
    ("Vinyasa Flow", 0.30),
    ("Power Yoga", 0.20),
    ("Pilates Mat", 0.18),
    ("Yin Yoga", 0.14),
    ("Self Practice", 0.12),
    ("Evening Self Practice", 0.06),
];

/// Months covered by the sample, as (year, month).
const MONTHS: [(i32, u32); 6] = [(2024, 1), (2024, 2), (2024, 3), (2024, 4), (2024, 5), (2024, 6)];

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick_class(&mut self) -> &'static str {
        let mut roll = self.next_f64();
        for (name, weight) in CLASSES {
            if roll < weight {
                return name;
            }
            roll -= weight;
        }
        CLASSES[0].0
    }
}

/// Serial of 1970-01-01 in the Excel 1900 date system.
const UNIX_EPOCH_SERIAL: f64 = 25_569.0;

fn excel_serial(ts: NaiveDateTime) -> f64 {
    UNIX_EPOCH_SERIAL + ts.and_utc().timestamp() as f64 / 86_400.0
}

fn booking_time(rng: &mut SimpleRng, year: i32, month: u32) -> Option<NaiveDateTime> {
    let day = 1 + rng.below(28) as u32;
    let hour = [7, 9, 12, 18, 19][rng.below(5)];
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(hour, 0, 0)
        .map(|t| t + Duration::minutes(if rng.next_f64() < 0.5 { 0 } else { 30 }))
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let output_path = args.next().unwrap_or_else(|| "sample_bookings.xlsx".to_string());
    let people: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("PEOPLE must be a number, got '{n}'"))?,
        None => 60,
    };

    let mut rng = SimpleRng::new(42);
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Bookings")?;

    let bold = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm");
    let headers = ["Id_Booking", "Id_Person", "FirstName", "Class_Name", "Start_Date_time"];
    for (col, h) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *h, &bold)?;
    }

    let mut row: u32 = 1;
    for person in 0..people {
        let id = 1000 + person as u32;
        let name = FIRST_NAMES[person % FIRST_NAMES.len()];
        // regulars, occasional visitors and a few very keen members
        let appetite = rng.gauss(4.0, 3.5).max(0.3);

        for (year, month) in MONTHS {
            let bookings = rng.gauss(appetite, 1.5).round().max(0.0) as usize;
            for _ in 0..bookings {
                sheet.write_number(row, 0, row)?;
                sheet.write_number(row, 1, id)?;
                sheet.write_string(row, 2, name)?;
                sheet.write_string(row, 3, rng.pick_class())?;
                match booking_time(&mut rng, year, month) {
                    // ~2% of exports carry a placeholder instead of a date
                    Some(_) if rng.next_f64() < 0.02 => sheet.write_string(row, 4, "TBD")?,
                    Some(ts) => sheet.write_number_with_format(row, 4, excel_serial(ts), &date_format)?,
                    None => sheet.write_string(row, 4, "")?,
                };
                row += 1;
            }
        }
    }

    sheet.set_column_width(3, 24)?;
    sheet.set_column_width(4, 18)?;
    workbook
        .save(&output_path)
        .with_context(|| format!("writing {output_path}"))?;

    println!("Wrote {} bookings for {people} people to {output_path}", row - 1);
    Ok(())
}
