//! Performance benchmark for fuzzy prediction over long series
//!
//! Run with: cargo bench --bench predict_perf

use std::time::{Duration, Instant};

use fuzzy_fcst_core::{
    build_lag_table, build_variables, evaluate_series, predict, DefuzzMethod, FuzzyOptions,
    IntersectionOp,
};

fn generate_series(n: usize) -> Vec<Option<f64>> {
    (0..n)
        .map(|i| {
            let trend = 0.01 * i as f64;
            let seasonal = 10.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin();
            Some(trend + seasonal + (i % 7) as f64 * 0.1)
        })
        .collect()
}

fn benchmark_fn<F, R>(name: &str, iterations: usize, mut f: F) -> Duration
where
    F: FnMut() -> R,
{
    // Warmup
    let _ = f();

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = std::hint::black_box(f());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "{}: total={:?}, per_iter={:?}, iters={}",
        name, elapsed, per_iter, iterations
    );
    elapsed
}

fn main() {
    println!("=== Fuzzy Prediction Benchmark ===\n");

    let series_lengths = [100, 1000, 10000];
    let windows = [1, 3, 6];

    println!("--- 1. evaluate_series by length and window ---\n");

    for &n in &series_lengths {
        let series = generate_series(n);
        let iters = if n <= 1000 { 50 } else { 5 };

        for &window in &windows {
            benchmark_fn(
                &format!("evaluate_series(n={}, window={})", n, window),
                iters,
                || evaluate_series(&series, window, &FuzzyOptions::default()),
            );
        }
    }

    println!("\n--- 2. Operators (n=5000, window=3) ---\n");

    let series = generate_series(5000);
    let table = match build_lag_table(&series, 3) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("failed to build lag table: {}", e);
            return;
        }
    };
    let variables = match build_variables(&table, 7) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("failed to build variables: {}", e);
            return;
        }
    };

    for intersection in IntersectionOp::ALL {
        for defuzzification in DefuzzMethod::ALL {
            let options = FuzzyOptions {
                intersection,
                defuzzification,
                ..FuzzyOptions::default()
            };
            benchmark_fn(
                &format!("predict({}, {})", intersection.name(), defuzzification.name()),
                10,
                || {
                    let mut rows = table.rows().to_vec();
                    predict(&mut rows, &variables, &options)
                },
            );
        }
    }

    println!("\n--- 3. Sequential vs parallel (n=10000, window=6) ---\n");

    let series = generate_series(10000);
    for parallel in [false, true] {
        let options = FuzzyOptions {
            parallel,
            ..FuzzyOptions::default()
        };
        benchmark_fn(&format!("evaluate_series(parallel={})", parallel), 5, || {
            evaluate_series(&series, 6, &options)
        });
    }

    println!("\n=== Benchmark Complete ===");
}
