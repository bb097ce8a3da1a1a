//! Simple comparison of the three policies on the default scenario

use scout::{Policy, SimulationConfig, compare_policies};

fn main() {
    println!("=== Scout Policy Comparison ===\n");

    let config = SimulationConfig::default();
    println!(
        "Markets: {}, periods: {}, participants/period: {}\n",
        config.markets.len(),
        config.periods,
        config.participants_per_period
    );

    let comparison = match compare_policies(&config, &Policy::standard_set(0.1)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Simulation failed: {e}");
            std::process::exit(1);
        }
    };

    for outcome in &comparison.outcomes {
        println!("{}:", outcome.policy);
        for (market, share) in &outcome.visit_shares {
            println!("  market {}: {:.1}% of visits", market, share);
        }
        if let Some(best) = outcome.best_signal_seen {
            println!("  best signal seen: {:.3}", best);
        }
    }
}
