//! Human-readable run reports

use application::RunSummary;
use serde::Serialize;

/// Side-by-side result of a REST and a gRPC run
#[derive(Debug, Serialize)]
pub struct Comparison {
    pub rest: RunSummary,
    pub grpc: RunSummary,
}

/// Render one run as an indented block
pub fn render_summary(summary: &RunSummary) -> String {
    let metrics = &summary.metrics;
    let mut out = String::new();
    out.push_str(&format!("{} run\n", summary.protocol.label()));
    out.push_str(&format!(
        "  iterations:        {} ({} forced faults)\n",
        summary.iterations, summary.forced_faults
    ));
    out.push_str(&format!("  elapsed:           {}ms\n", summary.elapsed_ms));
    out.push_str(&format!(
        "  breaker:           {} (trips {}, recoveries {})\n",
        summary.breaker.state, summary.breaker.trips, summary.breaker.recoveries
    ));
    out.push_str(&format!("  errors:            {}\n", metrics.errors));
    out.push_str(&format!(
        "  fallbacks:         {} ({} degraded)\n",
        metrics.fallbacks, metrics.degraded_requests
    ));
    out.push_str(&format!(
        "  recovery time:     mean {:.1}ms, max {:.1}ms over {}\n",
        metrics.recovery_time.mean, metrics.recovery_time.max, metrics.recovery_time.count
    ));
    out.push_str(&format!(
        "  throughput drop:   mean {:.1}%, max {:.1}%\n",
        metrics.throughput_degradation.mean, metrics.throughput_degradation.max
    ));
    if summary.aborted_workers > 0 {
        out.push_str(&format!(
            "  aborted workers:   {}\n",
            summary.aborted_workers
        ));
    }
    out
}

/// Render both runs followed by the headline differences
pub fn render_comparison(comparison: &Comparison) -> String {
    let rest = &comparison.rest.metrics;
    let grpc = &comparison.grpc.metrics;
    let mut out = render_summary(&comparison.rest);
    out.push('\n');
    out.push_str(&render_summary(&comparison.grpc));
    out.push_str("\nREST vs gRPC\n");
    out.push_str(&format!(
        "  errors:            {} vs {}\n",
        rest.errors, grpc.errors
    ));
    out.push_str(&format!(
        "  fallbacks:         {} vs {}\n",
        rest.fallbacks, grpc.fallbacks
    ));
    out.push_str(&format!(
        "  mean recovery:     {:.1}ms vs {:.1}ms\n",
        rest.recovery_time.mean, grpc.recovery_time.mean
    ));
    out
}
