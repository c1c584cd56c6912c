use crate::app_data::AppData;
use crate::types::internal::lifecycle::SweepReport;

/// Run one purge sweep and print its report
pub async fn purge_sweep(app_data: &AppData) -> Result<SweepReport, Box<dyn std::error::Error>> {
    let report = app_data.purge_sweeper.run().await?;

    println!("🧹 Purge sweep (cutoff {})", report.cutoff);
    println!("   Examined: {}", report.examined);
    println!("   Purged:   {}", report.purged.len());
    for user_id in &report.purged {
        println!("     - {}", user_id);
    }
    if !report.skipped.is_empty() {
        println!("   Skipped (no longer eligible): {}", report.skipped.len());
    }
    if !report.failures.is_empty() {
        println!("   ❌ Failures: {}", report.failures.len());
        for failure in &report.failures {
            println!("     - {}: {}", failure.user_id, failure.reason);
        }
    }

    Ok(report)
}
