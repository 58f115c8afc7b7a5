use crate::services::IngestionReport;
use crate::state::SharedState;

pub async fn cmd_ingest(state: &SharedState) -> anyhow::Result<()> {
    let (topic, year) = {
        let config = state.config.read().await;
        (config.ingestion.topic.clone(), config.ingestion.year.clone())
    };
    println!("Ingesting \"{topic}\" ({year}) from OMDb...");

    let report = state.ingestion.run().await?;
    print_report(&report);

    Ok(())
}

fn print_report(report: &IngestionReport) {
    println!();
    println!("Ingestion Report:");
    println!("{:-<40}", "");
    println!("  Candidates:  {}", report.candidates);
    println!("  Stored:      {}", report.succeeded);
    println!("  Failed:      {}", report.failed);
    println!("  Not found:   {}", report.skipped);
    if report.cancelled {
        println!("  Run was cancelled before all candidates were processed");
    }
    if !report.cache_invalidated {
        println!("  Warning: search cache could not be invalidated");
    }
}
