use crate::state::SharedState;

pub async fn cmd_search(state: &SharedState, query: &str) -> anyhow::Result<()> {
    println!("Searching for: {query}");

    let outcome = state.search_service.search(query).await?;

    if outcome.results.is_empty() {
        println!("No movies found matching '{query}'");
        return Ok(());
    }

    println!();
    println!("Search Results (from {}):", outcome.source);
    println!("{:-<60}", "");

    for movie in &outcome.results {
        println!("• {} ({})", movie.title, movie.release_year);
        if let Some(director) = &movie.director {
            println!("  Director: {director}");
        }
        println!("  ID: {}", movie.external_id);
        println!();
    }

    Ok(())
}
