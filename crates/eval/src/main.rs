//! Evaluation CLI for exercising the book-fair ranking engine.
//!
//! Usage:
//!     eval search "dune" --limit 5
//!     eval recommend --age 25 --gender f
//!     eval trending --days 7 --limit 15
//!     eval picks --genre "Science Fiction" --age 25 --gender f
//!     eval health

use anyhow::Result;
use bookfair_model::{
    BookSummary, DemographicRequest, SearchRequest, TopPicksRequest, TrendingRequest,
};
use bookfair_query::{parse_gender, validate_age, validate_search};
use bookfair_rank::{
    recommend, search, stalls_for_book, top_author_books, top_picks, top_publisher_books,
    trending,
};
use bookfair_relevance::Tier;
use bookfair_store::{CatalogStore, HttpCatalog, HttpCatalogConfig};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "eval")]
#[command(about = "Exercise the book-fair ranking engine against a catalog service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Catalog service URL
    #[arg(long, default_value = "http://127.0.0.1:8090")]
    catalog_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog with a free-text query
    Search {
        /// Query text
        query: String,

        /// Maximum slate size
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Recommend books for an age/gender pair
    Recommend {
        #[arg(short, long)]
        age: i64,

        #[arg(short, long)]
        gender: String,

        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Rank books by recent interaction volume
    Trending {
        /// Restrict to this age's ten-year bucket
        #[arg(short, long)]
        age: Option<i64>,

        /// Restrict to one gender
        #[arg(short, long)]
        gender: Option<String>,

        /// Look-back window in days
        #[arg(short, long, default_value = "7")]
        days: i64,

        #[arg(short, long, default_value = "15")]
        limit: usize,
    },

    /// Build the combined top-picks feed for a visitor
    Picks {
        #[arg(long)]
        genre: String,

        #[arg(short, long)]
        age: i64,

        #[arg(short, long)]
        gender: String,

        #[arg(short, long, default_value = "15")]
        limit: usize,
    },

    /// Rank the stalls carrying a book
    Stalls {
        /// Catalog book id
        book_id: u64,
    },

    /// List books from the most-clicked author groups
    TopAuthors,

    /// List books from the most-clicked publisher groups
    TopPublishers,

    /// Check catalog service health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bookfair=debug".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = HttpCatalogConfig {
        base_url: cli.catalog_url,
        ..Default::default()
    };
    let store = HttpCatalog::new(config);

    match cli.command {
        Commands::Search {
            query,
            limit,
            format,
        } => {
            let text = validate_search(&query)?;
            let request = SearchRequest::new(text).with_limit(limit);
            let slate = search(&store, &request).await?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&slate)?);
            } else {
                println!("Search results for: {}", query);
                print_slate(&slate);
            }
        }
        Commands::Recommend { age, gender, limit } => {
            let request = DemographicRequest::new(validate_age(age)?, parse_gender(&gender)?)
                .with_limit(limit);
            let slate = recommend(&store, &store, &request).await?;

            println!("Recommendations for age {} ({})", age, gender);
            print_slate(&slate);
        }
        Commands::Trending {
            age,
            gender,
            days,
            limit,
        } => {
            let mut request = TrendingRequest::new().with_limit(limit);
            request.window_days = days;
            if let Some(age) = age {
                request = request.with_age(validate_age(age)?);
            }
            if let Some(gender) = &gender {
                request = request.with_gender(parse_gender(gender)?);
            }
            let slate = trending(&store, &store, &request).await?;

            println!("Trending over the last {} day(s)", days);
            print_slate(&slate);
        }
        Commands::Picks {
            genre,
            age,
            gender,
            limit,
        } => {
            let request =
                TopPicksRequest::new(genre.clone(), validate_age(age)?, parse_gender(&gender)?)
                    .with_limit(limit);
            let slate = top_picks(&store, &store, &request).await?;

            println!("Top picks for {} readers, age {} ({})", genre, age, gender);
            print_slate(&slate);
        }
        Commands::Stalls { book_id } => {
            let stalls = stalls_for_book(&store, book_id).await?;
            println!("Stalls carrying book {}", book_id);
            for (i, stall) in stalls.iter().enumerate() {
                let marker = if stall.rec == 1 { " (author stall)" } else { "" };
                println!("{}. stall {}{}", i + 1, stall.stall_id, marker);
            }
            println!("---");
            println!("Total: {} stalls", stalls.len());
        }
        Commands::TopAuthors => {
            let slate = top_author_books(&store).await?;
            println!("Books from the top authors");
            print_slate(&slate);
        }
        Commands::TopPublishers => {
            let slate = top_publisher_books(&store).await?;
            println!("Books from the top publishers");
            print_slate(&slate);
        }
        Commands::Health => {
            run_health(&store).await?;
        }
    }

    Ok(())
}

fn print_slate(slate: &[BookSummary]) {
    for (i, entry) in slate.iter().enumerate() {
        println!("\n{}. {} (id {})", i + 1, entry.title, entry.id);
        if !entry.authors.is_empty() {
            println!("   by {}", entry.authors);
        }
        if !entry.category.is_empty() {
            println!("   Category: {}", entry.category);
        }
        if let Some(clicks) = entry.clicks {
            println!("   Clicks: {}", clicks);
        }
        if let Some(rec) = entry.rec {
            let label = match rec {
                2 => Tier::Hot.label(),
                1 => Tier::Warm.label(),
                _ => Tier::Cold.label(),
            };
            println!("   Tier: {} ({})", rec, label);
        }
    }

    println!("\n---");
    println!("Total: {} results", slate.len());
}

async fn run_health(store: &HttpCatalog) -> Result<()> {
    print!("Checking {} store... ", store.name());

    match store.health_check().await {
        Ok(()) => {
            println!("OK");
            Ok(())
        }
        Err(e) => {
            println!("FAILED: {}", e);
            std::process::exit(1);
        }
    }
}
