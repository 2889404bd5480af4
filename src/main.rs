use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pokedex::OutputFormat;
use pokedex::config::{self, ResolvedConfig};
use pokedex::network::{ApiClient, HeaderValue, NetworkResult};
use pokedex::pokeapi::{
    ListEntry, PageOutcome, PokeApi, PokeApiRepository, PokemonPager, PokemonResponse, stat_ratio,
};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "pokedex", about = "Browse the PokeAPI catalog")]
struct Args {
    /// API base URL (overrides config and POKEDEX_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Output format
    #[arg(short, long, default_value_t, value_enum)]
    format: OutputFormat,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List Pokémon page by page
    List {
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
        /// Results per page
        #[arg(long)]
        page_size: Option<u32>,
        /// Pages requested at once
        #[arg(long, default_value_t = 1)]
        concurrency: usize,
    },
    /// Show details for one Pokémon
    Show { name: String },
    /// Print the response headers of the list endpoint
    Headers {
        #[arg(long, default_value_t = 1)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to pokedex.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Ok(log_file) = File::create("pokedex.log") {
        let _ = WriteLogger::init(level, log_config, log_file);
    }

    let page_size = match &args.command {
        Command::List { page_size, .. } => *page_size,
        _ => None,
    };
    let resolved = match config::load_config()
        .and_then(|c| config::resolve(&c, args.base_url.as_deref(), page_size))
    {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Pokedex starting up against {}", resolved.base_url);

    let client = match ApiClient::new(&resolved.transport()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("failed to build HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };
    let api = PokeApi::new(client);

    // Ctrl-C cancels whatever call is in flight.
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    match args.command {
        Command::List {
            pages, concurrency, ..
        } => list(api, &resolved, pages, concurrency, &token, &args.format).await,
        Command::Show { name } => show(&api, &name, &token, &args.format).await,
        Command::Headers { limit } => headers(&api, limit, &token).await,
    }
}

async fn list(
    api: PokeApi,
    resolved: &ResolvedConfig,
    pages: u32,
    concurrency: usize,
    token: &CancellationToken,
    format: &OutputFormat,
) -> ExitCode {
    let repository = Arc::new(PokeApiRepository::new(api));
    let mut pager = PokemonPager::new(
        repository,
        resolved.page_size,
        resolved.images_base_url.clone(),
    );

    let outcomes = if concurrency > 1 {
        pager.prefetch_cancellable(pages, concurrency, token).await
    } else {
        let mut outcomes = Vec::new();
        for _ in 0..pages {
            let outcome = pager.load_next_page_cancellable(token).await;
            let stop = !matches!(outcome, PageOutcome::Appended(_));
            outcomes.push(outcome);
            if stop {
                break;
            }
        }
        outcomes
    };

    print_entries(pager.entries(), format);

    match outcomes.last() {
        Some(PageOutcome::Failed(error)) => {
            eprintln!("error {}: {}", error.id, error.message);
            ExitCode::FAILURE
        }
        Some(PageOutcome::Cancelled) => {
            eprintln!("cancelled after {} pages", pager.pages_loaded());
            ExitCode::FAILURE
        }
        _ => {
            if pager.is_end_reached() {
                eprintln!("(end of catalog)");
            }
            ExitCode::SUCCESS
        }
    }
}

async fn show(api: &PokeApi, name: &str, token: &CancellationToken, format: &OutputFormat) -> ExitCode {
    match api.pokemon_details(name).execute_cancellable(token).await {
        NetworkResult::Success(Some(pokemon)) => {
            print_pokemon(&pokemon, format);
            ExitCode::SUCCESS
        }
        NetworkResult::Success(None) => {
            eprintln!("server returned an empty body for {name}");
            ExitCode::FAILURE
        }
        NetworkResult::SuccessHeadersOnly(_) => {
            eprintln!("unexpected headers-only response");
            ExitCode::FAILURE
        }
        NetworkResult::ApiError { body, code } => {
            eprintln!("HTTP {code}: {}", body.message);
            ExitCode::FAILURE
        }
        NetworkResult::NetworkError(e) => {
            eprintln!("{e} (check your connection and try again)");
            ExitCode::FAILURE
        }
        NetworkResult::UnknownError(cause) => {
            log::error!("show {name} failed: {cause:?}");
            eprintln!("something went wrong, see pokedex.log");
            ExitCode::FAILURE
        }
    }
}

async fn headers(api: &PokeApi, limit: u32, token: &CancellationToken) -> ExitCode {
    match api.pokemon_list_headers(limit).execute_cancellable(token).await {
        NetworkResult::SuccessHeadersOnly(headers) => {
            for (name, value) in &headers {
                match value {
                    HeaderValue::One(v) => println!("{name}: {v}"),
                    HeaderValue::Many(vs) => {
                        for v in vs {
                            println!("{name}: {v}");
                        }
                    }
                }
            }
            ExitCode::SUCCESS
        }
        other => {
            eprintln!("request failed: {:?}", other.map(|_| ()));
            ExitCode::FAILURE
        }
    }
}

fn print_entries(entries: &[ListEntry], format: &OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(entries) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("failed to render JSON: {e}"),
        },
        OutputFormat::Text => {
            for entry in entries {
                println!("#{:<5} {:<16} {}", entry.number, entry.name, entry.image_url);
            }
        }
    }
}

fn print_pokemon(pokemon: &PokemonResponse, format: &OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(pokemon) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("failed to render JSON: {e}"),
        },
        OutputFormat::Text => {
            let types: Vec<&str> = pokemon.types.iter().map(|t| t.type_.name.as_str()).collect();
            println!("#{} {}", pokemon.id, pokemon.name);
            println!("  types:  {}", types.join(", "));
            println!("  height: {:.1} m", f64::from(pokemon.height) / 10.0);
            println!("  weight: {:.1} kg", f64::from(pokemon.weight) / 10.0);
            for stat in &pokemon.stats {
                println!("  {:<16} {:>3}", stat.stat.name, stat.base_stat);
            }
            println!("  overall: {:.0}%", stat_ratio(&pokemon.stats) * 100.0);
        }
    }
}
