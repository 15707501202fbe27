use clap::{ArgGroup, Parser, Subcommand};
use recipe_core::*;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "recipebox")]
#[command(about = "Recipe catalog with ingredient search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Storage backend (json, sqlite)
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new recipe
    Add {
        /// Recipe name (at most 50 characters)
        #[arg(long)]
        name: String,

        /// Cooking time in minutes
        #[arg(long, allow_negative_numbers = true)]
        time: i64,

        /// Ingredient (repeat for each one)
        #[arg(short = 'i', long = "ingredient")]
        ingredients: Vec<String>,
    },

    /// Show all recipes
    List,

    /// Show one recipe
    Show { id: u64 },

    /// Change one field of a recipe
    #[command(group(
        ArgGroup::new("field")
            .required(true)
            .args(["name", "time", "ingredients"]),
    ))]
    Update {
        id: u64,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New cooking time in minutes
        #[arg(long, allow_negative_numbers = true)]
        time: Option<i64>,

        /// Replacement ingredient list (repeat for each one)
        #[arg(short = 'i', long = "ingredient")]
        ingredients: Vec<String>,
    },

    /// Delete a recipe
    Delete {
        id: u64,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// List every known ingredient with its menu number
    Ingredients {
        /// Sort alphabetically instead of first-seen order
        #[arg(long)]
        alphabetical: bool,
    },

    /// Find recipes by ingredient
    #[command(group(
        ArgGroup::new("query")
            .required(true)
            .args(["term", "pick"]),
    ))]
    Search {
        /// Ingredient name (or fragment with --substring)
        term: Option<String>,

        /// Menu numbers from `ingredients` (any of them may match)
        #[arg(long, num_args = 1.., allow_negative_numbers = true)]
        pick: Vec<String>,

        /// Menu numbers refer to the alphabetical listing
        #[arg(long)]
        alphabetical: bool,

        /// Match anywhere in the ingredient text instead of exact names
        #[arg(long)]
        substring: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    recipe_core::logging::init_with_level(if cli.verbose { "debug" } else { "warn" });

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let backend = match cli.backend {
        Some(ref raw) => raw.parse::<Backend>()?,
        None => config.storage.backend,
    };

    tracing::debug!("Data directory {:?}, backend {}", data_dir, backend);

    let mut adapter = config.open_adapter(&data_dir, backend)?;
    let mut store = RecipeStore::open(&mut adapter)?;

    match cli.command {
        Commands::Add {
            name,
            time,
            ingredients,
        } => cmd_add(&mut store, &mut adapter, name, time, ingredients),
        Commands::List => cmd_list(&store),
        Commands::Show { id } => {
            display_recipe(store.get(RecipeId::new(id))?);
            Ok(())
        }
        Commands::Update {
            id,
            name,
            time,
            ingredients,
        } => {
            let change = match (name, time) {
                (Some(name), _) => RecipeUpdate::Name(name),
                (None, Some(time)) => RecipeUpdate::CookingTime(time),
                (None, None) => RecipeUpdate::Ingredients(ingredients),
            };
            cmd_update(&mut store, &mut adapter, RecipeId::new(id), change)
        }
        Commands::Delete { id, yes } => {
            cmd_delete(&mut store, &mut adapter, RecipeId::new(id), yes)
        }
        Commands::Ingredients { alphabetical } => {
            cmd_ingredients(&store, order_for(alphabetical))
        }
        Commands::Search {
            term,
            pick,
            alphabetical,
            substring,
        } => cmd_search(&store, term, &pick, order_for(alphabetical), substring),
    }
}

fn cmd_add(
    store: &mut RecipeStore,
    adapter: &mut dyn PersistenceAdapter,
    name: String,
    time: i64,
    ingredients: Vec<String>,
) -> Result<()> {
    let id = store.add(Recipe::new(name, time, ingredients)?)?;
    store.save(adapter)?;

    let recipe = store.get(id)?;
    println!(
        "✓ Added recipe {} '{}' with difficulty {}",
        id,
        recipe.name(),
        recipe.difficulty()
    );
    Ok(())
}

fn cmd_list(store: &RecipeStore) -> Result<()> {
    if store.is_empty() {
        println!("No recipes found.");
    }
    for recipe in store.recipes() {
        display_recipe(recipe);
    }
    Ok(())
}

fn cmd_update(
    store: &mut RecipeStore,
    adapter: &mut dyn PersistenceAdapter,
    id: RecipeId,
    change: RecipeUpdate,
) -> Result<()> {
    store.update(id, change)?;
    store.save(adapter)?;

    println!("✓ Recipe {} updated", id);
    display_recipe(store.get(id)?);
    Ok(())
}

fn cmd_delete(
    store: &mut RecipeStore,
    adapter: &mut dyn PersistenceAdapter,
    id: RecipeId,
    yes: bool,
) -> Result<()> {
    let name = store.get(id)?.name().to_string();

    if !yes && !confirm(&format!("Are you sure you want to delete '{}'? (y/n): ", name))? {
        println!("Deletion cancelled.");
        return Ok(());
    }

    store.delete(id)?;
    store.save(adapter)?;
    println!("✓ Recipe '{}' deleted", name);
    Ok(())
}

fn cmd_ingredients(store: &RecipeStore, order: CatalogOrder) -> Result<()> {
    let catalog = store.catalog();
    if catalog.is_empty() {
        println!("No ingredients recorded yet.");
    }
    for (idx, name) in catalog.all(order).enumerate() {
        println!("{:>3}. {}", idx + 1, name);
    }
    Ok(())
}

fn cmd_search(
    store: &RecipeStore,
    term: Option<String>,
    pick: &[String],
    order: CatalogOrder,
    substring: bool,
) -> Result<()> {
    let terms: Vec<String> = match term {
        Some(term) => vec![term],
        None => pick
            .iter()
            .map(|raw| store.catalog().select(raw, order).map(String::from))
            .collect::<Result<_>>()?,
    };

    let found = match (terms.as_slice(), substring) {
        ([single], false) => store.search_by_ingredient(single),
        ([single], true) => store.search_by_ingredient_substring(single),
        (_, false) => store.search_any_ingredient(&terms),
        (_, true) => store.search_any_substring(&terms),
    };

    let label = terms
        .iter()
        .map(|t| format!("'{}'", t))
        .collect::<Vec<_>>()
        .join(" or ");
    if found.is_empty() {
        println!("No recipes found containing {}.", label);
        return Ok(());
    }

    println!("Recipes containing {}:", label);
    println!();
    for recipe in found {
        display_recipe(recipe);
    }
    Ok(())
}

fn order_for(alphabetical: bool) -> CatalogOrder {
    if alphabetical {
        CatalogOrder::Alphabetical
    } else {
        CatalogOrder::Insertion
    }
}

fn display_recipe(recipe: &Recipe) {
    println!("{}", recipe);
    println!("─────────────────────────────────────────");
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
