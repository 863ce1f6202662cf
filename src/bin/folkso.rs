//! Folkso CLI — tagging engine over a local SQLite database.
//!
//! Usage:
//!   folkso set <kind> <id> <context> <list> [--owner kind:id] [--db path]
//!   folkso list <kind> <id> <context> [--all] [--db path]
//!   folkso counts [--context name] [--order count-desc] [--db path]
//!   folkso related <kind> <id> <context> [--db path]
//!   folkso tags [--db path]

use clap::{Parser, Subcommand, ValueEnum};
use folkso::{
    CountOrder, EntityRef, FolksoEngine, OpenStore, SqliteStore, TagCountQuery, TagOptions,
    TagStore, TaggableType,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "folkso", version, about = "Embeddable tagging engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set a record's tag list for a context
    Set {
        /// Record kind (e.g. "book")
        kind: String,
        /// Record id
        id: String,
        /// Tagging context (e.g. "tags", "skills")
        context: String,
        /// Delimited tag list (e.g. "ruby, rails")
        list: String,
        /// Attribute the tags to an owner, given as kind:id
        #[arg(long)]
        owner: Option<String>,
        /// Preserve the list order on this context
        #[arg(long)]
        ordered: bool,
    },
    /// Print a record's tag list for a context
    List {
        kind: String,
        id: String,
        context: String,
        /// Only the given owner's tags, given as kind:id
        #[arg(long)]
        owner: Option<String>,
        /// Tags from every owner
        #[arg(long)]
        all: bool,
    },
    /// Print tag usage counts
    Counts {
        /// Restrict to one context
        #[arg(long)]
        context: Option<String>,
        /// Restrict to one record kind
        #[arg(long)]
        kind: Option<String>,
        /// Restrict to one owner, given as kind:id
        #[arg(long)]
        owner: Option<String>,
        /// Minimum count
        #[arg(long)]
        at_least: Option<u64>,
        /// Maximum count
        #[arg(long)]
        at_most: Option<u64>,
        /// Result ordering
        #[arg(long, value_enum, default_value_t = OrderArg::Count)]
        order: OrderArg,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print records sharing tags with the given record
    Related {
        kind: String,
        id: String,
        context: String,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the full tag vocabulary
    Tags,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    /// Ascending by count
    Count,
    /// Descending by count
    CountDesc,
    /// Ascending by name
    Name,
}

impl From<OrderArg> for CountOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Count => CountOrder::CountAsc,
            OrderArg::CountDesc => CountOrder::CountDesc,
            OrderArg::Name => CountOrder::Name,
        }
    }
}

/// Get the default database path (~/.local/share/folkso/folkso.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    let folkso_dir = data_dir.join("folkso");
    std::fs::create_dir_all(&folkso_dir).ok();
    folkso_dir.join("folkso.db")
}

fn open_engine(db: Option<PathBuf>) -> Result<FolksoEngine, String> {
    let db_path = db.unwrap_or_else(default_db_path);
    let store =
        SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))?;
    Ok(FolksoEngine::with_store(Arc::new(store)))
}

/// Parse an owner argument of the form kind:id
fn parse_owner(raw: &str) -> Result<EntityRef, String> {
    match raw.split_once(':') {
        Some((kind, id)) if !kind.is_empty() && !id.is_empty() => Ok(EntityRef::new(kind, id)),
        _ => Err(format!("invalid owner '{}', expected kind:id", raw)),
    }
}

fn cmd_set(
    engine: &FolksoEngine,
    kind: &str,
    id: &str,
    context: &str,
    list: &str,
    owner: Option<&str>,
    ordered: bool,
) -> i32 {
    // The CLI carries no compiled-in declarations; declare the context for
    // this invocation.
    let decl = if ordered {
        TaggableType::new(kind).ordered_context(context)
    } else {
        TaggableType::new(kind).context(context)
    };
    engine.register(decl);

    let taggable = EntityRef::new(kind, id);
    let desired = engine.parse(list);
    let result = match owner {
        Some(raw) => {
            let tagger = match parse_owner(raw) {
                Ok(tagger) => tagger,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return 1;
                }
            };
            engine.tag(&tagger, &taggable, context, &desired, TagOptions::default())
        }
        None => engine.set_tag_list(&taggable, context, &desired),
    };
    match result {
        Ok(outcome) => {
            println!(
                "{}: {} added, {} removed",
                taggable,
                outcome.created.len(),
                outcome.deleted.len()
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_list(
    engine: &FolksoEngine,
    kind: &str,
    id: &str,
    context: &str,
    owner: Option<&str>,
    all: bool,
) -> i32 {
    let taggable = EntityRef::new(kind, id);
    let list = if all {
        engine.all_tags_list(&taggable, context)
    } else {
        match owner {
            Some(raw) => match parse_owner(raw) {
                Ok(tagger) => engine.owner_tag_list(&tagger, &taggable, context),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return 1;
                }
            },
            None => engine.tag_list(&taggable, context),
        }
    };
    match list {
        Ok(list) => {
            println!("{}", engine.serialize(&list));
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_counts(
    engine: &FolksoEngine,
    context: Option<String>,
    kind: Option<String>,
    owner: Option<String>,
    at_least: Option<u64>,
    at_most: Option<u64>,
    order: OrderArg,
    limit: Option<usize>,
    json: bool,
) -> i32 {
    let mut query = TagCountQuery::new().order(order.into());
    if let Some(context) = context {
        query = query.context(context);
    }
    if let Some(kind) = kind {
        query = query.taggable_kind(kind);
    }
    if let Some(raw) = owner {
        match parse_owner(&raw) {
            Ok(tagger) => query = query.tagger(tagger),
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        }
    }
    if let Some(lo) = at_least {
        query = query.at_least(lo);
    }
    if let Some(hi) = at_most {
        query = query.at_most(hi);
    }
    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    match engine.tag_counts(&query) {
        Ok(counts) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&counts).unwrap());
            } else if counts.is_empty() {
                println!("No tags found.");
            } else {
                println!("{:<32}  {:>7}", "TAG", "COUNT");
                for count in counts {
                    println!("{:<32}  {:>7}", count.tag.name, count.count);
                }
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_related(
    engine: &FolksoEngine,
    kind: &str,
    id: &str,
    context: &str,
    limit: Option<usize>,
    json: bool,
) -> i32 {
    let taggable = EntityRef::new(kind, id);
    match engine.related(&taggable, context, limit) {
        Ok(records) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&records).unwrap());
            } else if records.is_empty() {
                println!("No related records.");
            } else {
                println!("{:<32}  {:>7}", "ID", "SHARED");
                for record in records {
                    println!("{:<32}  {:>7}", record.id, record.shared_count);
                }
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_tags(engine: &FolksoEngine) -> i32 {
    match engine.store().list_tags() {
        Ok(tags) => {
            if tags.is_empty() {
                println!("No tags defined.");
            } else {
                for tag in tags {
                    println!("{}", tag.name);
                }
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let engine = match open_engine(cli.db) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Set {
            kind,
            id,
            context,
            list,
            owner,
            ordered,
        } => cmd_set(&engine, &kind, &id, &context, &list, owner.as_deref(), ordered),
        Commands::List {
            kind,
            id,
            context,
            owner,
            all,
        } => cmd_list(&engine, &kind, &id, &context, owner.as_deref(), all),
        Commands::Counts {
            context,
            kind,
            owner,
            at_least,
            at_most,
            order,
            limit,
            json,
        } => cmd_counts(&engine, context, kind, owner, at_least, at_most, order, limit, json),
        Commands::Related {
            kind,
            id,
            context,
            limit,
            json,
        } => cmd_related(&engine, &kind, &id, &context, limit, json),
        Commands::Tags => cmd_tags(&engine),
    };
    std::process::exit(code);
}
