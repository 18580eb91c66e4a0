use std::{path::PathBuf, str::FromStr, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use catalog::Catalog;
use clap::{Parser, Subcommand};
use client_core::{
    router::{self, View, PRODUCTS_PATH},
    SessionGate, Storefront, StorefrontError,
};
use shared::{
    domain::{format_price, CategoryFilter, FilterSpec, PriceRange, ProductId, SortKey},
    protocol::{CartSnapshot, CatalogPage, StoreEvent},
};
use storage::{SessionStore, Storage};
use tracing::{debug, info};

mod config;

use config::{load_settings, Settings, SETTINGS_FILE};

#[derive(Parser, Debug)]
#[command(name = "storefront", about = "Demo storefront: sign in, browse, fill a cart")]
struct Cli {
    #[arg(long, default_value = SETTINGS_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Whoami,
    Categories,
    Browse {
        #[arg(long, default_value = "全部")]
        category: String,
        #[arg(long, default_value_t = 0)]
        min: u64,
        #[arg(long, default_value_t = shared::domain::PRICE_SLIDER_MAX)]
        max: u64,
        #[arg(long, default_value = "sales")]
        sort: SortKey,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        json: bool,
    },
    /// Runs cart operations in order, e.g. `add:1 add:1 set:1=5 remove:3`.
    Cart {
        ops: Vec<CartOp>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CartOp {
    Add(ProductId),
    Set(ProductId, i64),
    Remove(ProductId),
    Inc(ProductId),
    Dec(ProductId),
}

impl FromStr for CartOp {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let (verb, arg) = raw
            .split_once(':')
            .ok_or_else(|| anyhow!("expected <op>:<id>, got '{raw}'"))?;
        let parse_id = |s: &str| -> Result<ProductId> {
            s.trim()
                .parse::<i64>()
                .map(ProductId)
                .with_context(|| format!("invalid product id '{s}'"))
        };
        match verb {
            "add" => Ok(Self::Add(parse_id(arg)?)),
            "remove" => Ok(Self::Remove(parse_id(arg)?)),
            "inc" => Ok(Self::Inc(parse_id(arg)?)),
            "dec" => Ok(Self::Dec(parse_id(arg)?)),
            "set" => {
                let (id, qty) = arg
                    .split_once('=')
                    .ok_or_else(|| anyhow!("expected set:<id>=<quantity>, got '{raw}'"))?;
                let qty = qty
                    .trim()
                    .parse::<i64>()
                    .with_context(|| format!("invalid quantity '{qty}'"))?;
                Ok(Self::Set(parse_id(id)?, qty))
            }
            other => bail!("unknown cart op '{other}', expected add/set/remove/inc/dec"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli.config)?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&settings.log_filter))
        .with_writer(std::io::stderr)
        .init();
    debug!(database_url = %settings.database_url, page_size = settings.page_size, "settings loaded");

    let storage = Storage::new(&settings.database_url).await?;
    let store: Arc<dyn SessionStore> = Arc::new(storage);
    let catalog = Arc::new(Catalog::fixture());

    match cli.command {
        Command::Login { username, password } => {
            let gate = SessionGate::new(store, settings.storefront_config().session);
            match gate.login(&username, &password).await {
                Ok(session) => {
                    println!("signed in as {}", session.username);
                    println!("-> {}", router::after_login().path());
                }
                Err(err) => bail!("{err}"),
            }
        }
        Command::Logout => match open(&catalog, store, &settings).await? {
            Some(storefront) => {
                let username = storefront.session().username.clone();
                storefront.logout().await?;
                println!("signed out {username}");
                println!("-> {}", router::after_logout().path());
            }
            None => println!("not signed in"),
        },
        Command::Whoami => {
            let gate = SessionGate::new(store, settings.storefront_config().session);
            match gate.restore().await? {
                Some(session) => println!("{}", session.username),
                None => println!("not signed in"),
            }
        }
        Command::Categories => {
            for category in catalog.categories() {
                println!("{category}");
            }
        }
        Command::Browse {
            category,
            min,
            max,
            sort,
            page,
            json,
        } => {
            let Some(mut storefront) = open(&catalog, store, &settings).await? else {
                return Ok(());
            };
            let filters = FilterSpec {
                price_range: PriceRange::new(min, max),
                category: CategoryFilter::from_str(&category)?,
                sort_by: sort,
            };
            storefront.set_filters(filters);
            let listing = storefront.set_page(page);
            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                print_page(&listing);
            }
        }
        Command::Cart { ops, json } => {
            let Some(mut storefront) = open(&catalog, store, &settings).await? else {
                return Ok(());
            };
            let mut events = storefront.subscribe();
            for op in ops {
                apply_op(&mut storefront, op).await?;
            }
            let snapshot = storefront.cart().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                while let Ok(event) = events.try_recv() {
                    if let StoreEvent::Notice(notice) = event {
                        println!("* {}", notice.message);
                    }
                }
                print_cart(&snapshot);
            }
        }
    }

    Ok(())
}

/// Resolves the products route; a missing sign-in redirects to the login view.
async fn open(
    catalog: &Arc<Catalog>,
    store: Arc<dyn SessionStore>,
    settings: &Settings,
) -> Result<Option<Storefront>> {
    match Storefront::open(Arc::clone(catalog), store, settings.storefront_config()).await {
        Ok(storefront) => {
            let decision = router::resolve(PRODUCTS_PATH, true);
            debug!(view = ?decision.view, "route resolved");
            Ok(Some(storefront))
        }
        Err(StorefrontError::NotAuthenticated) => {
            let decision = router::resolve(PRODUCTS_PATH, false);
            if decision.view == View::Login {
                info!("no active session, redirecting to login");
                println!("not signed in; run `storefront login` first");
            }
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

async fn apply_op(storefront: &mut Storefront, op: CartOp) -> Result<()> {
    match op {
        CartOp::Add(id) => {
            storefront.select_for_cart(id)?;
            storefront.confirm_pending();
            // the next op must see this add
            storefront.settle().await;
        }
        CartOp::Set(id, qty) => {
            storefront.set_quantity(id, qty).await?;
        }
        CartOp::Remove(id) => {
            storefront.remove(id).await?;
        }
        CartOp::Inc(id) => {
            storefront.increment(id).await?;
        }
        CartOp::Dec(id) => {
            storefront.decrement(id).await?;
        }
    }
    Ok(())
}

fn print_page(listing: &CatalogPage) {
    if listing.is_empty() {
        println!("no products match");
    }
    for product in &listing.items {
        println!(
            "#{:<3} {:<28} {:<4} {:>10}  sold {}",
            product.id,
            product.name,
            product.category,
            format_price(product.price),
            product.sales
        );
    }
    println!(
        "page {}/{} ({} products)",
        listing.page,
        listing.total_pages().max(1),
        listing.total_count
    );
}

fn print_cart(cart: &CartSnapshot) {
    if cart.is_empty() {
        println!("cart is empty");
        return;
    }
    for line in &cart.lines {
        println!(
            "#{:<3} {:<28} {:>10} x {:<3} = {}",
            line.product.id,
            line.product.name,
            format_price(line.product.price),
            line.quantity,
            format_price(line.line_total)
        );
    }
    println!(
        "items: {}  total: {}",
        cart.total_items,
        format_price(cart.total_price)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cart_ops() {
        assert_eq!("add:3".parse::<CartOp>().unwrap(), CartOp::Add(ProductId(3)));
        assert_eq!(
            "set:1=5".parse::<CartOp>().unwrap(),
            CartOp::Set(ProductId(1), 5)
        );
        assert_eq!(
            "set:1=-1".parse::<CartOp>().unwrap(),
            CartOp::Set(ProductId(1), -1)
        );
        assert_eq!("dec:2".parse::<CartOp>().unwrap(), CartOp::Dec(ProductId(2)));
        assert!("add".parse::<CartOp>().is_err());
        assert!("buy:1".parse::<CartOp>().is_err());
        assert!("set:1".parse::<CartOp>().is_err());
    }

    #[test]
    fn cli_parses_browse_flags() {
        let cli = Cli::try_parse_from([
            "storefront", "browse", "--category", "手机", "--max", "10000", "--sort", "price_asc",
        ])
        .expect("parse");
        match cli.command {
            Command::Browse {
                category,
                max,
                sort,
                page,
                ..
            } => {
                assert_eq!(category, "手机");
                assert_eq!(max, 10_000);
                assert_eq!(sort, SortKey::PriceAsc);
                assert_eq!(page, 1);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_collects_ordered_cart_ops() {
        let cli = Cli::try_parse_from(["storefront", "cart", "add:1", "add:1", "set:1=5"])
            .expect("parse");
        match cli.command {
            Command::Cart { ops, json } => {
                assert!(!json);
                assert_eq!(
                    ops,
                    vec![
                        CartOp::Add(ProductId(1)),
                        CartOp::Add(ProductId(1)),
                        CartOp::Set(ProductId(1), 5)
                    ]
                );
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
