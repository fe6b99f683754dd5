//! Demo catalog seeding.
//!
//! Loads a small bakery catalog so a fresh deployment has something to
//! sell. Intended for development and demo environments.

use breadbox_server::db;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::SecretString;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

struct DemoProduct {
    name: &'static str,
    description: &'static str,
    price: Decimal,
    stock: i32,
}

fn demo_catalog() -> Vec<DemoProduct> {
    vec![
        DemoProduct {
            name: "Sourdough Loaf",
            description: "Naturally leavened, 48-hour cold fermentation.",
            price: dec!(6.50),
            stock: 20,
        },
        DemoProduct {
            name: "Baguette",
            description: "Classic French baguette with a crackly crust.",
            price: dec!(3.25),
            stock: 30,
        },
        DemoProduct {
            name: "Rye Bread",
            description: "Dense dark rye with caraway seeds.",
            price: dec!(5.75),
            stock: 12,
        },
        DemoProduct {
            name: "Croissant",
            description: "All-butter croissant, laminated over two days.",
            price: dec!(3.80),
            stock: 24,
        },
        DemoProduct {
            name: "Pain au Chocolat",
            description: "Croissant dough wrapped around dark chocolate batons.",
            price: dec!(4.10),
            stock: 18,
        },
        DemoProduct {
            name: "Cinnamon Roll",
            description: "Brioche roll with cinnamon sugar and cream cheese icing.",
            price: dec!(4.50),
            stock: 16,
        },
        DemoProduct {
            name: "Focaccia",
            description: "Olive oil focaccia with rosemary and sea salt.",
            price: dec!(7.00),
            stock: 8,
        },
        DemoProduct {
            name: "Blueberry Muffin",
            description: "Buttermilk muffin loaded with wild blueberries.",
            price: dec!(3.50),
            stock: 22,
        },
    ]
}

/// Inserts the demo catalog into an empty shop.
///
/// Refuses to touch a catalog that already has products, so re-running
/// the command never duplicates rows.
///
/// # Errors
///
/// Returns `SeedError` if the database URL is missing or an insert
/// fails.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("BREADBOX_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| SeedError::MissingEnvVar("BREADBOX_DATABASE_URL or DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await?;
    if existing > 0 {
        tracing::warn!("Catalog already has {existing} products, skipping seed");
        return Ok(());
    }

    let catalog = demo_catalog();
    for product in &catalog {
        sqlx::query("INSERT INTO products (name, description, price, stock) VALUES ($1, $2, $3, $4)")
            .bind(product.name)
            .bind(product.description)
            .bind(product.price)
            .bind(product.stock)
            .execute(&pool)
            .await?;
    }

    tracing::info!("Seeded {} demo products", catalog.len());
    Ok(())
}
