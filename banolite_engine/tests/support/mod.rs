use banolite_engine::{
    db_types::{NewProduct, Product, ProductType, Role},
    traits::CatalogManagement,
    SqliteDatabase,
};
use bnl_common::Money;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};

pub async fn new_test_db() -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = format!("sqlite://{}/banolite_test_{}.db", std::env::temp_dir().display(), rand::random::<u64>());
    Sqlite::create_database(&url).await.expect("Error creating test database");
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error connecting to test database");
    migrate!("./src/sqlite/migrations").run(db.pool()).await.expect("Error running DB migrations");
    db
}

pub async fn seed_user(db: &SqliteDatabase, id: &str, role: Role) {
    let email = format!("{id}@example.com");
    db.create_profile(id, id, &email, role).await.expect("Error seeding profile");
}

pub async fn seed_product(db: &SqliteDatabase, creator_id: &str, title: &str, price: Money) -> Product {
    seed_typed_product(db, creator_id, title, price, ProductType::Ebook).await
}

pub async fn seed_typed_product(
    db: &SqliteDatabase,
    creator_id: &str,
    title: &str,
    price: Money,
    product_type: ProductType,
) -> Product {
    let product = NewProduct {
        title: title.to_string(),
        description: format!("{title} description"),
        price,
        product_type,
        cover_url: None,
        file_url: None,
    };
    db.insert_product(creator_id, product).await.expect("Error seeding product")
}
