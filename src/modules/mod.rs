pub mod accommodations;
pub mod blog;
pub mod bookings;
pub mod customers;
pub mod destinations;
pub mod messages;
pub mod preferences;
pub mod reviews;

use savanna_db::Database;
use savanna_kernel::ModuleRegistry;

/// Register the database core module and every site module with the registry
pub fn register_all(registry: &mut ModuleRegistry, db: &Database) {
    registry.register_core(savanna_db::create_module(db.clone()));

    registry.register_custom(preferences::create_module(db.clone()));
    registry.register_custom(destinations::create_module(db.clone()));
    registry.register_custom(bookings::create_module(db.clone()));
    registry.register_custom(customers::create_module(db.clone()));
    registry.register_custom(blog::create_module(db.clone()));
    registry.register_custom(accommodations::create_module(db.clone()));
    registry.register_custom(reviews::create_module(db.clone()));
    registry.register_custom(messages::create_module(db.clone()));
}

/// Fresh in-memory database with every module's schema applied.
#[cfg(test)]
pub(crate) async fn test_database() -> Database {
    let db = Database::in_memory().await.unwrap();
    let mut registry = ModuleRegistry::new();
    register_all(&mut registry, &db);
    db.migrate(&registry.collect_migrations()).await.unwrap();
    db
}
