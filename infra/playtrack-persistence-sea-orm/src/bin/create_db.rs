use playtrack_persistence_sea_orm::{
    create_db_pool,
    entity::{block, comment, favorite, follow, game, player, rating, topic},
};
use sea_orm::{ConnectionTrait, DatabaseBackend, Schema};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let pool = create_db_pool().await;

    let schema = Schema::new(DatabaseBackend::MySql);
    let tables = [
        ("players", schema.create_table_from_entity(player::Entity)),
        ("games", schema.create_table_from_entity(game::Entity)),
        ("ratings", schema.create_table_from_entity(rating::Entity)),
        ("favorites", schema.create_table_from_entity(favorite::Entity)),
        ("follows", schema.create_table_from_entity(follow::Entity)),
        ("blocks", schema.create_table_from_entity(block::Entity)),
        ("topics", schema.create_table_from_entity(topic::Entity)),
        ("comments", schema.create_table_from_entity(comment::Entity)),
    ];

    for (name, table) in &tables {
        pool.execute(table)
            .await
            .unwrap_or_else(|e| panic!("Failed to create {} table: {}", name, e));
    }

    let indexes = schema
        .create_index_from_entity(topic::Entity)
        .into_iter()
        .chain(schema.create_index_from_entity(comment::Entity));
    for index in indexes {
        pool.execute(&index).await.expect("Failed to create index");
    }

    println!("Created database tables successfully");
}
