use sea_orm_migration::prelude::*;

mod m20240101_initial;
mod m20240312_add_profile_fields;
mod m20240520_add_article_media;
mod m20240818_add_read_receipts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_initial::Migration),
            Box::new(m20240312_add_profile_fields::Migration),
            Box::new(m20240520_add_article_media::Migration),
            Box::new(m20240818_add_read_receipts::Migration),
        ]
    }
}
