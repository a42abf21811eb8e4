refinery::embed_migrations!("./src/migrations");
