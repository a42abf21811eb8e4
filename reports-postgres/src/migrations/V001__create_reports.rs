use barrel::backend::Pg;
use barrel::{types, Migration};

pub(crate) fn migration() -> String {
    let mut m = Migration::new();

    m.create_table("tcn_reports", |t| {
        t.inject_custom(r#""id" UUID PRIMARY KEY NOT NULL UNIQUE"#);

        t.add_column("payload", types::binary().nullable(false));
        t.add_column("bucket_date", types::custom("DATE").nullable(false));
        t.add_column("interval_number", types::integer().nullable(false));
        t.add_column("timestamp_millis", types::custom("BIGINT").nullable(false));

        t.add_index(
            "bucket_index",
            types::index(["bucket_date", "interval_number"]),
        );
    });

    m.make::<Pg>().to_string()
}
