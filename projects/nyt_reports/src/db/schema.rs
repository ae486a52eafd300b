// Maintained by hand: `keywords` elements are non-null, unlike `diesel print-schema` output.

diesel::table! {
    articles (id) {
        id -> Uuid,
        headline -> Text,
        web_url -> Text,
        pub_date -> Timestamp,
        news_desk -> Nullable<Text>,
        word_count -> Nullable<Int4>,
        keywords -> Array<Text>,
    }
}

diesel::table! {
    bestseller_snapshots (id) {
        id -> Uuid,
        list_name -> Text,
        list_date -> Date,
        body -> Jsonb,
        fetched_at -> Timestamp,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    articles,
    bestseller_snapshots,
);
