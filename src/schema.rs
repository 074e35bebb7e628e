//! Diesel table definitions for the portal collections.

#![expect(
    missing_docs,
    reason = "diesel::table! generates modules and column types that cannot be documented"
)]

diesel::table! {
    users (id) {
        id -> Integer,
        email -> Text,
        password -> Nullable<Text>,
        first_name -> Nullable<Text>,
        last_name -> Nullable<Text>,
        given_name -> Nullable<Text>,
        family_name -> Nullable<Text>,
        name -> Nullable<Text>,
    }
}

diesel::table! {
    blogs (id) {
        id -> Integer,
        post_id -> Integer,
        title -> Text,
        content -> Text,
        author -> Text,
        publication_date -> Text,
        tag -> Text,
    }
}

diesel::table! {
    records (id) {
        id -> Integer,
        user_em -> Text,
        disease -> Text,
        symptoms -> Text,
        medications -> Text,
        duration -> Text,
        hospital -> Text,
        clinic -> Text,
    }
}

diesel::table! {
    hospitals (id) {
        id -> Integer,
        name -> Text,
        address_zh -> Text,
        address_en -> Text,
        phone -> Text,
        intro -> Text,
        departments_zh -> Text,
        departments_en -> Text,
        img_url -> Text,
    }
}

diesel::table! {
    appointments (id) {
        id -> Integer,
        name -> Text,
        email -> Text,
        phone -> Text,
        hospital -> Text,
        department -> Text,
        date -> Text,
        timeslot -> Text,
        approved -> Bool,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, blogs, records, hospitals, appointments);
