//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.
//! Regenerate with `diesel print-schema` when the migrations change.
//!
//! `legacy_signups` is the one exception: it is created by the system being
//! replaced, not by our migrations, and may be absent entirely on a fresh
//! install.

diesel::table! {
    /// Registered account holders, unique per email.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        phone -> Nullable<Varchar>,
        first_name -> Nullable<Varchar>,
        last_name -> Nullable<Varchar>,
        email_verified -> Bool,
        phone_verified -> Bool,
        /// Channel toggles and reminder lead times as JSONB.
        notification_preferences -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Vehicles, unique per (user, license plate).
    vehicles (id) {
        id -> Uuid,
        user_id -> Uuid,
        license_plate -> Varchar,
        vin -> Nullable<Varchar>,
        year -> Nullable<Int4>,
        make -> Nullable<Varchar>,
        model -> Nullable<Varchar>,
        zip_code -> Nullable<Varchar>,
        mailing_address -> Nullable<Varchar>,
        mailing_city -> Nullable<Varchar>,
        mailing_state -> Nullable<Varchar>,
        mailing_zip -> Nullable<Varchar>,
        subscription_id -> Nullable<Varchar>,
        subscription_status -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Compliance deadlines, unique per (vehicle, kind, due date).
    obligations (id) {
        id -> Uuid,
        vehicle_id -> Uuid,
        user_id -> Uuid,
        /// CHECK-constrained: city_sticker, emissions, or license_plate.
        kind -> Varchar,
        due_date -> Date,
        auto_renew_enabled -> Bool,
        completed -> Bool,
        completed_at -> Nullable<Timestamptz>,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only log of notification attempts; also the dispatch guard via
    /// a unique expression index on (obligation, lead time, UTC day).
    reminders (id) {
        id -> Uuid,
        obligation_id -> Uuid,
        user_id -> Uuid,
        sent_at -> Timestamptz,
        /// CHECK-constrained: email, sms, or voice.
        method -> Varchar,
        days_until_due -> Int4,
        /// CHECK-constrained: sent, failed, or bounced.
        status -> Varchar,
        error_message -> Nullable<Text>,
    }
}

diesel::table! {
    /// Wide table left behind by the legacy signup system. Read-only here;
    /// one row per signup with user, vehicle, and due-date columns repeated.
    legacy_signups (id) {
        id -> Int4,
        /// Legacy account identifier, sometimes a UUID.
        user_id -> Nullable<Varchar>,
        email -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        first_name -> Nullable<Varchar>,
        last_name -> Nullable<Varchar>,
        license_plate -> Nullable<Varchar>,
        vin -> Nullable<Varchar>,
        year -> Nullable<Int4>,
        make -> Nullable<Varchar>,
        model -> Nullable<Varchar>,
        zip_code -> Nullable<Varchar>,
        mailing_address -> Nullable<Varchar>,
        mailing_city -> Nullable<Varchar>,
        mailing_state -> Nullable<Varchar>,
        mailing_zip -> Nullable<Varchar>,
        subscription_id -> Nullable<Varchar>,
        subscription_status -> Nullable<Varchar>,
        city_sticker_expiry -> Nullable<Date>,
        license_plate_expiry -> Nullable<Date>,
        emissions_date -> Nullable<Date>,
    }
}

diesel::joinable!(vehicles -> users (user_id));
diesel::joinable!(obligations -> vehicles (vehicle_id));
diesel::joinable!(obligations -> users (user_id));
diesel::joinable!(reminders -> obligations (obligation_id));
diesel::joinable!(reminders -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, vehicles, obligations, reminders);
