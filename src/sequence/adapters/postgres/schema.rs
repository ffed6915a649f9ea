//! Diesel schema for counter persistence.

diesel::table! {
    /// One row per owner-set per calendar day.
    counters (owner_key, counter_date) {
        /// Canonical comma-joined owner-set.
        owner_key -> Text,
        /// Owner-set keys in canonical order.
        owners -> Array<Text>,
        /// Day the counter belongs to.
        counter_date -> Date,
        /// Format used for the last issued index.
        #[max_length = 3]
        format -> Varchar,
        /// Last issued index.
        counter_index -> Int4,
    }
}
