//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! compile-time query validation. Regenerate with `diesel print-schema` when
//! migrations change.

diesel::table! {
    /// User accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Login name, unique.
        username -> Varchar,
        /// Human-readable display name (max 32 characters).
        display_name -> Varchar,
        /// Hex-encoded SHA-256 digest of the password (dev-grade stand-in).
        password_digest -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Lendable items, one owner and one availability state each.
    items (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user.
        owner_id -> Uuid,
        /// Item title (max 120 characters).
        title -> Varchar,
        /// Platform the cartridge runs on; defaulted when absent.
        platform -> Nullable<Varchar>,
        /// Cover image URL.
        cover_url -> Nullable<Varchar>,
        /// `available` or `loaned`; flipped only by the loan transitions.
        availability -> Varchar,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Loan records; a partial unique index on `(item_id) WHERE status =
    /// 'active'` backstops the one-active-loan-per-item invariant.
    loans (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// The item on loan.
        item_id -> Uuid,
        /// The borrowing user.
        borrower_id -> Uuid,
        /// `active` or `returned`.
        status -> Varchar,
        /// Loan creation timestamp.
        created_at -> Timestamptz,
        /// Due timestamp; null for open-ended borrow requests.
        due_at -> Nullable<Timestamptz>,
        /// Return timestamp, set exactly once.
        returned_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(items -> users (owner_id));
diesel::joinable!(loans -> items (item_id));

diesel::allow_tables_to_appear_in_same_query!(users, items, loans);
