//! Backend query-service implementations

#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "supabase")]
mod supabase;

#[cfg(feature = "postgres")]
pub use postgres::PgExecutorBackend;
#[cfg(feature = "supabase")]
pub use supabase::SupabaseBackend;
