//! Tracing spans for query execution and pagination.

use tracing::Span;

/// Span around one executor round trip.
pub fn execute_query_span(query: &str) -> Span {
    tracing::debug_span!("lifeguard.execute_query", db.statement = query)
}

/// Span around one `Paginator::page` call.
pub fn paginate_span(page: u64, page_size: u64) -> Span {
    tracing::debug_span!("lifeguard.paginate", page, page_size)
}
