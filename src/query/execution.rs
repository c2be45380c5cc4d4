//! Paginated execution.
//!
//! Pages are 1-based: page `n` covers `OFFSET (n - 1) * page_size` and
//! `LIMIT page_size`. The first successful [`Paginator::page`] call performs a
//! counted fetch and caches the record and page counts; later calls only move
//! the window and never recount. A page past the last one yields no rows.
//!
//! State is committed only after a page call fully succeeds (fetch and
//! hydration), so a failed first call leaves the paginator uncounted and the
//! caller may retry.

use crate::executor::{LifeError, LifeExecutor};
use crate::query::statement::Statement;
use crate::row::{hydrate, FromRow};
use crate::schema::Model;
use std::any::{type_name, TypeId};
use std::marker::PhantomData;

#[cfg(feature = "tracing")]
use crate::tracing_helpers;

/// Paginator over a row statement
///
/// Not meant to be shared: `page` takes `&mut self` and updates the cached
/// counters in place. Build one paginator per caller.
pub struct Paginator<'s, 'e, M, Ex>
where
    Ex: LifeExecutor + ?Sized,
{
    statement: Statement<'s>,
    executor: &'e Ex,
    page_size: u64,
    current_page: u64,
    total_pages: u64,
    record_count: u64,
    counted: bool,
    _model: PhantomData<fn() -> M>,
}

impl<'s, 'e, M, Ex> Paginator<'s, 'e, M, Ex>
where
    M: Model + FromRow,
    Ex: LifeExecutor + ?Sized,
{
    /// # Errors
    ///
    /// `PagingError` when the statement has no target model, targets a model
    /// other than `M`, is an aggregate or grouped statement, or `page_size`
    /// is 0.
    pub fn new(statement: Statement<'s>, executor: &'e Ex, page_size: u64) -> Result<Self, LifeError> {
        let model = statement.model_type().ok_or_else(|| {
            LifeError::PagingError("cannot paginate a statement without a target model".to_string())
        })?;
        if model != TypeId::of::<M>() {
            return Err(LifeError::PagingError(format!(
                "statement does not target {}",
                type_name::<M>()
            )));
        }
        if statement.is_aggregate() {
            return Err(LifeError::PagingError(
                "aggregate statements cannot be paginated".to_string(),
            ));
        }
        if statement.is_grouped() {
            return Err(LifeError::PagingError(
                "grouped statements select group columns, not models".to_string(),
            ));
        }
        if page_size == 0 {
            return Err(LifeError::PagingError("page size must be at least 1".to_string()));
        }
        Ok(Self {
            statement,
            executor,
            page_size,
            current_page: 0,
            total_pages: 0,
            record_count: 0,
            counted: false,
            _model: PhantomData,
        })
    }

    /// Fetch page `page` (1-based).
    ///
    /// # Errors
    ///
    /// `PagingError` for page 0 or a window that overflows `u64`; otherwise
    /// compile, executor and hydration errors, which leave the cached state
    /// untouched.
    pub fn page(&mut self, page: u64) -> Result<Vec<M>, LifeError> {
        if page == 0 {
            return Err(LifeError::PagingError("pages are numbered from 1".to_string()));
        }

        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::paginate_span(page, self.page_size).entered();

        if self.counted && page > self.total_pages {
            log::debug!("page {page} is past the last page {}", self.total_pages);
            self.current_page = page;
            return Ok(Vec::new());
        }

        let offset = (page - 1).checked_mul(self.page_size).ok_or_else(|| {
            LifeError::PagingError(format!("page {page} overflows the row offset"))
        })?;
        let query = self.statement.build_window(self.page_size, offset)?;

        let (rows, record_count) = if self.counted {
            let rows = self.executor.query_all(query.sql(), query.values())?;
            (rows, self.record_count)
        } else {
            let count = self.statement.build_count()?;
            let (rows, total) = self.executor.query_counted(&query, &count)?;
            log::debug!("counted {total} records for pagination");
            (rows, total)
        };

        let descriptor = self.statement.descriptor()?;
        let transient: Vec<&str> = descriptor.transient_fields().collect();
        let models = rows
            .iter()
            .map(|row| hydrate::<M>(row, descriptor, &transient))
            .collect::<Result<Vec<_>, _>>()?;

        if !self.counted {
            self.record_count = record_count;
            self.total_pages = record_count.div_ceil(self.page_size);
            self.counted = true;
        }
        self.current_page = page;
        Ok(models)
    }

    /// Number of pages; 0 until the first successful `page` call.
    pub fn total(&self) -> u64 {
        self.total_pages
    }

    /// Number of matching records; 0 until the first successful `page` call.
    pub fn count(&self) -> u64 {
        self.record_count
    }

    /// Last page served; 0 before any.
    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn is_counted(&self) -> bool {
        self.counted
    }

    /// Drop the cached counts so the next `page` call counts again.
    pub fn refresh(&mut self) {
        self.counted = false;
        self.record_count = 0;
        self.total_pages = 0;
    }

    pub fn statement(&self) -> &Statement<'s> {
        &self.statement
    }
}
