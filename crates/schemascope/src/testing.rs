//! In-memory catalog connection for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::connection::{CatalogConnection, CatalogQuery, CatalogRow};
use crate::error::QueryError;

struct Stub {
    sql_contains: &'static str,
    params: Option<Vec<String>>,
    response: Result<Vec<CatalogRow>, QueryError>,
}

/// Serves canned rows for queries whose SQL contains a marker string.
///
/// The first matching stub wins; unmatched queries return no rows. Every
/// query is recorded so tests can inspect what was sent.
pub(crate) struct MockConnection {
    driver: String,
    ping_error: Option<QueryError>,
    stubs: Vec<Stub>,
    issued: Mutex<Vec<CatalogQuery>>,
}

impl MockConnection {
    pub(crate) fn new(driver: &str) -> Self {
        Self {
            driver: driver.to_string(),
            ping_error: None,
            stubs: Vec::new(),
            issued: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing_ping(mut self, error: QueryError) -> Self {
        self.ping_error = Some(error);
        self
    }

    /// Answer any query containing `sql_contains`.
    pub(crate) fn on(mut self, sql_contains: &'static str, rows: Vec<CatalogRow>) -> Self {
        self.stubs.push(Stub {
            sql_contains,
            params: None,
            response: Ok(rows),
        });
        self
    }

    /// Answer queries containing `sql_contains` bound with exactly `params`.
    pub(crate) fn on_params(
        mut self,
        sql_contains: &'static str,
        params: &[&str],
        rows: Vec<CatalogRow>,
    ) -> Self {
        self.stubs.push(Stub {
            sql_contains,
            params: Some(params.iter().map(|p| p.to_string()).collect()),
            response: Ok(rows),
        });
        self
    }

    /// Fail queries containing `sql_contains`.
    pub(crate) fn fail(mut self, sql_contains: &'static str, error: QueryError) -> Self {
        self.stubs.push(Stub {
            sql_contains,
            params: None,
            response: Err(error),
        });
        self
    }

    pub(crate) fn issued(&self) -> Vec<CatalogQuery> {
        self.issued.lock().unwrap().clone()
    }

    /// Number of issued queries whose SQL contains `sql_contains`.
    pub(crate) fn count(&self, sql_contains: &str) -> usize {
        self.issued()
            .iter()
            .filter(|q| q.sql().contains(sql_contains))
            .count()
    }
}

#[async_trait]
impl CatalogConnection for MockConnection {
    fn driver_name(&self) -> &str {
        &self.driver
    }

    async fn ping(&self) -> Result<(), QueryError> {
        match &self.ping_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn fetch_all(&self, query: &CatalogQuery) -> Result<Vec<CatalogRow>, QueryError> {
        self.issued.lock().unwrap().push(query.clone());

        let stub = self.stubs.iter().find(|s| {
            query.sql().contains(s.sql_contains)
                && s.params.as_deref().map_or(true, |p| p == query.params())
        });

        match stub {
            Some(stub) => stub.response.clone(),
            None => Ok(Vec::new()),
        }
    }
}

/// Build a row from `(column, value)` pairs.
pub(crate) fn row(values: &[(&str, Option<&str>)]) -> CatalogRow {
    values
        .iter()
        .map(|(column, value)| (*column, value.map(str::to_string)))
        .collect()
}
