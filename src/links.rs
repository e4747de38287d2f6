//! Report-link construction with sticky filter parameters.
//!
//! Links to other reports carry the active filter set (time range, account
//! filter, ...) so navigating between reports keeps the current view. Callers
//! override or drop individual parameters per link; explicit parameters
//! always win over carried ones.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::date_utils::Interval;
use crate::error::{AppError, AppResult};
use crate::reactive::{Derived, Readable, Store};

/// Query parameters that are carried across report navigations unless
/// explicitly overridden or omitted.
pub const URL_SYNCED_PARAMS: [&str; 6] =
    ["account", "charts", "conversion", "filter", "interval", "time"];

/// An ordered set of query parameters. `set` overwrites an existing name in
/// place, otherwise appends, so parameter order is stable across rewrites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams(Vec<(String, String)>);

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::new();
        for (name, value) in pairs {
            params.set(&name, &value);
        }
        params
    }

    /// Parse a query string (without the leading `?`). Malformed input
    /// yields an empty set.
    pub fn parse(query: &str) -> Self {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_default();
        Self::from_pairs(pairs)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, name: &str, value: &str) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.0.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.0.retain(|(n, _)| n != name);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize to a query string, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(&self.0).unwrap_or_default()
    }
}

/// An explicit parameter value for [`UrlContext::url_for`].
///
/// `Omit` drops the name from the output even when it is carried in the
/// sticky set; this is distinct from not mentioning the name at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Set(String),
    Omit,
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Set(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Set(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Set(value.to_string())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Set(value.to_string())
    }
}

/// Everything link construction needs from the application: the ledger's
/// base path, the editor preference and the live query parameters.
///
/// The base path is fixed at construction (it comes from the served
/// document's location and never changes afterwards); the parameter store is
/// owned by the navigation layer and only read here.
#[derive(Clone)]
pub struct UrlContext {
    base_path: String,
    use_external_editor: bool,
    search_params: Store<SearchParams>,
}

impl UrlContext {
    pub fn new(
        base_path: impl Into<String>,
        use_external_editor: bool,
        search_params: Store<SearchParams>,
    ) -> AppResult<Self> {
        let base_path = base_path.into();
        if base_path.is_empty() {
            return Err(AppError::InvalidBasePath(
                "base path must not be empty".to_string(),
            ));
        }
        Ok(Self {
            base_path,
            use_external_editor,
            search_params,
        })
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn search_params(&self) -> &Store<SearchParams> {
        &self.search_params
    }

    /// Build the URL for one of the application's reports.
    ///
    /// Sticky parameters with a non-empty current value are carried over when
    /// `include_persisted` is set. Explicit parameters overwrite carried
    /// ones; [`ParamValue::Omit`] drops a name entirely, which is how a
    /// normally-sticky parameter is suppressed for a single link.
    pub fn url_for(
        &self,
        report: &str,
        explicit: &[(&str, ParamValue)],
        include_persisted: bool,
    ) -> String {
        let url = format!("{}{}", self.base_path, report);
        let mut params = if include_persisted {
            synced_subset(&self.search_params.get())
        } else {
            SearchParams::new()
        };
        for (name, value) in explicit {
            match value {
                ParamValue::Set(v) => params.set(name, v),
                ParamValue::Omit => params.remove(name),
            }
        }
        let query = params.to_query_string();
        if query.is_empty() {
            url
        } else {
            format!("{}?{}", url, query)
        }
    }

    /// A report URL with the sticky parameters carried and no overrides.
    pub fn url_for_report(&self, report: &str) -> String {
        self.url_for(report, &[], true)
    }

    /// The path of `path` relative to the ledger's base path, percent-decoded,
    /// or `None` if the path lies outside the routable space (external links;
    /// callers must not attempt to route these internally).
    pub fn url_path(&self, path: &str) -> Option<String> {
        let suffix = path.strip_prefix(&self.base_path)?;
        match urlencoding::decode(suffix) {
            Ok(decoded) => Some(decoded.into_owned()),
            Err(err) => {
                tracing::warn!("malformed percent-encoding in {}: {}", suffix, err);
                Some(suffix.to_string())
            }
        }
    }

    /// URL for the editor at the source location of an entry.
    ///
    /// With an external editor configured this is a custom-scheme URI handled
    /// by the OS; otherwise it targets the in-app editor report.
    pub fn url_for_source(&self, file_path: &str, line: &str) -> String {
        if self.use_external_editor {
            format!("beancount://{}?lineno={}", file_path, line)
        } else {
            self.url_for(
                "editor/",
                &[
                    ("file_path", ParamValue::from(file_path)),
                    ("line", ParamValue::from(line)),
                ],
                true,
            )
        }
    }

    /// Rewrite the `time` parameter of an existing URL to the canonical
    /// encoding of `date` under the given interval.
    pub fn url_for_time_filter(&self, url: &str, date: NaiveDate, interval: Interval) -> String {
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, query),
            None => (url, ""),
        };
        let mut params = SearchParams::parse(query);
        params.set("time", &interval.time_filter_value(date));
        format!("{}?{}", path, params.to_query_string())
    }

    /// Link builder for the account report, bound to the live filter set so
    /// link targets in rendered tables stay current without each caller
    /// re-reading global state.
    pub fn account_url_builder(&self) -> AccountUrlBuilder {
        let base_path = self.base_path.clone();
        AccountUrlBuilder {
            inner: Derived::new(self.search_params.clone(), move |current| {
                Arc::new(AccountLinker {
                    base_path: base_path.clone(),
                    persisted: synced_subset(current),
                })
            }),
        }
    }
}

/// The sticky subset of the current parameters, in whitelist order. Empty
/// values are treated as absent.
fn synced_subset(current: &SearchParams) -> SearchParams {
    let mut params = SearchParams::new();
    for name in URL_SYNCED_PARAMS {
        if let Some(value) = current.get(name) {
            if !value.is_empty() {
                params.set(name, value);
            }
        }
    }
    params
}

/// Derived account-report link builder; recomputes its snapshot only when
/// the filter parameters change.
pub struct AccountUrlBuilder {
    inner: Derived<Store<SearchParams>, Arc<AccountLinker>>,
}

impl AccountUrlBuilder {
    pub fn linker(&self) -> Arc<AccountLinker> {
        self.inner.get()
    }
}

/// An account link builder bound to one snapshot of the filter parameters.
pub struct AccountLinker {
    base_path: String,
    persisted: SearchParams,
}

impl AccountLinker {
    pub fn url(&self, account: &str) -> String {
        self.url_with(account, &[])
    }

    pub fn url_with(&self, account: &str, explicit: &[(&str, ParamValue)]) -> String {
        let url = format!("{}account/{}/", self.base_path, account);
        let mut params = self.persisted.clone();
        for (name, value) in explicit {
            match value {
                ParamValue::Set(v) => params.set(name, v),
                ParamValue::Omit => params.remove(name),
            }
        }
        let query = params.to_query_string();
        if query.is_empty() {
            url
        } else {
            format!("{}?{}", url, query)
        }
    }
}
