// handlers/protected/dashboard/mod.rs - Transaction and error log views

pub mod dashboard_get;
pub mod logs_get;
pub mod summary_get;
pub mod transactions_get;

pub use dashboard_get::dashboard_get;
pub use logs_get::logs_get;
pub use summary_get::summary_get;
pub use transactions_get::transactions_get;

/// Dashboard tables show 20 rows per page
pub const PER_PAGE: u32 = 20;

/// Blank query values mean "no filter"
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
