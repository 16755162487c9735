//! Management and query services used by the console routes.

pub mod option_mgmt;
pub mod permalink_query;

pub use option_mgmt::OptionMgmtService;
pub use permalink_query::PermalinkQueryService;
