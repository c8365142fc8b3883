/// The functions the SQL side calls into.
///
/// - `scan` is the table function: bind a table by name, then pull batches
/// until the scan reports it is finished.
/// - `scalars` are the create/drop entry points. They answer with a plain
/// boolean and log the reason for a failure instead of returning it.
pub mod scan;
pub mod scalars;
