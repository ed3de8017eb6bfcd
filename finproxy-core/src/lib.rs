pub mod filter;
pub mod query;
pub mod record;

pub use filter::apply;
pub use query::Query;
pub use record::Record;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("record {index} is malformed: {source}")]
    MalformedRecord {
        index: usize,
        #[source]
        source: record::FieldError,
    },
}
