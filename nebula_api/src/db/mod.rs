mod package;
mod review;

pub use package::*;
pub use review::*;

#[cfg(feature = "server")]
pub mod tables {
    use super::*;

    use redb::TableDefinition;

    type NanoId<'a> = &'a str;

    // package_id keyed to package document
    pub const PACKAGE_TABLE: TableDefinition<NanoId, PackageModel> =
        TableDefinition::new("packages");
    // used to ensure package names are unique
    // package name keyed to package_id
    pub const PACKAGE_NAME_TABLE: TableDefinition<&str, NanoId> =
        TableDefinition::new("package_names");

    // insertion sequence keyed to review document, newest review has the largest key
    pub const REVIEW_TABLE: TableDefinition<u64, ReviewModel> = TableDefinition::new("reviews");
    // review_id keyed to insertion sequence
    pub const REVIEW_ID_TABLE: TableDefinition<NanoId, u64> = TableDefinition::new("review_ids");
}

#[cfg(feature = "server")]
pub use tables::*;
