pub mod ids;

pub use ids::{
    extract_all, extract_by_type, extract_identifiers, validate_identifier,
    FEATURE_SCOPED_PREFIXES, KNOWN_PREFIXES, OTHER_BUCKET,
};
