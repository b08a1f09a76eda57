use crate::error::ChainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Document types in the V-model specification chain.
///
/// The enumeration is fixed at build time; project configuration never adds
/// or removes members. `Ord` follows declaration order, which matches the
/// phase grouping below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocType {
    Requirements,
    FunctionsList,
    Nfr,
    ProjectPlan,
    BasicDesign,
    SecurityDesign,
    DetailDesign,
    TestPlan,
    UtSpec,
    ItSpec,
    StSpec,
    UatSpec,
    Sitemap,
    OperationDesign,
    MigrationDesign,
}

/// Every document type, in declaration order.
pub const ALL_DOC_TYPES: &[DocType] = &[
    DocType::Requirements,
    DocType::FunctionsList,
    DocType::Nfr,
    DocType::ProjectPlan,
    DocType::BasicDesign,
    DocType::SecurityDesign,
    DocType::DetailDesign,
    DocType::TestPlan,
    DocType::UtSpec,
    DocType::ItSpec,
    DocType::StSpec,
    DocType::UatSpec,
    DocType::Sitemap,
    DocType::OperationDesign,
    DocType::MigrationDesign,
];

/// Canonical phase sequence of the chain, used by the staleness check and
/// the traceability matrix. Consistent with [`crate::chain::CHAIN_EDGES`]:
/// every edge points forward in this sequence.
///
/// Supplementary types (sitemap, operation/migration design) sit outside the
/// linear sequence and are not ranked against it.
pub const CHAIN_ORDER: &[DocType] = &[
    DocType::FunctionsList,
    DocType::Requirements,
    DocType::Nfr,
    DocType::ProjectPlan,
    DocType::BasicDesign,
    DocType::SecurityDesign,
    DocType::DetailDesign,
    DocType::TestPlan,
    DocType::UtSpec,
    DocType::ItSpec,
    DocType::StSpec,
    DocType::UatSpec,
];

impl DocType {
    /// Kebab-case name as it appears in configuration and reports.
    pub fn name(&self) -> &'static str {
        match self {
            DocType::Requirements => "requirements",
            DocType::FunctionsList => "functions-list",
            DocType::Nfr => "nfr",
            DocType::ProjectPlan => "project-plan",
            DocType::BasicDesign => "basic-design",
            DocType::SecurityDesign => "security-design",
            DocType::DetailDesign => "detail-design",
            DocType::TestPlan => "test-plan",
            DocType::UtSpec => "ut-spec",
            DocType::ItSpec => "it-spec",
            DocType::StSpec => "st-spec",
            DocType::UatSpec => "uat-spec",
            DocType::Sitemap => "sitemap",
            DocType::OperationDesign => "operation-design",
            DocType::MigrationDesign => "migration-design",
        }
    }

    /// Parse a kebab-case name, rejecting anything outside the enumeration.
    pub fn parse(name: &str) -> Result<Self, ChainError> {
        ALL_DOC_TYPES
            .iter()
            .find(|doc| doc.name() == name)
            .copied()
            .ok_or_else(|| ChainError::UnknownDocType(name.to_string()))
    }

    /// Phase this document type belongs to.
    pub fn phase(&self) -> Phase {
        match self {
            DocType::Requirements | DocType::FunctionsList | DocType::Nfr | DocType::ProjectPlan => {
                Phase::Requirements
            }
            DocType::BasicDesign | DocType::SecurityDesign | DocType::DetailDesign => Phase::Design,
            DocType::TestPlan
            | DocType::UtSpec
            | DocType::ItSpec
            | DocType::StSpec
            | DocType::UatSpec => Phase::Test,
            DocType::Sitemap | DocType::OperationDesign | DocType::MigrationDesign => {
                Phase::Supplementary
            }
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle phase grouping for document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Requirements,
    Design,
    Test,
    Supplementary,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Requirements => "requirements",
            Phase::Design => "design",
            Phase::Test => "test",
            Phase::Supplementary => "supplementary",
        }
    }
}
