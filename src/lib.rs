//! # Blood Type Compatibility Toolkit
//!
//! An educational toolkit for ABO/Rh blood-type donation compatibility.
//!
//! ## Features
//!
//! - Closed registry of the eight blood types (O-, O+, A-, A+, B-, B+, AB-, AB+)
//! - Donor/recipient rule evaluation and reverse lookup
//! - Selection state with directional connections for rendering
//! - Deterministic ABO/Rh explanations
//! - Multiple output formats (Text, JSON, CSV, TSV, HTML)
//!
//! ```
//! use blood_compatibility::{BloodType, CompatibilityEngine};
//!
//! let engine = CompatibilityEngine::new();
//! assert!(engine.can_donate(BloodType::ONegative, BloodType::ABPositive));
//! assert_eq!(
//!     engine.recipients_for(BloodType::APositive),
//!     vec![BloodType::APositive, BloodType::ABPositive]
//! );
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod explanation;
pub mod output;
pub mod registry;
pub mod selection;
pub mod types;

// Re-export key types
pub use analysis::{ChartRow, CompatibilityChart, CompatibilityEngine};
pub use config::{AppConfig, FileConfig};
pub use error::BloodTypeError;
pub use explanation::Explanation;
pub use output::{CheckReport, QueryReport, ReportFormat, ReportGenerator};
pub use registry::BloodTypeRegistry;
pub use selection::{connections, highlighted_ids, parse_spoken, Selection};
pub use types::*;
