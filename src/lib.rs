//! Constrained person-to-task assignment.
//!
//! Given a preference matrix (people × tasks, degree 0 = unacceptable),
//! find a one-to-one assignment that respects hard constraints and
//! maximizes the satisfied preference weight.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ConstraintsTable`, `Status`, `Pairing`
//! - **`scheduler`**: Randomized greedy trials and best-of-N search
//! - **`variants`**: Hooks that fan a table out into variants before trials
//! - **`config`**: TOML-loadable `SchedulerConfig`
//! - **`validation`**: Input integrity checks for serialized tables
//! - **`error`**: `AssignError` and the crate `Result` alias
//!
//! # Example
//!
//! ```
//! use u_assign::{ConstraintsTable, Scheduler, SchedulerConfig};
//!
//! let mut table = ConstraintsTable::new().with_tasks(["Cook", "Clean"]);
//! table.add_person("Ann", Some(vec![3, 1])).unwrap();
//! table.add_person("Bo", Some(vec![0, 2])).unwrap();
//!
//! let report = Scheduler::new(table)
//!     .with_config(SchedulerConfig::new().with_order(100).with_random_seed(7))
//!     .run()
//!     .unwrap();
//!
//! let pairing = report.best.unwrap().pairing();
//! assert_eq!(pairing.person_for("Cook"), Some("Ann"));
//! assert_eq!(pairing.person_for("Clean"), Some("Bo"));
//! ```
//!
//! # References
//!
//! - Burkard, Dell'Amico & Martello (2012), "Assignment Problems"
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", Ch. 6

pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;
pub mod variants;

pub use config::{IncompletePolicy, SchedulerConfig};
pub use error::{AssignError, Result};
pub use models::{ConstraintsTable, Pairing, Status};
pub use scheduler::{Scheduler, SearchReport, Solution};
pub use variants::{IdentityHook, PartialPairingHook, VariantHook};
