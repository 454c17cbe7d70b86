//! Assignment domain models.
//!
//! Provides the preference matrix store and the types it hands out.
//!
//! # Domain Mappings
//!
//! | u-assign | Community kitchen | Volunteering | Staffing |
//! |----------|-------------------|--------------|----------|
//! | Person | Member | Volunteer | Employee |
//! | Task | Cooking/cleaning shift | Station | Shift slot |
//! | Degree | Day preference | Interest level | Availability weight |
//! | Pairing | Weekly chore chart | Roster | Rota |

mod pairing;
mod status;
mod table;

pub use pairing::{Pair, Pairing};
pub use status::{EntityKind, Status};
pub use table::{checked_degree, ConstraintsTable, Degree, TableData, MERGE_SEPARATOR};
