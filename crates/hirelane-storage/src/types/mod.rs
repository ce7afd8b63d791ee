//! Entity types and parameter structs shared by all storage backends.

mod applications;
mod codes;
mod companies;
mod ids;
mod jobs;
mod principals;
mod reports;
mod subscriptions;

pub use applications::*;
pub use codes::*;
pub use companies::*;
pub use ids::*;
pub use jobs::*;
pub use principals::*;
pub use reports::*;
pub use subscriptions::*;
