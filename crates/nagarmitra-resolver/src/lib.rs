pub mod engine;
pub mod session;
pub mod view;

pub use engine::{Lookup, LookupOutcome, Phase, ResolveIssue, ResolverEngine, MIN_QUERY_LEN};
pub use session::ResolverSession;
pub use view::ResolverView;
