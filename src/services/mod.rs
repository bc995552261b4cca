pub mod layout;

pub use layout::LayoutService;
pub use layout::enforcer::DefaultLayoutEnforcer;
