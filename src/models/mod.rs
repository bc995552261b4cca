pub mod layout;

pub use layout::{
    ContentBlock, CreateLayoutRequest, LayoutContent, LayoutRecord, LayoutResponse, NewLayout,
    ScopeKey, TemplateVariable, TemplateVariableType,
};
