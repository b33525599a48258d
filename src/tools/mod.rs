pub mod expr;
pub mod factory;
pub mod math;
pub mod registry;
pub mod search;
pub mod traits;

pub use factory::all_tools;
pub use math::MathTool;
pub use registry::ToolRegistry;
pub use search::SearchTool;
pub use traits::{Tool, ToolResult, ToolSpec};
