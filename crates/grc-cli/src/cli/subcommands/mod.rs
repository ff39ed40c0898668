mod finding;
mod plan;
mod risk;
mod template;
mod workpaper;

pub use finding::FindingCommands;
pub use plan::PlanCommands;
pub use risk::RiskCommands;
pub use template::TemplateCommands;
pub use workpaper::WorkpaperCommands;
