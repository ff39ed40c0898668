pub mod audit;
pub mod dispatch;
pub mod finding;
pub mod init;
pub mod plan;
pub mod risk;
pub mod shared;
pub mod template;
pub mod workpaper;
