pub mod assets;
pub mod export;
pub mod history;
pub mod run;
pub mod show;
