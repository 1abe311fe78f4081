pub mod context;
pub mod output;
pub mod run;
