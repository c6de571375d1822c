pub mod run;
pub mod scenario;
