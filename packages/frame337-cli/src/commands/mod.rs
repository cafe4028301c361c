pub mod info;
pub mod references;
pub mod run;
pub mod sources;
