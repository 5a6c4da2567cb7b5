pub mod ops_build;
pub mod ops_clean;
pub mod ops_detect;
pub mod ops_publish;
