pub mod assessment;
pub mod differential;
pub mod resolution;
pub mod scoring;
pub mod tutor;
