//! 도메인 데이터 구조체.

pub mod frame;
pub mod metrics;
