//! 호가창 수집 계층에서 사용되는 공통 타입.

mod market_data;
mod status;
mod symbol;

pub use market_data::*;
pub use status::*;
pub use symbol::*;
