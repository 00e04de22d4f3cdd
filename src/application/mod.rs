//! 应用层：业务编排
//!
//! 把请求校验、提示词组装、回退链和供应商客户端串起来

pub mod materials;
pub mod tutor;

pub use materials::MaterialsService;
pub use tutor::{TutorService, ACCOUNTING_TUTOR_PROMPT};
