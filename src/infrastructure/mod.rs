//! 基础设施层：外部系统交互
//!
//! 提供与外部系统（模型供应商、云盘、HTTP 客户端）的交互能力

pub mod auth;
pub mod drive;
pub mod llm;
pub mod web;
