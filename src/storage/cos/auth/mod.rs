pub mod cos_signer;

// 重新导出主要的签名函数，方便使用
pub use cos_signer::{build_cos_auth_headers, generate_cos_presigned_url};
