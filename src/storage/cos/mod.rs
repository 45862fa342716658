pub mod auth;
pub mod parser;

// 重新导出认证相关功能
pub use auth::{build_cos_auth_headers, generate_cos_presigned_url};

// 重新导出解析相关功能
pub use parser::{
    build_object_url, encode_object_key, parse_acl_response, parse_error_message,
    parse_list_objects_response,
};
