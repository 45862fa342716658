use quick_xml::events::Event;
use quick_xml::Reader;

use crate::storage::traits::{ListingPage, StorageError, Visibility};

/// 公共读权限组的 URI
const ALL_USERS_GRANTEE: &str = "http://cam.qcloud.com/groups/global/AllUsers";

/// 按路径段编码对象键，保留分隔符
pub fn encode_object_key(object_key: &str) -> String {
    object_key
        .split('/')
        .map(|segment| urlencoding::encode(segment).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// 构建对象的完整 URL
pub fn build_object_url(endpoint: &str, object_key: &str) -> String {
    // 对对象键进行URL编码，以正确处理中文和特殊字符
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        encode_object_key(object_key)
    )
}

/// 解析 GET Bucket（列举对象）的 XML 响应
pub fn parse_list_objects_response(xml_content: &str) -> Result<ListingPage, StorageError> {
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    let mut page = ListingPage::default();
    let mut buf = Vec::new();
    let mut in_contents = false;
    let mut current_text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if e.name().as_ref() == b"Contents" {
                    in_contents = true;
                }
                current_text.clear();
            }
            Ok(Event::Text(e)) => {
                current_text = e
                    .unescape()
                    .map_err(|e| StorageError::ParseError(format!("XML text error: {}", e)))?
                    .to_string();
            }
            Ok(Event::End(ref e)) => {
                match e.name().as_ref() {
                    b"Key" if in_contents => page.keys.push(current_text.clone()),
                    b"Contents" => in_contents = false,
                    b"IsTruncated" => page.truncated = current_text == "true",
                    b"NextMarker" if !current_text.is_empty() => {
                        page.next_marker = Some(current_text.clone());
                    }
                    _ => {}
                }
                current_text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(StorageError::ParseError(format!("XML parsing error: {}", e)))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(page)
}

/// 解析 GET Object ACL 的 XML 响应
///
/// 只要 AllUsers 组拥有 READ 权限即视为公共读。
pub fn parse_acl_response(xml_content: &str) -> Result<Visibility, StorageError> {
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut current_text = String::new();
    let mut grantee_uri: Option<String> = None;
    let mut visibility = Visibility::Private;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if e.name().as_ref() == b"Grant" {
                    grantee_uri = None;
                }
                current_text.clear();
            }
            Ok(Event::Text(e)) => {
                current_text = e
                    .unescape()
                    .map_err(|e| StorageError::ParseError(format!("XML text error: {}", e)))?
                    .to_string();
            }
            Ok(Event::End(ref e)) => {
                match e.name().as_ref() {
                    b"URI" => grantee_uri = Some(current_text.clone()),
                    b"Permission" => {
                        if grantee_uri.as_deref() == Some(ALL_USERS_GRANTEE) {
                            if current_text == "READ" {
                                visibility = Visibility::Public;
                            }
                        }
                    }
                    _ => {}
                }
                current_text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(StorageError::ParseError(format!("XML parsing error: {}", e)))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(visibility)
}

/// 从错误响应体中提取 `Code: Message`，解析失败时返回原始响应体
pub fn parse_error_message(xml_content: &str) -> String {
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut current_text = String::new();
    let mut code = None;
    let mut message = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(e)) => {
                current_text = e.unescape().unwrap_or_default().to_string();
            }
            Ok(Event::End(ref e)) => {
                match e.name().as_ref() {
                    b"Code" => code = Some(current_text.clone()),
                    b"Message" => message = Some(current_text.clone()),
                    _ => {}
                }
                current_text.clear();
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    match (code, message) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        (Some(code), None) => code,
        _ => xml_content.to_string(),
    }
}
