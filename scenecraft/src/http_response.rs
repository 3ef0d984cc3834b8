use std::collections::HashMap;

use reqwest::header::HeaderMap;

use scenecraft_types::http::HttpResponse;

fn headers_to_map(headers: &HeaderMap) -> HashMap<String, String> {
    let mut map: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        let Ok(value_str) = value.to_str() else {
            continue;
        };
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                if !existing.is_empty() {
                    existing.push_str(", ");
                }
                existing.push_str(value_str);
            })
            .or_insert_with(|| value_str.to_string());
    }
    map
}

/// 读取完整响应体；读取失败按传输错误处理。
pub(crate) async fn read_http_response(
    response: reqwest::Response,
) -> Result<HttpResponse, reqwest::Error> {
    let status = response.status().as_u16();
    let headers = headers_to_map(response.headers());
    let body = response.text().await?;
    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}
