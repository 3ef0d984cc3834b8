use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serializer};

/// 序列化字节为 base64 字符串。
pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&STANDARD.encode(bytes))
}

/// 反序列化 base64 字符串为字节。
///
/// 服务端偶尔返回带换行或缺少填充的数据，这里统一容忍。
pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded = String::deserialize(deserializer)?;
    decode_lenient(&encoded).map_err(serde::de::Error::custom)
}

pub(crate) fn decode_lenient(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact.as_bytes())
        .or_else(|_| STANDARD_NO_PAD.decode(compact.trim_end_matches('=').as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_tolerates_line_breaks() {
        let encoded = format!("{}\n", STANDARD.encode(b"product photo bytes"));
        let wrapped = format!("{}\r\n{}", &encoded[..8], &encoded[8..]);
        assert_eq!(decode_lenient(&wrapped).unwrap(), b"product photo bytes");
    }

    #[test]
    fn decode_tolerates_missing_padding() {
        let encoded = STANDARD_NO_PAD.encode(b"ab");
        assert_eq!(decode_lenient(&encoded).unwrap(), b"ab");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_lenient("not*base64!").is_err());
    }
}
