/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a time-ordered string ID for catalog records.
///
/// Layout: lower-hex milliseconds since epoch + 4 hex chars of randomness.
/// Stays within `[a-z0-9]`, so the value is always usable verbatim as a
/// SurrealDB record key (no escaping) and as a redb table key.
///
/// Used for clothing and outfit records; tag definitions carry fixed
/// semantic IDs (`sleeveType_definition` 等) instead.
pub fn record_id() -> String {
    use rand::Rng;
    let rand_bits: u32 = rand::thread_rng().gen_range(0..0x10000); // 16 bits
    format!("{:x}{:04x}", now_millis(), rand_bits)
}
