use uuid::Uuid;

/// Random lowercase hex id of at most `len` characters (32 max).
pub fn generate_short_id(len: usize) -> String {
    Uuid::new_v4().simple().to_string().chars().take(len).collect()
}
