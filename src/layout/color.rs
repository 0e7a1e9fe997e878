/// Stable accent slot for an identifier: the sum of its UTF-16 code units
/// modulo `palette_size`.
pub fn color_index(id: &str, palette_size: usize) -> usize {
    if palette_size == 0 {
        return 0;
    }
    let sum: u64 = id.encode_utf16().map(u64::from).sum();
    (sum % palette_size as u64) as usize
}
