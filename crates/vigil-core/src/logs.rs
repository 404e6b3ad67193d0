//! Log tail truncation for finish events.

/// Returns the trailing `max_bytes` of `bytes`, or the whole slice when it
/// is already within the limit.
pub fn tail(bytes: &[u8], max_bytes: usize) -> &[u8] {
    if bytes.len() <= max_bytes {
        bytes
    } else {
        &bytes[bytes.len() - max_bytes..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_unchanged() {
        assert_eq!(tail(b"hello", 200_000), b"hello");
    }

    #[test]
    fn long_input_keeps_exactly_the_last_bytes() {
        let input: Vec<u8> = (0..500_000u32).map(|i| (i % 251) as u8).collect();
        let kept = tail(&input, 200_000);
        assert_eq!(kept.len(), 200_000);
        assert_eq!(kept, &input[300_000..]);
    }

    #[test]
    fn exact_limit_unchanged() {
        let input = vec![7u8; 100];
        assert_eq!(tail(&input, 100), &input[..]);
    }
}
