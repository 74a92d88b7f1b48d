//! Frame extraction from a streaming receive buffer.
//!
//! Messages arrive over a byte stream with no length prefix; the only
//! framing is the literal `[` ... `]` pair. The buffer grows as reads
//! complete, and [`extract_frame`] pops complete frames off the front.
//! Bytes before the first `[` are garbage from a corrupted stream and
//! are discarded.

/// Pops the first complete `[` ... `]` frame from the buffer.
///
/// Returns `None` when no closing bracket is present yet; the buffer
/// keeps everything from the first `[` onward so a later read can
/// complete the frame. A buffer that contains no `[` at all is pure
/// garbage and is emptied.
pub fn extract_frame(buffer: &mut String) -> Option<String> {
    let start = match buffer.find('[') {
        Some(i) => i,
        None => {
            buffer.clear();
            return None;
        }
    };
    if start > 0 {
        buffer.drain(..start);
    }
    let end = buffer.find(']')?;
    let frame: String = buffer.drain(..=end).collect();
    Some(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_first_frame_and_keeps_rest() {
        let mut buf = "[chand][cjoin|chipjack]".to_string();
        assert_eq!(extract_frame(&mut buf).as_deref(), Some("[chand]"));
        assert_eq!(buf, "[cjoin|chipjack]");
        assert_eq!(
            extract_frame(&mut buf).as_deref(),
            Some("[cjoin|chipjack]")
        );
        assert_eq!(buf, "");
    }

    #[test]
    fn test_incomplete_frame_waits_for_more_bytes() {
        let mut buf = "[cjoin|chip".to_string();
        assert_eq!(extract_frame(&mut buf), None);
        assert_eq!(buf, "[cjoin|chip");

        buf.push_str("jack]");
        assert_eq!(
            extract_frame(&mut buf).as_deref(),
            Some("[cjoin|chipjack]")
        );
    }

    #[test]
    fn test_garbage_before_first_bracket_is_discarded() {
        let mut buf = "##noise##[chand]".to_string();
        assert_eq!(extract_frame(&mut buf).as_deref(), Some("[chand]"));
        assert_eq!(buf, "");
    }

    #[test]
    fn test_pure_garbage_empties_the_buffer() {
        let mut buf = "no brackets here".to_string();
        assert_eq!(extract_frame(&mut buf), None);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_empty_buffer_yields_nothing() {
        let mut buf = String::new();
        assert_eq!(extract_frame(&mut buf), None);
    }
}
