/*
[INPUT]:  Raw frames from the transport
[OUTPUT]: Control/push classification and cheap topic pre-routing
[POS]:    Wire layer - frame classification
[UPDATE]: When the envelope layout or frame families change
*/

/// Frame family, decided on the first byte alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFrame<'a> {
    /// JSON control frame (subscribe acks, pings, notices)
    Control(&'a [u8]),
    /// Binary push-data envelope
    Push(&'a [u8]),
}

/// A frame is a control frame iff its first byte is `{`
pub fn classify(frame: &[u8]) -> RawFrame<'_> {
    if frame.first() == Some(&b'{') {
        RawFrame::Control(frame)
    } else {
        RawFrame::Push(frame)
    }
}

/// Read only the leading topic field of a push envelope.
///
/// The envelope places the topic string in field 1 (wire type 2), so the
/// frame starts with `0x0a`, a varint length and the topic bytes. This
/// gives the dispatcher a routing key without paying for the structured
/// decode of the whole body.
pub fn peek_topic(frame: &[u8]) -> Option<&str> {
    let (&tag, rest) = frame.split_first()?;
    if tag != 0x0a {
        return None;
    }
    let (len, consumed) = decode_varint(rest)?;
    let end = consumed.checked_add(usize::try_from(len).ok()?)?;
    let bytes = rest.get(consumed..end)?;
    std::str::from_utf8(bytes).ok()
}

fn decode_varint(buf: &[u8]) -> Option<(u64, usize)> {
    let mut value: u64 = 0;
    for (i, &byte) in buf.iter().enumerate().take(10) {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::push::PushEnvelope;
    use prost::Message;

    #[test]
    fn test_classify_on_first_byte() {
        assert!(matches!(classify(br#"{"id":1}"#), RawFrame::Control(_)));
        assert!(matches!(classify(&[0x0a, 0x01, b'x']), RawFrame::Push(_)));
        assert!(matches!(classify(&[]), RawFrame::Push(_)));
    }

    #[test]
    fn test_peek_topic_reads_leading_field() {
        let envelope = PushEnvelope {
            topic: "spot@depth@100ms@BTC_USDT".to_string(),
            instrument: "BTC_USDT".to_string(),
            send_time_ms: 42,
            body: None,
        };
        let bytes = envelope.encode_to_vec();
        assert_eq!(peek_topic(&bytes), Some("spot@depth@100ms@BTC_USDT"));
    }

    #[test]
    fn test_peek_topic_rejects_foreign_leading_field() {
        // field 2 first: not the envelope layout
        assert_eq!(peek_topic(&[0x12, 0x01, b'x']), None);
    }

    #[test]
    fn test_peek_topic_rejects_truncated_length() {
        assert_eq!(peek_topic(&[0x0a, 0x20, b'a', b'b']), None);
        assert_eq!(peek_topic(&[0x0a]), None);
        assert_eq!(peek_topic(&[]), None);
    }
}
